//! One scope resolver per principal kind, dispatched by role.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use learnhub_core::result::AppResult;
use learnhub_database::store::InstructorStore;
use learnhub_entity::user::Role;

use super::scope::TenantScope;
use crate::principal::Principal;

/// Derives the tenant of one kind of principal.
#[async_trait]
pub trait ScopeResolver: Send + Sync + Debug {
    /// Resolve the scope of `principal`.
    async fn resolve(&self, principal: &Principal) -> AppResult<TenantScope>;
}

/// Organization owners act for the organization in their token.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerScope;

#[async_trait]
impl ScopeResolver for OwnerScope {
    async fn resolve(&self, principal: &Principal) -> AppResult<TenantScope> {
        Ok(TenantScope::from(principal.organization_id))
    }
}

/// Instructors act for the organization of their instructor profile.
#[derive(Debug, Clone)]
pub struct InstructorScope {
    instructors: Arc<dyn InstructorStore>,
}

impl InstructorScope {
    /// Resolver reading profiles from `instructors`.
    pub fn new(instructors: Arc<dyn InstructorStore>) -> Self {
        Self { instructors }
    }
}

#[async_trait]
impl ScopeResolver for InstructorScope {
    async fn resolve(&self, principal: &Principal) -> AppResult<TenantScope> {
        let profile = self
            .instructors
            .find_instructor_by_user(principal.user_uuid())
            .await?;
        if profile.is_none() {
            debug!(user_id = %principal.user_id, "Instructor has no profile");
        }
        Ok(TenantScope::from(profile.map(|p| p.organization_id)))
    }
}

/// Members act for their own organization when they have one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberScope;

#[async_trait]
impl ScopeResolver for MemberScope {
    async fn resolve(&self, principal: &Principal) -> AppResult<TenantScope> {
        Ok(TenantScope::from(principal.organization_id))
    }
}

/// Guests never have a tenant.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuestScope;

#[async_trait]
impl ScopeResolver for GuestScope {
    async fn resolve(&self, _principal: &Principal) -> AppResult<TenantScope> {
        Ok(TenantScope::None)
    }
}

/// Picks the resolver matching the principal's role.
///
/// Resolution runs on every call; nothing is cached between requests.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    owner: OwnerScope,
    instructor: InstructorScope,
    member: MemberScope,
    guest: GuestScope,
}

impl TenantResolver {
    /// Resolver whose instructor branch reads from `instructors`.
    pub fn new(instructors: Arc<dyn InstructorStore>) -> Self {
        Self {
            owner: OwnerScope,
            instructor: InstructorScope::new(instructors),
            member: MemberScope,
            guest: GuestScope,
        }
    }

    fn resolver_for(&self, role: Role) -> &dyn ScopeResolver {
        match role {
            Role::Organization => &self.owner,
            Role::Instructor => &self.instructor,
            Role::Member => &self.member,
            Role::Guest => &self.guest,
        }
    }

    /// Resolve the tenant of `principal`.
    pub async fn resolve(&self, principal: &Principal) -> AppResult<TenantScope> {
        self.resolver_for(principal.role).resolve(principal).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use learnhub_database::memory::MemoryStore;
    use learnhub_entity::user::InstructorProfile;
    use uuid::Uuid;

    use super::*;

    async fn resolver_with_instructor(user_id: Uuid, organization_id: Uuid) -> TenantResolver {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_instructor(InstructorProfile {
                id: Uuid::new_v4(),
                user_id,
                organization_id,
                first_name: "Ada".into(),
                last_name: "Byron".into(),
                created_at: Utc::now(),
            })
            .await;
        TenantResolver::new(store)
    }

    #[tokio::test]
    async fn test_owner_uses_token_organization() {
        let org = Uuid::new_v4();
        let resolver = resolver_with_instructor(Uuid::new_v4(), Uuid::new_v4()).await;
        let scope = resolver
            .resolve(&Principal::new(Uuid::new_v4(), Role::Organization, Some(org)))
            .await
            .unwrap();
        assert_eq!(scope.require().unwrap().into_uuid(), org);
    }

    #[tokio::test]
    async fn test_instructor_uses_profile_not_token() {
        let user = Uuid::new_v4();
        let profile_org = Uuid::new_v4();
        let resolver = resolver_with_instructor(user, profile_org).await;

        let scope = resolver
            .resolve(&Principal::new(user, Role::Instructor, Some(Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(scope.require().unwrap().into_uuid(), profile_org);

        let stranger = resolver
            .resolve(&Principal::new(Uuid::new_v4(), Role::Instructor, None))
            .await
            .unwrap();
        assert_eq!(stranger, TenantScope::None);
    }

    #[tokio::test]
    async fn test_member_without_organization_and_guest() {
        let resolver = resolver_with_instructor(Uuid::new_v4(), Uuid::new_v4()).await;
        let member = resolver
            .resolve(&Principal::new(Uuid::new_v4(), Role::Member, None))
            .await
            .unwrap();
        assert_eq!(member, TenantScope::None);

        let guest = resolver
            .resolve(&Principal::new(Uuid::new_v4(), Role::Guest, Some(Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(guest, TenantScope::None);
    }
}
