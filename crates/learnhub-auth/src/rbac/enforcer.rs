//! Permission checks for request handlers.

use learnhub_core::error::AppError;
use learnhub_entity::user::Role;

use super::policies::{Permission, RbacPolicies};

/// Message of every authorization failure.
pub const DENIED_MESSAGE: &str = "This action is unauthorized.";

/// Enforces role-based access control.
#[derive(Debug, Clone, Default)]
pub struct RbacEnforcer {
    policies: RbacPolicies,
}

impl RbacEnforcer {
    /// Enforcer over the default policy set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforcer over custom policies.
    pub fn with_policies(policies: RbacPolicies) -> Self {
        Self { policies }
    }

    /// `Ok(())` when `role` holds `permission`, an authorization error otherwise.
    pub fn require_permission(&self, role: Role, permission: Permission) -> Result<(), AppError> {
        if self.policies.has_permission(role, permission) {
            Ok(())
        } else {
            tracing::debug!(%role, ?permission, "Permission denied");
            Err(AppError::authorization(DENIED_MESSAGE))
        }
    }

    /// Whether `role` holds `permission`.
    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.policies.has_permission(role, permission)
    }

    /// The underlying policies.
    pub fn policies(&self) -> &RbacPolicies {
        &self.policies
    }
}

#[cfg(test)]
mod tests {
    use learnhub_core::error::ErrorKind;

    use super::*;

    #[test]
    fn test_owner_holds_everything() {
        let rbac = RbacEnforcer::new();
        for permission in Permission::ALL {
            assert!(rbac.has_permission(Role::Organization, permission));
        }
    }

    #[test]
    fn test_instructor_cannot_manage_partners() {
        let rbac = RbacEnforcer::new();
        assert!(rbac.has_permission(Role::Instructor, Permission::AutomationManage));
        assert!(!rbac.has_permission(Role::Instructor, Permission::PartnersManage));
    }

    #[test]
    fn test_member_and_guest() {
        let rbac = RbacEnforcer::new();
        assert!(rbac.has_permission(Role::Member, Permission::QuizzesTake));
        assert!(!rbac.has_permission(Role::Member, Permission::QuizzesManage));
        assert!(rbac.policies().permissions_for_role(Role::Guest).is_empty());
    }

    #[test]
    fn test_denial_is_static() {
        let err = RbacEnforcer::new()
            .require_permission(Role::Guest, Permission::StatisticsView)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert_eq!(err.message, DENIED_MESSAGE);
    }
}
