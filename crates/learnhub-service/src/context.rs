//! Request context carrying the authenticated principal and its tenant.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use learnhub_auth::{Principal, TenantScope};
use learnhub_core::result::AppResult;
use learnhub_core::types::OrganizationId;
use learnhub_entity::user::Role;

/// Who is acting, and for which organization.
///
/// Only constructible from a resolved tenant scope, so every service call
/// is tenant scoped.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated principal.
    pub principal: Principal,
    /// The resolved organization.
    pub organization_id: OrganizationId,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Build a context; fails with tenant-not-found when `scope` is empty.
    pub fn new(principal: Principal, scope: TenantScope, request_time: DateTime<Utc>) -> AppResult<Self> {
        Ok(Self {
            organization_id: scope.require()?,
            principal,
            request_time,
        })
    }

    /// Organization id as a bare UUID.
    pub fn org(&self) -> Uuid {
        self.organization_id.into_uuid()
    }

    /// Acting user id.
    pub fn user_id(&self) -> Uuid {
        self.principal.user_uuid()
    }

    /// Acting role.
    pub fn role(&self) -> Role {
        self.principal.role
    }
}
