//! Outcome of tenant resolution.

use learnhub_core::error::AppError;
use learnhub_core::types::OrganizationId;

/// The organization a request acts for, or an explicit absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    /// Every query is restricted to this organization.
    Organization(OrganizationId),
    /// No organization could be derived; dependent operations fail closed.
    None,
}

impl TenantScope {
    /// The organization, if resolved.
    pub fn organization_id(&self) -> Option<OrganizationId> {
        match self {
            Self::Organization(id) => Some(*id),
            Self::None => None,
        }
    }

    /// The organization, or a tenant-not-found error.
    pub fn require(self) -> Result<OrganizationId, AppError> {
        self.organization_id().ok_or_else(AppError::tenant_not_found)
    }
}

impl From<Option<uuid::Uuid>> for TenantScope {
    fn from(id: Option<uuid::Uuid>) -> Self {
        id.map_or(Self::None, |id| Self::Organization(OrganizationId::from_uuid(id)))
    }
}

#[cfg(test)]
mod tests {
    use learnhub_core::error::ErrorKind;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_none_fails_closed() {
        let err = TenantScope::None.require().unwrap_err();
        assert_eq!(err.kind, ErrorKind::TenantNotFound);
    }

    #[test]
    fn test_from_option() {
        let id = Uuid::new_v4();
        assert_eq!(TenantScope::from(Some(id)).require().unwrap().into_uuid(), id);
        assert_eq!(TenantScope::from(None), TenantScope::None);
    }
}
