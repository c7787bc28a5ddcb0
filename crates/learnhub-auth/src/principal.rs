//! The authenticated caller.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use learnhub_core::types::UserId;
use learnhub_entity::user::Role;

use crate::jwt::Claims;

/// Identity established from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User account.
    pub user_id: UserId,
    /// Role carried by the token.
    pub role: Role,
    /// Organization claimed by the token, if any.
    pub organization_id: Option<Uuid>,
}

impl Principal {
    /// Build a principal directly, bypassing token verification.
    pub fn new(user_id: Uuid, role: Role, organization_id: Option<Uuid>) -> Self {
        Self {
            user_id: UserId::from_uuid(user_id),
            role,
            organization_id,
        }
    }

    /// The user id as a bare UUID.
    pub fn user_uuid(&self) -> Uuid {
        self.user_id.into_uuid()
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: UserId::from_uuid(claims.sub),
            role: claims.role,
            organization_id: claims.organization_id,
        }
    }
}
