//! Principal roles and instructor profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    /// Role carried in the access token of an authenticated principal.
    #[sqlx(type_name = "principal_role")]
    pub enum Role {
        /// Owner account of an organization.
        Organization => "organization",
        /// Trainer attached to an organization through an instructor profile.
        Instructor => "instructor",
        /// Learner or staff member that may belong to an organization.
        Member => "member",
        /// Authenticated account with no organization relationship.
        Guest => "guest",
    }
}

/// Instructor profile linking a user account to the organization they teach for.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InstructorProfile {
    /// Profile identifier.
    pub id: Uuid,
    /// The user account owning this profile.
    pub user_id: Uuid,
    /// Organization the instructor works for.
    pub organization_id: Uuid,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!("Instructor".parse::<Role>().unwrap(), Role::Instructor);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&Role::Organization).unwrap();
        assert_eq!(json, "\"organization\"");
    }
}
