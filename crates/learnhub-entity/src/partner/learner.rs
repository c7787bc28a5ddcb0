//! Learners (students) as referenced by partner delete guards and statistics.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// `status` of an active learner.
pub const LEARNER_ACTIVE: i16 = 1;
/// `status` of an inactive learner.
pub const LEARNER_INACTIVE: i16 = 0;

/// An enrolled learner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Learner {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// User account.
    pub user_id: Uuid,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email.
    pub email: Option<String>,
    /// Employer.
    pub company_id: Option<Uuid>,
    /// Funder.
    pub funder_id: Option<Uuid>,
    /// 1 = active, 0 = inactive.
    pub status: i16,
}

impl Learner {
    /// Whether the learner counts as active.
    pub fn is_active(&self) -> bool {
        self.status == LEARNER_ACTIVE
    }

    /// Whether the learner references `partner`.
    pub fn references(&self, partner: PartnerRef) -> bool {
        match partner {
            PartnerRef::Company(id) => self.company_id == Some(id),
            PartnerRef::Funder(id) => self.funder_id == Some(id),
        }
    }
}

/// A partner a learner can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerRef {
    /// A company.
    Company(Uuid),
    /// A funder.
    Funder(Uuid),
}

impl PartnerRef {
    /// Learner column holding the reference.
    pub fn learner_column(&self) -> &'static str {
        match self {
            Self::Company(_) => "company_id",
            Self::Funder(_) => "funder_id",
        }
    }

    /// Partner id.
    pub fn id(&self) -> Uuid {
        match self {
            Self::Company(id) | Self::Funder(id) => *id,
        }
    }
}
