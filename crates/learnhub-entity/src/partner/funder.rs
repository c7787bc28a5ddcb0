//! Funder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    /// Category of a training funder.
    #[sqlx(type_name = "funder_kind")]
    pub enum FunderKind {
        /// Skills operator (OPCO).
        Opco => "opco",
        /// Public body.
        Public => "public",
        /// Private funder.
        Private => "private",
        /// Anything else.
        Other => "other",
    }
}

/// An entity financing learners' training.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Funder {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Name.
    pub name: String,
    /// Category.
    pub kind: FunderKind,
    /// Optional SIRET, unique per organization when present.
    pub siret: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant.
    pub updated_at: DateTime<Utc>,
}

/// Writable funder fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunderData {
    /// Name.
    pub name: String,
    /// Category.
    pub kind: FunderKind,
    /// SIRET.
    pub siret: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

impl Funder {
    /// Writable fields of this row.
    pub fn data(&self) -> FunderData {
        FunderData {
            name: self.name.clone(),
            kind: self.kind,
            siret: self.siret.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}
