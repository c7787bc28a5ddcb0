//! Course and session entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A course offered by an organization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    /// Unique course identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Course title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// User who created the course.
    pub created_by: Uuid,
    /// When the course was created.
    pub created_at: DateTime<Utc>,
    /// When the course was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourse {
    /// Owning organization.
    pub organization_id: Uuid,
    /// Course title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Creating user.
    pub created_by: Uuid,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// A scheduled run of a course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// The course this session runs.
    pub course_id: Uuid,
    /// Session title.
    pub title: String,
    /// Start of the session.
    pub starts_at: DateTime<Utc>,
    /// End of the session.
    pub ends_at: DateTime<Utc>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    /// Owning organization.
    pub organization_id: Uuid,
    /// Parent course.
    pub course_id: Uuid,
    /// Session title.
    pub title: String,
    /// Start of the session.
    pub starts_at: DateTime<Utc>,
    /// End of the session.
    pub ends_at: DateTime<Utc>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}
