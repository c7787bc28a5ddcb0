//! Course document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    /// Who a document or questionnaire is intended for.
    #[sqlx(type_name = "audience_type")]
    pub enum AudienceType {
        /// Learners enrolled in the course.
        Students => "students",
        /// Trainers of the course.
        Instructors => "instructors",
        /// The organization staff.
        Organization => "organization",
    }
}

impl Default for AudienceType {
    fn default() -> Self {
        Self::Students
    }
}

/// A file in the organization's document library.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseDocument {
    /// Unique document identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Course the document belongs to; `None` for organization-level documents.
    pub course_id: Option<Uuid>,
    /// Uploading user.
    pub created_by: Uuid,
    /// Display title.
    pub title: String,
    /// Original file name.
    pub file_name: String,
    /// Storage path of the blob.
    pub path: String,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Lowercase extension without the dot.
    pub extension: Option<String>,
    /// Intended audience.
    pub audience_type: AudienceType,
    /// When the document was uploaded.
    pub created_at: DateTime<Utc>,
    /// When the metadata was last updated.
    pub updated_at: DateTime<Utc>,
}

impl CourseDocument {
    /// Whether this document is visible from `course_id` inside its organization.
    ///
    /// Course documents match only their own course; organization-level
    /// documents match every course.
    pub fn is_attachable_to(&self, course_id: Uuid) -> bool {
        match self.course_id {
            Some(own) => own == course_id,
            None => true,
        }
    }
}

/// Data required to record an uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseDocument {
    /// Pre-generated identifier, part of the storage path.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Optional course.
    pub course_id: Option<Uuid>,
    /// Uploading user.
    pub created_by: Uuid,
    /// Display title.
    pub title: String,
    /// Original file name.
    pub file_name: String,
    /// Storage path.
    pub path: String,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Extension.
    pub extension: Option<String>,
    /// Intended audience.
    pub audience_type: AudienceType,
    /// Upload instant.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(course_id: Option<Uuid>) -> CourseDocument {
        let now = Utc::now();
        CourseDocument {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            course_id,
            created_by: Uuid::new_v4(),
            title: "Syllabus".into(),
            file_name: "syllabus.pdf".into(),
            path: "documents/x/syllabus.pdf".into(),
            mime_type: Some("application/pdf".into()),
            size_bytes: 42,
            extension: Some("pdf".into()),
            audience_type: AudienceType::Students,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_course_document_attaches_to_own_course_only() {
        let course = Uuid::new_v4();
        let doc = document(Some(course));
        assert!(doc.is_attachable_to(course));
        assert!(!doc.is_attachable_to(Uuid::new_v4()));
    }

    #[test]
    fn test_organization_document_attaches_anywhere() {
        assert!(document(None).is_attachable_to(Uuid::new_v4()));
    }
}
