//! Document folders and their ordered membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::model::CourseDocument;

/// Icon of every system folder.
pub const SYSTEM_FOLDER_ICON: &str = "folder-lock";
/// Color of every system folder.
pub const SYSTEM_FOLDER_COLOR: &str = "#6B7280";

/// A folder grouping library documents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentFolder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Course of a system folder, or the optional course of a user folder.
    pub course_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Icon name.
    pub icon: Option<String>,
    /// Hex color.
    pub color: Option<String>,
    /// System folders are provisioned per course and cannot be renamed or deleted.
    pub is_system: bool,
    /// Creating user.
    pub created_by: Uuid,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl DocumentFolder {
    /// Name of the system folder for a course titled `course_title`.
    pub fn system_name(course_title: &str) -> String {
        format!("{course_title} documents")
    }
}

/// Data required to create a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentFolder {
    /// Owning organization.
    pub organization_id: Uuid,
    /// Optional course.
    pub course_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Icon name.
    pub icon: Option<String>,
    /// Hex color.
    pub color: Option<String>,
    /// System flag.
    pub is_system: bool,
    /// Creating user.
    pub created_by: Uuid,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// Membership of a document in a folder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentFolderItem {
    /// Folder.
    pub folder_id: Uuid,
    /// Document.
    pub document_id: Uuid,
    /// Zero-based position within the folder.
    pub order_index: i32,
    /// When the document was added.
    pub added_at: DateTime<Utc>,
}

/// A folder item joined with its document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderItemView {
    /// Position within the folder.
    pub order_index: i32,
    /// When the document was added.
    pub added_at: DateTime<Utc>,
    /// The document itself.
    pub document: CourseDocument,
}

/// A folder with its ordered items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderWithItems {
    /// Folder row.
    #[serde(flatten)]
    pub folder: DocumentFolder,
    /// Items sorted by `order_index`.
    pub items: Vec<FolderItemView>,
}
