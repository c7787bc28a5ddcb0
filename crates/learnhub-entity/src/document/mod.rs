//! Course document library: documents, folders and folder membership.

pub mod folder;
pub mod model;

pub use folder::{
    CreateDocumentFolder, DocumentFolder, DocumentFolderItem, FolderItemView, FolderWithItems,
    SYSTEM_FOLDER_COLOR, SYSTEM_FOLDER_ICON,
};
pub use model::{AudienceType, CourseDocument, CreateCourseDocument};
