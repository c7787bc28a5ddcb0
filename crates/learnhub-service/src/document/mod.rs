//! Course document library and folders.

pub mod folder;
pub mod service;

pub use folder::{AddFolderItemRequest, CreateFolderRequest, FolderService, UpdateFolderRequest};
pub use service::{DocumentDownload, DocumentPayload, DocumentService};
