//! Document folders. System folders are provisioned per course and are
//! immutable through this service.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_core::traits::Clock;
use learnhub_core::types::{PageRequest, PageResponse};
use learnhub_database::store::{CourseStore, DocumentStore, FolderFilter, FolderStore};
use learnhub_entity::document::{CreateDocumentFolder, DocumentFolder, DocumentFolderItem, FolderWithItems};

use crate::context::RequestContext;
use crate::validation::{ReorderRequest, non_blank, validate};

/// Payload creating a user folder.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Name.
    #[validate(length(min = 1, max = 255, message = "The name field must be between 1 and 255 characters"))]
    pub name: String,
    /// Icon name.
    #[serde(default)]
    #[validate(length(max = 64, message = "The icon field may not be greater than 64 characters"))]
    pub icon: Option<String>,
    /// Display color.
    #[serde(default)]
    #[validate(length(max = 32, message = "The color field may not be greater than 32 characters"))]
    pub color: Option<String>,
    /// Course the folder belongs to.
    #[serde(default)]
    pub course_id: Option<Uuid>,
}

/// Payload updating a user folder.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateFolderRequest {
    /// Name.
    #[validate(length(min = 1, max = 255, message = "The name field must be between 1 and 255 characters"))]
    pub name: Option<String>,
    /// Icon name.
    #[validate(length(max = 64, message = "The icon field may not be greater than 64 characters"))]
    pub icon: Option<String>,
    /// Display color.
    #[validate(length(max = 32, message = "The color field may not be greater than 32 characters"))]
    pub color: Option<String>,
}

/// Body adding a document to a folder.
#[derive(Debug, Clone, Deserialize)]
pub struct AddFolderItemRequest {
    /// Library document.
    pub document_id: Uuid,
}

const SYSTEM_FOLDER_LOCKED: &str = "System folders cannot be modified";

/// Manages folders and their membership.
#[derive(Debug, Clone)]
pub struct FolderService {
    folders: Arc<dyn FolderStore>,
    documents: Arc<dyn DocumentStore>,
    courses: Arc<dyn CourseStore>,
    clock: Arc<dyn Clock>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        documents: Arc<dyn DocumentStore>,
        courses: Arc<dyn CourseStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            folders,
            documents,
            courses,
            clock,
        }
    }

    /// Folders of the tenant, system folders first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &FolderFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DocumentFolder>> {
        self.folders.list_folders(ctx.org(), filter, page).await
    }

    /// A folder with its ordered items.
    pub async fn show(&self, ctx: &RequestContext, id: Uuid) -> AppResult<FolderWithItems> {
        let folder = self.get(ctx, id).await?;
        let items = self.folders.folder_items(folder.id).await?;
        Ok(FolderWithItems { folder, items })
    }

    /// Create a user folder.
    pub async fn create(&self, ctx: &RequestContext, req: CreateFolderRequest) -> AppResult<DocumentFolder> {
        validate(&req)?;
        if let Some(course_id) = req.course_id {
            self.courses
                .find_course(ctx.org(), course_id)
                .await?
                .ok_or_else(|| AppError::field("course_id", "exists", "The selected course_id is invalid"))?;
        }

        let folder = self
            .folders
            .create_folder(&CreateDocumentFolder {
                organization_id: ctx.org(),
                course_id: req.course_id,
                name: req.name.trim().to_string(),
                icon: non_blank(req.icon),
                color: non_blank(req.color),
                is_system: false,
                created_by: ctx.user_id(),
                created_at: self.clock.now(),
            })
            .await?;

        info!(user_id = %ctx.user_id(), folder_id = %folder.id, "Folder created");
        Ok(folder)
    }

    /// Rename or restyle a user folder.
    pub async fn update(&self, ctx: &RequestContext, id: Uuid, req: UpdateFolderRequest) -> AppResult<DocumentFolder> {
        let mut folder = self.get(ctx, id).await?;
        if folder.is_system {
            return Err(AppError::forbidden(SYSTEM_FOLDER_LOCKED));
        }
        validate(&req)?;

        if let Some(name) = non_blank(req.name) {
            folder.name = name;
        }
        if req.icon.is_some() {
            folder.icon = non_blank(req.icon);
        }
        if req.color.is_some() {
            folder.color = non_blank(req.color);
        }
        folder.updated_at = self.clock.now();

        let folder = self.folders.save_folder(&folder).await?;
        info!(folder_id = %folder.id, "Folder updated");
        Ok(folder)
    }

    /// Delete a user folder. Its documents stay in the library.
    pub async fn destroy(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let folder = self.get(ctx, id).await?;
        if folder.is_system {
            return Err(AppError::forbidden("System folders cannot be deleted"));
        }
        if !self.folders.delete_folder(ctx.org(), folder.id).await? {
            return Err(AppError::not_found("Folder not found"));
        }
        info!(user_id = %ctx.user_id(), folder_id = %folder.id, "Folder deleted");
        Ok(())
    }

    /// Append a library document to a folder.
    pub async fn add_document(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        req: AddFolderItemRequest,
    ) -> AppResult<DocumentFolderItem> {
        let folder = self.get(ctx, folder_id).await?;
        let document = self
            .documents
            .find_document(ctx.org(), req.document_id)
            .await?
            .ok_or_else(|| AppError::field("document_id", "exists", "The selected document_id is invalid"))?;

        let item = self
            .folders
            .add_folder_item(folder.id, document.id, self.clock.now())
            .await?;
        info!(folder_id = %folder.id, document_id = %document.id, "Document added to folder");
        Ok(item)
    }

    /// Take a document out of a folder.
    pub async fn remove_document(&self, ctx: &RequestContext, folder_id: Uuid, document_id: Uuid) -> AppResult<()> {
        let folder = self.get(ctx, folder_id).await?;
        if !self.folders.remove_folder_item(folder.id, document_id).await? {
            return Err(AppError::not_found("Document is not in this folder"));
        }
        Ok(())
    }

    /// Rewrite item positions to match `req.ids`.
    pub async fn reorder(&self, ctx: &RequestContext, folder_id: Uuid, req: ReorderRequest) -> AppResult<FolderWithItems> {
        validate(&req)?;
        let folder = self.get(ctx, folder_id).await?;
        self.folders.reorder_folder_items(folder.id, &req.ids).await?;
        let items = self.folders.folder_items(folder.id).await?;
        Ok(FolderWithItems { folder, items })
    }

    /// The course's system folder, created on first use.
    pub async fn ensure_system_folder(&self, ctx: &RequestContext, course_id: Uuid) -> AppResult<DocumentFolder> {
        let course = self
            .courses
            .find_course(ctx.org(), course_id)
            .await?
            .ok_or_else(|| AppError::not_found("Course not found"))?;
        self.folders.ensure_system_folder(&course, self.clock.now()).await
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<DocumentFolder> {
        self.folders
            .find_folder(ctx.org(), id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))
    }
}
