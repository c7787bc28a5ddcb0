//! Document library: uploads, metadata, downloads.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use learnhub_core::error::{AppError, FieldErrors};
use learnhub_core::result::AppResult;
use learnhub_core::traits::storage::ByteStream;
use learnhub_core::traits::{Clock, StorageProvider};
use learnhub_core::types::{PageRequest, PageResponse, SortField, lenient};
use learnhub_database::store::{CourseStore, DocumentFilter, DocumentStore, FolderStore};
use learnhub_entity::document::{AudienceType, CourseDocument, CreateCourseDocument};
use learnhub_storage::keys;

use crate::context::RequestContext;
use crate::upload::{UploadLimits, UploadedFile};
use crate::validation::{collect, non_blank, parse_enum};

/// Metadata sent with an upload or a metadata update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DocumentPayload {
    /// Display title; defaults to the file name on upload.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[validate(length(max = 255, message = "The title field may not be greater than 255 characters"))]
    pub title: Option<String>,
    /// Intended audience.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub audience_type: Option<String>,
    /// Owning course; absent for organization-level documents.
    #[serde(default, deserialize_with = "lenient::opt_uuid")]
    pub course_id: Option<Uuid>,
}

/// A document with its content stream.
pub struct DocumentDownload {
    /// The document row.
    pub document: CourseDocument,
    /// File contents.
    pub stream: ByteStream,
}

impl std::fmt::Debug for DocumentDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentDownload")
            .field("document", &self.document.id)
            .finish_non_exhaustive()
    }
}

/// Manages the document library.
#[derive(Debug, Clone)]
pub struct DocumentService {
    documents: Arc<dyn DocumentStore>,
    folders: Arc<dyn FolderStore>,
    courses: Arc<dyn CourseStore>,
    storage: Arc<dyn StorageProvider>,
    clock: Arc<dyn Clock>,
    limits: UploadLimits,
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        folders: Arc<dyn FolderStore>,
        courses: Arc<dyn CourseStore>,
        storage: Arc<dyn StorageProvider>,
        clock: Arc<dyn Clock>,
        limits: UploadLimits,
    ) -> Self {
        Self {
            documents,
            folders,
            courses,
            storage,
            clock,
            limits,
        }
    }

    /// Filtered, sorted, paginated documents.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &DocumentFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<CourseDocument>> {
        self.documents.list_documents(ctx.org(), filter, sort, page).await
    }

    /// One document of the tenant.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<CourseDocument> {
        self.documents
            .find_document(ctx.org(), id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))
    }

    /// Store an uploaded file and record it. A course document is also
    /// filed in the course's system folder.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        payload: DocumentPayload,
        file: Option<UploadedFile>,
    ) -> AppResult<CourseDocument> {
        let mut fields = FieldErrors::new();
        collect(&payload, &mut fields);
        let audience = parse_enum::<AudienceType>(&mut fields, "audience_type", payload.audience_type.as_deref());
        if file.is_none() {
            fields.add("file", "required", "The file field is required");
        }
        fields.into_result()?;
        let file = file.ok_or_else(|| AppError::field("file", "required", "The file field is required"))?;
        self.limits.check("file", &file)?;

        let course = match payload.course_id {
            Some(id) => Some(
                self.courses
                    .find_course(ctx.org(), id)
                    .await?
                    .ok_or_else(|| AppError::field("course_id", "exists", "The selected course_id is invalid"))?,
            ),
            None => None,
        };

        let now = self.clock.now();
        let path = keys::document(ctx.org(), &file.file_name);
        let data = CreateCourseDocument {
            id: Uuid::new_v4(),
            organization_id: ctx.org(),
            course_id: course.as_ref().map(|c| c.id),
            created_by: ctx.user_id(),
            title: non_blank(payload.title).unwrap_or_else(|| file.file_name.clone()),
            file_name: file.file_name.clone(),
            path: path.clone(),
            mime_type: file.mime_type(),
            size_bytes: file.size_bytes(),
            extension: file.extension(),
            audience_type: audience.unwrap_or_default(),
            created_at: now,
        };

        self.storage.write(&path, file.data).await?;
        let document = match self.documents.create_document(&data).await {
            Ok(document) => document,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&path).await {
                    warn!(path = %path, error = %cleanup, "Failed to remove orphaned document blob");
                }
                return Err(e);
            }
        };

        if let Some(course) = &course {
            let folder = self.folders.ensure_system_folder(course, now).await?;
            self.folders.add_folder_item(folder.id, document.id, now).await?;
        }

        info!(
            user_id = %ctx.user_id(),
            document_id = %document.id,
            size = document.size_bytes,
            "Document uploaded"
        );
        Ok(document)
    }

    /// Update title and audience.
    pub async fn update(&self, ctx: &RequestContext, id: Uuid, payload: DocumentPayload) -> AppResult<CourseDocument> {
        let mut fields = FieldErrors::new();
        collect(&payload, &mut fields);
        let audience = parse_enum::<AudienceType>(&mut fields, "audience_type", payload.audience_type.as_deref());
        fields.into_result()?;

        let mut document = self.get(ctx, id).await?;
        if let Some(title) = non_blank(payload.title) {
            document.title = title;
        }
        if let Some(audience) = audience {
            document.audience_type = audience;
        }
        document.updated_at = self.clock.now();

        let document = self.documents.save_document(&document).await?;
        info!(document_id = %document.id, "Document updated");
        Ok(document)
    }

    /// Open the document's content.
    pub async fn download(&self, ctx: &RequestContext, id: Uuid) -> AppResult<DocumentDownload> {
        let document = self.get(ctx, id).await?;
        let stream = self.storage.read(&document.path).await?;
        Ok(DocumentDownload { document, stream })
    }

    /// Delete the document row and its blob.
    pub async fn destroy(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let document = self.get(ctx, id).await?;
        if !self.documents.delete_document(ctx.org(), document.id).await? {
            return Err(AppError::not_found("Document not found"));
        }
        if let Err(e) = self.storage.delete(&document.path).await {
            warn!(document_id = %document.id, path = %document.path, error = %e, "Failed to delete document blob");
        }
        info!(user_id = %ctx.user_id(), document_id = %document.id, "Document deleted");
        Ok(())
    }
}
