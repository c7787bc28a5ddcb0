//! Course document repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_core::types::{PageRequest, PageResponse, SortField};
use learnhub_entity::document::{CourseDocument, CreateCourseDocument};

use super::db_error;
use crate::store::filter::like_pattern;
use crate::store::{DocumentFilter, DocumentStore};

const DOCUMENT_FILTER: &str = "organization_id = $1 \
    AND ($2::audience_type IS NULL OR audience_type = $2) \
    AND ($3::uuid IS NULL OR course_id = $3) \
    AND ($4::text IS NULL OR title ILIKE $4 OR file_name ILIKE $4)";

/// Repository for library documents.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn list_documents(
        &self,
        organization_id: Uuid,
        filter: &DocumentFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<CourseDocument>> {
        let pattern = like_pattern(filter.search.as_deref());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM course_documents WHERE {DOCUMENT_FILTER}"
        ))
        .bind(organization_id)
        .bind(filter.audience_type)
        .bind(filter.course_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count documents"))?;

        let documents = sqlx::query_as::<_, CourseDocument>(&format!(
            "SELECT * FROM course_documents WHERE {DOCUMENT_FILTER} {} LIMIT $5 OFFSET $6",
            sort.order_by("title")
        ))
        .bind(organization_id)
        .bind(filter.audience_type)
        .bind(filter.course_id)
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list documents"))?;

        Ok(PageResponse::new(documents, page, total as u64))
    }

    async fn find_document(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<CourseDocument>> {
        sqlx::query_as::<_, CourseDocument>(
            "SELECT * FROM course_documents WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find document"))
    }

    async fn find_documents(&self, organization_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<CourseDocument>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, CourseDocument>(
            "SELECT * FROM course_documents WHERE organization_id = $1 AND id = ANY($2)",
        )
        .bind(organization_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to resolve documents"))
    }

    async fn create_document(&self, data: &CreateCourseDocument) -> AppResult<CourseDocument> {
        sqlx::query_as::<_, CourseDocument>(
            "INSERT INTO course_documents \
                (id, organization_id, course_id, created_by, title, file_name, path, mime_type, \
                 size_bytes, extension, audience_type, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12) RETURNING *",
        )
        .bind(data.id)
        .bind(data.organization_id)
        .bind(data.course_id)
        .bind(data.created_by)
        .bind(&data.title)
        .bind(&data.file_name)
        .bind(&data.path)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(&data.extension)
        .bind(data.audience_type)
        .bind(data.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create document"))
    }

    async fn save_document(&self, document: &CourseDocument) -> AppResult<CourseDocument> {
        sqlx::query_as::<_, CourseDocument>(
            "UPDATE course_documents SET title = $3, audience_type = $4, course_id = $5, updated_at = $6 \
             WHERE id = $1 AND organization_id = $2 RETURNING *",
        )
        .bind(document.id)
        .bind(document.organization_id)
        .bind(&document.title)
        .bind(document.audience_type)
        .bind(document.course_id)
        .bind(document.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update document"))?
        .ok_or_else(|| AppError::not_found(format!("Document {} not found", document.id)))
    }

    async fn delete_document(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM course_documents WHERE id = $1 AND organization_id = $2")
            .bind(id)
            .bind(organization_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete document"))?;
        Ok(result.rows_affected() > 0)
    }
}
