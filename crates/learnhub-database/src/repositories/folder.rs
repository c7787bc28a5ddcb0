//! Document folder repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use learnhub_core::error::{AppError, ErrorKind};
use learnhub_core::result::AppResult;
use learnhub_core::types::{PageRequest, PageResponse};
use learnhub_entity::course::Course;
use learnhub_entity::document::{
    CourseDocument, CreateDocumentFolder, DocumentFolder, DocumentFolderItem, FolderItemView,
    SYSTEM_FOLDER_COLOR, SYSTEM_FOLDER_ICON,
};

use super::{db_error, violates};
use crate::store::filter::like_pattern;
use crate::store::{FolderFilter, FolderStore, duplicate_membership, reorder_rejected};

const FOLDER_FILTER: &str = "organization_id = $1 \
    AND ($2::uuid IS NULL OR course_id = $2) \
    AND ($3::text IS NULL OR name ILIKE $3)";

/// Repository for document folders and their items.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn list_folders(
        &self,
        organization_id: Uuid,
        filter: &FolderFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DocumentFolder>> {
        let pattern = like_pattern(filter.search.as_deref());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM document_folders WHERE {FOLDER_FILTER}"
        ))
        .bind(organization_id)
        .bind(filter.course_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count folders"))?;

        let folders = sqlx::query_as::<_, DocumentFolder>(&format!(
            "SELECT * FROM document_folders WHERE {FOLDER_FILTER} \
             ORDER BY is_system DESC, name ASC, id ASC LIMIT $4 OFFSET $5"
        ))
        .bind(organization_id)
        .bind(filter.course_id)
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list folders"))?;

        Ok(PageResponse::new(folders, page, total as u64))
    }

    async fn find_folder(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<DocumentFolder>> {
        sqlx::query_as::<_, DocumentFolder>(
            "SELECT * FROM document_folders WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find folder"))
    }

    async fn folder_items(&self, folder_id: Uuid) -> AppResult<Vec<FolderItemView>> {
        let items = sqlx::query_as::<_, DocumentFolderItem>(
            "SELECT * FROM document_folder_items WHERE folder_id = $1 \
             ORDER BY order_index ASC, added_at ASC",
        )
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list folder items"))?;

        let ids: Vec<Uuid> = items.iter().map(|i| i.document_id).collect();
        let documents = sqlx::query_as::<_, CourseDocument>(
            "SELECT * FROM course_documents WHERE id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load folder documents"))?;

        Ok(items
            .into_iter()
            .filter_map(|item| {
                documents
                    .iter()
                    .find(|d| d.id == item.document_id)
                    .map(|document| FolderItemView {
                        order_index: item.order_index,
                        added_at: item.added_at,
                        document: document.clone(),
                    })
            })
            .collect())
    }

    async fn create_folder(&self, data: &CreateDocumentFolder) -> AppResult<DocumentFolder> {
        sqlx::query_as::<_, DocumentFolder>(
            "INSERT INTO document_folders \
                (id, organization_id, course_id, name, icon, color, is_system, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.organization_id)
        .bind(data.course_id)
        .bind(&data.name)
        .bind(&data.icon)
        .bind(&data.color)
        .bind(data.is_system)
        .bind(data.created_by)
        .bind(data.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create folder"))
    }

    async fn ensure_system_folder(&self, course: &Course, now: DateTime<Utc>) -> AppResult<DocumentFolder> {
        sqlx::query(
            "INSERT INTO document_folders \
                (id, organization_id, course_id, name, icon, color, is_system, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8, $8) \
             ON CONFLICT (course_id) WHERE is_system DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(course.organization_id)
        .bind(course.id)
        .bind(DocumentFolder::system_name(&course.title))
        .bind(SYSTEM_FOLDER_ICON)
        .bind(SYSTEM_FOLDER_COLOR)
        .bind(course.created_by)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to provision system folder"))?;

        sqlx::query_as::<_, DocumentFolder>(
            "SELECT * FROM document_folders WHERE course_id = $1 AND is_system",
        )
        .bind(course.id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to load system folder"))
    }

    async fn save_folder(&self, folder: &DocumentFolder) -> AppResult<DocumentFolder> {
        sqlx::query_as::<_, DocumentFolder>(
            "UPDATE document_folders SET name = $3, icon = $4, color = $5, course_id = $6, updated_at = $7 \
             WHERE id = $1 AND organization_id = $2 AND NOT is_system RETURNING *",
        )
        .bind(folder.id)
        .bind(folder.organization_id)
        .bind(&folder.name)
        .bind(&folder.icon)
        .bind(&folder.color)
        .bind(folder.course_id)
        .bind(folder.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update folder"))?
        .ok_or_else(|| AppError::not_found(format!("Folder {} not found", folder.id)))
    }

    async fn delete_folder(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM document_folders WHERE id = $1 AND organization_id = $2 AND NOT is_system",
        )
        .bind(id)
        .bind(organization_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to delete folder"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_folder_item(
        &self,
        folder_id: Uuid,
        document_id: Uuid,
        added_at: DateTime<Utc>,
    ) -> AppResult<DocumentFolderItem> {
        sqlx::query_as::<_, DocumentFolderItem>(
            "INSERT INTO document_folder_items (folder_id, document_id, order_index, added_at) \
             VALUES ($1, $2, \
                (SELECT COALESCE(MAX(order_index) + 1, 0) FROM document_folder_items WHERE folder_id = $1), \
                $3) \
             RETURNING *",
        )
        .bind(folder_id)
        .bind(document_id)
        .bind(added_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "document_folder_items_pkey") {
                duplicate_membership()
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to add document to folder", e)
            }
        })
    }

    async fn remove_folder_item(&self, folder_id: Uuid, document_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM document_folder_items WHERE folder_id = $1 AND document_id = $2",
        )
        .bind(folder_id)
        .bind(document_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to remove document from folder"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn reorder_folder_items(&self, folder_id: Uuid, document_ids: &[Uuid]) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        for (index, document_id) in document_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE document_folder_items SET order_index = $3 WHERE folder_id = $1 AND document_id = $2",
            )
            .bind(folder_id)
            .bind(document_id)
            .bind(index as i32)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to reorder folder items"))?;

            if result.rows_affected() == 0 {
                return Err(reorder_rejected(*document_id));
            }
        }

        tx.commit().await.map_err(db_error("Failed to commit folder reorder"))?;
        Ok(())
    }
}
