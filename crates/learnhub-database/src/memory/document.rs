use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_core::types::{PageRequest, PageResponse, SortField};
use learnhub_entity::course::Course;
use learnhub_entity::document::{
    CourseDocument, CreateCourseDocument, CreateDocumentFolder, DocumentFolder, DocumentFolderItem,
    FolderItemView, SYSTEM_FOLDER_COLOR, SYSTEM_FOLDER_ICON,
};

use super::{MemoryStore, sort_rows};
use crate::store::filter::matches_search;
use crate::store::{
    DocumentFilter, DocumentStore, FolderFilter, FolderStore, duplicate_membership, reorder_rejected,
};

/// The system folder row provisioned for `course`.
pub(super) fn system_folder(course: &Course, now: DateTime<Utc>) -> DocumentFolder {
    DocumentFolder {
        id: Uuid::new_v4(),
        organization_id: course.organization_id,
        course_id: Some(course.id),
        name: DocumentFolder::system_name(&course.title),
        icon: Some(SYSTEM_FOLDER_ICON.to_string()),
        color: Some(SYSTEM_FOLDER_COLOR.to_string()),
        is_system: true,
        created_by: course.created_by,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(
        &self,
        organization_id: Uuid,
        filter: &DocumentFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<CourseDocument>> {
        let state = self.state.read().await;
        let mut rows: Vec<CourseDocument> = state
            .documents
            .values()
            .filter(|d| d.organization_id == organization_id)
            .filter(|d| filter.audience_type.is_none_or(|a| d.audience_type == a))
            .filter(|d| filter.course_id.is_none_or(|c| d.course_id == Some(c)))
            .filter(|d| matches_search(filter.search.as_deref(), &[d.title.as_str(), d.file_name.as_str()]))
            .cloned()
            .collect();
        sort_rows(&mut rows, sort);
        Ok(page.apply(rows))
    }

    async fn find_document(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<CourseDocument>> {
        let state = self.state.read().await;
        Ok(state.documents.get(&id).filter(|d| d.organization_id == organization_id).cloned())
    }

    async fn find_documents(&self, organization_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<CourseDocument>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.documents.get(id))
            .filter(|d| d.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn create_document(&self, data: &CreateCourseDocument) -> AppResult<CourseDocument> {
        let document = CourseDocument {
            id: data.id,
            organization_id: data.organization_id,
            course_id: data.course_id,
            created_by: data.created_by,
            title: data.title.clone(),
            file_name: data.file_name.clone(),
            path: data.path.clone(),
            mime_type: data.mime_type.clone(),
            size_bytes: data.size_bytes,
            extension: data.extension.clone(),
            audience_type: data.audience_type,
            created_at: data.created_at,
            updated_at: data.created_at,
        };
        self.state.write().await.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn save_document(&self, document: &CourseDocument) -> AppResult<CourseDocument> {
        let mut state = self.state.write().await;
        match state.documents.get_mut(&document.id) {
            Some(row) if row.organization_id == document.organization_id => {
                row.title = document.title.clone();
                row.audience_type = document.audience_type;
                row.course_id = document.course_id;
                row.updated_at = document.updated_at;
                Ok(row.clone())
            }
            _ => Err(AppError::not_found(format!("Document {} not found", document.id))),
        }
    }

    async fn delete_document(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if !state.documents.get(&id).is_some_and(|d| d.organization_id == organization_id) {
            return Ok(false);
        }
        state.documents.remove(&id);
        state.folder_items.retain(|(_, document_id), _| *document_id != id);
        Ok(true)
    }
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn list_folders(
        &self,
        organization_id: Uuid,
        filter: &FolderFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DocumentFolder>> {
        let state = self.state.read().await;
        let mut rows: Vec<DocumentFolder> = state
            .folders
            .values()
            .filter(|f| f.organization_id == organization_id)
            .filter(|f| filter.course_id.is_none_or(|c| f.course_id == Some(c)))
            .filter(|f| matches_search(filter.search.as_deref(), &[f.name.as_str()]))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.is_system
                .cmp(&a.is_system)
                .then_with(|| a.name.cmp(&b.name))
                .then(a.id.cmp(&b.id))
        });
        Ok(page.apply(rows))
    }

    async fn find_folder(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<DocumentFolder>> {
        let state = self.state.read().await;
        Ok(state.folders.get(&id).filter(|f| f.organization_id == organization_id).cloned())
    }

    async fn folder_items(&self, folder_id: Uuid) -> AppResult<Vec<FolderItemView>> {
        let state = self.state.read().await;
        let mut items: Vec<FolderItemView> = state
            .folder_items
            .values()
            .filter(|i| i.folder_id == folder_id)
            .filter_map(|i| {
                state.documents.get(&i.document_id).map(|document| FolderItemView {
                    order_index: i.order_index,
                    added_at: i.added_at,
                    document: document.clone(),
                })
            })
            .collect();
        items.sort_by(|a, b| a.order_index.cmp(&b.order_index).then(a.added_at.cmp(&b.added_at)));
        Ok(items)
    }

    async fn create_folder(&self, data: &CreateDocumentFolder) -> AppResult<DocumentFolder> {
        let folder = DocumentFolder {
            id: Uuid::new_v4(),
            organization_id: data.organization_id,
            course_id: data.course_id,
            name: data.name.clone(),
            icon: data.icon.clone(),
            color: data.color.clone(),
            is_system: data.is_system,
            created_by: data.created_by,
            created_at: data.created_at,
            updated_at: data.created_at,
        };
        self.state.write().await.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn ensure_system_folder(&self, course: &Course, now: DateTime<Utc>) -> AppResult<DocumentFolder> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .folders
            .values()
            .find(|f| f.is_system && f.course_id == Some(course.id))
        {
            return Ok(existing.clone());
        }
        let folder = system_folder(course, now);
        state.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn save_folder(&self, folder: &DocumentFolder) -> AppResult<DocumentFolder> {
        let mut state = self.state.write().await;
        match state.folders.get_mut(&folder.id) {
            Some(row) if row.organization_id == folder.organization_id && !row.is_system => {
                row.name = folder.name.clone();
                row.icon = folder.icon.clone();
                row.color = folder.color.clone();
                row.course_id = folder.course_id;
                row.updated_at = folder.updated_at;
                Ok(row.clone())
            }
            _ => Err(AppError::not_found(format!("Folder {} not found", folder.id))),
        }
    }

    async fn delete_folder(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let deletable = state
            .folders
            .get(&id)
            .is_some_and(|f| f.organization_id == organization_id && !f.is_system);
        if !deletable {
            return Ok(false);
        }
        state.folders.remove(&id);
        state.folder_items.retain(|(folder_id, _), _| *folder_id != id);
        Ok(true)
    }

    async fn add_folder_item(
        &self,
        folder_id: Uuid,
        document_id: Uuid,
        added_at: DateTime<Utc>,
    ) -> AppResult<DocumentFolderItem> {
        let mut state = self.state.write().await;
        if state.folder_items.contains_key(&(folder_id, document_id)) {
            return Err(duplicate_membership());
        }
        let order_index = state
            .folder_items
            .values()
            .filter(|i| i.folder_id == folder_id)
            .map(|i| i.order_index + 1)
            .max()
            .unwrap_or(0);
        let item = DocumentFolderItem { folder_id, document_id, order_index, added_at };
        state.folder_items.insert((folder_id, document_id), item.clone());
        Ok(item)
    }

    async fn remove_folder_item(&self, folder_id: Uuid, document_id: Uuid) -> AppResult<bool> {
        Ok(self.state.write().await.folder_items.remove(&(folder_id, document_id)).is_some())
    }

    async fn reorder_folder_items(&self, folder_id: Uuid, document_ids: &[Uuid]) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(foreign) = document_ids
            .iter()
            .find(|id| !state.folder_items.contains_key(&(folder_id, **id)))
        {
            return Err(reorder_rejected(*foreign));
        }
        for (index, document_id) in document_ids.iter().enumerate() {
            if let Some(item) = state.folder_items.get_mut(&(folder_id, *document_id)) {
                item.order_index = index as i32;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[tokio::test]
    async fn test_system_folder_is_provisioned_once_at_the_given_time() {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        let course = Course {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            title: "Forklift safety".into(),
            description: None,
            created_by: Uuid::new_v4(),
            created_at: at,
            updated_at: at,
        };
        let store = MemoryStore::new();

        let folder = store.ensure_system_folder(&course, at).await.unwrap();
        assert!(folder.is_system);
        assert_eq!(folder.created_at, at);

        let again = store
            .ensure_system_folder(&course, at + chrono::Duration::days(1))
            .await
            .unwrap();
        assert_eq!(again.id, folder.id);
        assert_eq!(again.created_at, at);
    }
}
