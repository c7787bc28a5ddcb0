//! Document folder handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use learnhub_auth::Permission;
use learnhub_core::types::PageResponse;
use learnhub_entity::document::{DocumentFolder, DocumentFolderItem, FolderWithItems};
use learnhub_service::document::{AddFolderItemRequest, CreateFolderRequest, UpdateFolderRequest};
use learnhub_service::validation::ReorderRequest;

use crate::dto::{ApiResponse, Created, FolderQuery, ListQuery, created, ok, ok_message};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, Payload};
use crate::state::AppState;

/// GET /api/document-folders
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
    Query(filter): Query<FolderQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<DocumentFolder>>>> {
    auth.require(&state, Permission::DocumentsView)?;
    let page = state
        .services
        .folders
        .list(&auth, &filter.filter(&query), &query.page())
        .await?;
    Ok(ok(page))
}

/// GET /api/document-folders/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<FolderWithItems>>> {
    auth.require(&state, Permission::DocumentsView)?;
    Ok(ok(state.services.folders.show(&auth, id).await?))
}

/// POST /api/document-folders
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Payload<CreateFolderRequest>,
) -> ApiResult<Created<DocumentFolder>> {
    auth.require(&state, Permission::DocumentsManage)?;
    Ok(created(state.services.folders.create(&auth, payload.data).await?))
}

/// PUT /api/document-folders/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Payload<UpdateFolderRequest>,
) -> ApiResult<Json<ApiResponse<DocumentFolder>>> {
    auth.require(&state, Permission::DocumentsManage)?;
    Ok(ok(state.services.folders.update(&auth, id, payload.data).await?))
}

/// DELETE /api/document-folders/{id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    auth.require(&state, Permission::DocumentsManage)?;
    state.services.folders.destroy(&auth, id).await?;
    Ok(ok_message("Folder deleted"))
}

/// POST /api/document-folders/{id}/items
pub async fn add_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Payload<AddFolderItemRequest>,
) -> ApiResult<Created<DocumentFolderItem>> {
    auth.require(&state, Permission::DocumentsManage)?;
    Ok(created(state.services.folders.add_document(&auth, id, payload.data).await?))
}

/// DELETE /api/document-folders/{id}/items/{document_id}
pub async fn remove_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, document_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<()>>> {
    auth.require(&state, Permission::DocumentsManage)?;
    state.services.folders.remove_document(&auth, id, document_id).await?;
    Ok(ok_message("Document removed from folder"))
}

/// PUT /api/document-folders/{id}/items/reorder
pub async fn reorder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Payload<ReorderRequest>,
) -> ApiResult<Json<ApiResponse<FolderWithItems>>> {
    auth.require(&state, Permission::DocumentsManage)?;
    Ok(ok(state.services.folders.reorder(&auth, id, payload.data).await?))
}
