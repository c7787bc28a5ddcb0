//! Document library handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use uuid::Uuid;

use learnhub_auth::Permission;
use learnhub_core::types::PageResponse;
use learnhub_entity::document::CourseDocument;
use learnhub_service::document::DocumentPayload;
use learnhub_storage::mime;

use super::file_response;
use crate::dto::{ApiResponse, Created, DocumentQuery, ListQuery, created, ok, ok_message};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, Payload};
use crate::state::AppState;

/// GET /api/documents
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
    Query(filter): Query<DocumentQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<CourseDocument>>>> {
    auth.require(&state, Permission::DocumentsView)?;
    let filter = filter.filter(&query)?;
    let page = state
        .services
        .documents
        .list(&auth, &filter, query.sort(), &query.page())
        .await?;
    Ok(ok(page))
}

/// GET /api/documents/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<CourseDocument>>> {
    auth.require(&state, Permission::DocumentsView)?;
    Ok(ok(state.services.documents.get(&auth, id).await?))
}

/// POST /api/documents (multipart: `file` plus metadata)
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Payload<DocumentPayload>,
) -> ApiResult<Created<CourseDocument>> {
    auth.require(&state, Permission::DocumentsManage)?;
    let (data, file) = payload.into_single_file();
    Ok(created(state.services.documents.upload(&auth, data, file).await?))
}

/// PUT /api/documents/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Payload<DocumentPayload>,
) -> ApiResult<Json<ApiResponse<CourseDocument>>> {
    auth.require(&state, Permission::DocumentsManage)?;
    Ok(ok(state.services.documents.update(&auth, id, payload.data).await?))
}

/// DELETE /api/documents/{id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    auth.require(&state, Permission::DocumentsManage)?;
    state.services.documents.destroy(&auth, id).await?;
    Ok(ok_message("Document deleted"))
}

/// GET /api/documents/{id}/download
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    auth.require(&state, Permission::DocumentsView)?;
    let download = state.services.documents.download(&auth, id).await?;
    let document = download.document;
    let content_type = document
        .mime_type
        .clone()
        .unwrap_or_else(|| mime::content_type(&document.file_name).to_string());
    Ok(file_response(
        &document.file_name,
        &content_type,
        Body::from_stream(download.stream),
    ))
}
