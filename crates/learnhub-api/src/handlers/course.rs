//! Course and session handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use learnhub_auth::Permission;
use learnhub_core::types::PageResponse;
use learnhub_entity::course::{Course, Session};
use learnhub_service::course::{CreateCourseRequest, CreateSessionRequest, UpdateCourseRequest};

use crate::dto::{ApiResponse, Created, ListQuery, created, ok};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, Payload};
use crate::state::AppState;

/// GET /api/courses
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<Course>>>> {
    let page = state
        .services
        .courses
        .list(&auth, query.search.as_deref(), query.sort(), &query.page())
        .await?;
    Ok(ok(page))
}

/// GET /api/courses/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Course>>> {
    Ok(ok(state.services.courses.get(&auth, id).await?))
}

/// POST /api/courses
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Payload<CreateCourseRequest>,
) -> ApiResult<Created<Course>> {
    auth.require(&state, Permission::CoursesManage)?;
    let (course, _) = state.services.courses.create(&auth, payload.data).await?;
    Ok(created(course))
}

/// PUT /api/courses/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Payload<UpdateCourseRequest>,
) -> ApiResult<Json<ApiResponse<Course>>> {
    auth.require(&state, Permission::CoursesManage)?;
    Ok(ok(state.services.courses.update(&auth, id, payload.data).await?))
}

/// GET /api/courses/{id}/sessions
pub async fn sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<Session>>>> {
    Ok(ok(state.services.courses.sessions(&auth, id).await?))
}

/// POST /api/courses/{id}/sessions
pub async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Payload<CreateSessionRequest>,
) -> ApiResult<Created<Session>> {
    auth.require(&state, Permission::CoursesManage)?;
    Ok(created(state.services.courses.create_session(&auth, id, payload.data).await?))
}

/// GET /api/sessions/{id}
pub async fn show_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Session>>> {
    Ok(ok(state.services.courses.get_session(&auth, id).await?))
}
