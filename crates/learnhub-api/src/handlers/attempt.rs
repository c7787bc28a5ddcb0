//! Quiz attempt handlers: taking, grading and exporting attempts.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use uuid::Uuid;

use learnhub_auth::Permission;
use learnhub_core::types::PageResponse;
use learnhub_entity::quiz::QuizAttempt;
use learnhub_service::quiz::SubmitAttemptRequest;

use crate::dto::{ApiResponse, AttemptQuery, Created, ExportQuery, ListQuery, created, ok};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, Payload};
use crate::handlers::export_response;
use crate::state::AppState;

/// GET /api/quizzes/{id}/attempts
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quiz_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
    Query(filter): Query<AttemptQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<QuizAttempt>>>> {
    auth.require(&state, Permission::QuizzesTake)?;
    let page = state
        .services
        .attempts
        .list(&auth, quiz_id, &filter.filter(), &query.page())
        .await?;
    Ok(ok(page))
}

/// POST /api/quizzes/{id}/attempts
pub async fn start(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quiz_id): Path<Uuid>,
) -> ApiResult<Created<QuizAttempt>> {
    auth.require(&state, Permission::QuizzesTake)?;
    Ok(created(state.services.attempts.start(&auth, quiz_id).await?))
}

/// POST /api/quiz-attempts/{id}/submit
pub async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Payload<SubmitAttemptRequest>,
) -> ApiResult<Json<ApiResponse<QuizAttempt>>> {
    auth.require(&state, Permission::QuizzesTake)?;
    Ok(ok(state.services.attempts.submit(&auth, id, payload.data).await?))
}

/// POST /api/quiz-attempts/{id}/grade
pub async fn grade(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<QuizAttempt>>> {
    auth.require(&state, Permission::QuizzesManage)?;
    Ok(ok(state.services.attempts.grade(&auth, id).await?))
}

/// POST /api/quiz-attempts/{id}/abandon
pub async fn abandon(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<QuizAttempt>>> {
    auth.require(&state, Permission::QuizzesTake)?;
    Ok(ok(state.services.attempts.abandon(&auth, id).await?))
}

/// GET /api/quizzes/{id}/attempts/export
pub async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quiz_id): Path<Uuid>,
    Query(filter): Query<AttemptQuery>,
    Query(export): Query<ExportQuery>,
) -> ApiResult<Response> {
    auth.require(&state, Permission::ExportsRun)?;
    let file = state
        .services
        .exports
        .attempts(&auth, quiz_id, &filter.filter(), export.format()?)
        .await?;
    Ok(export_response(file))
}
