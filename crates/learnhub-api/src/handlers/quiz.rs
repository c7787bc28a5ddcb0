//! Quiz authoring handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use learnhub_auth::Permission;
use learnhub_core::types::PageResponse;
use learnhub_entity::quiz::{Quiz, QuizWithQuestions};
use learnhub_service::quiz::{QuizPayload, QuizQuestionInput};
use learnhub_service::validation::ReorderRequest;

use crate::dto::{ApiResponse, Created, ListQuery, QuizQuery, created, ok, ok_message};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, Payload};
use crate::state::AppState;

/// GET /api/quizzes
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
    Query(filter): Query<QuizQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<Quiz>>>> {
    auth.require(&state, Permission::QuizzesTake)?;
    let page = state
        .services
        .quizzes
        .list(&auth, &filter.filter(&query), query.sort(), &query.page())
        .await?;
    Ok(ok(page))
}

/// GET /api/quizzes/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<QuizWithQuestions>>> {
    auth.require(&state, Permission::QuizzesTake)?;
    Ok(ok(state.services.quizzes.show(&auth, id).await?))
}

/// POST /api/quizzes
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Payload<QuizPayload>,
) -> ApiResult<Created<QuizWithQuestions>> {
    auth.require(&state, Permission::QuizzesManage)?;
    Ok(created(state.services.quizzes.create(&auth, payload.data).await?))
}

/// PUT /api/quizzes/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Payload<QuizPayload>,
) -> ApiResult<Json<ApiResponse<Quiz>>> {
    auth.require(&state, Permission::QuizzesManage)?;
    Ok(ok(state.services.quizzes.update(&auth, id, payload.data).await?))
}

/// DELETE /api/quizzes/{id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    auth.require(&state, Permission::QuizzesManage)?;
    state.services.quizzes.destroy(&auth, id).await?;
    Ok(ok_message("Quiz deleted"))
}

/// POST /api/quizzes/{id}/publish
pub async fn publish(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Quiz>>> {
    auth.require(&state, Permission::QuizzesManage)?;
    Ok(ok(state.services.quizzes.set_published(&auth, id, true).await?))
}

/// POST /api/quizzes/{id}/unpublish
pub async fn unpublish(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Quiz>>> {
    auth.require(&state, Permission::QuizzesManage)?;
    Ok(ok(state.services.quizzes.set_published(&auth, id, false).await?))
}

/// POST /api/quizzes/{id}/duplicate
pub async fn duplicate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Created<QuizWithQuestions>> {
    auth.require(&state, Permission::QuizzesManage)?;
    Ok(created(state.services.quizzes.duplicate(&auth, id).await?))
}

/// POST /api/quizzes/{id}/questions
pub async fn add_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Payload<QuizQuestionInput>,
) -> ApiResult<Created<QuizWithQuestions>> {
    auth.require(&state, Permission::QuizzesManage)?;
    Ok(created(state.services.quizzes.add_question(&auth, id, payload.data).await?))
}

/// PUT /api/quizzes/{id}/questions/{question_id}
pub async fn update_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, question_id)): Path<(Uuid, Uuid)>,
    payload: Payload<QuizQuestionInput>,
) -> ApiResult<Json<ApiResponse<QuizWithQuestions>>> {
    auth.require(&state, Permission::QuizzesManage)?;
    let quiz = state
        .services
        .quizzes
        .update_question(&auth, id, question_id, payload.data)
        .await?;
    Ok(ok(quiz))
}

/// DELETE /api/quizzes/{id}/questions/{question_id}
pub async fn delete_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, question_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<Quiz>>> {
    auth.require(&state, Permission::QuizzesManage)?;
    Ok(ok(state.services.quizzes.delete_question(&auth, id, question_id).await?))
}

/// PUT /api/quizzes/{id}/questions/reorder
pub async fn reorder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Payload<ReorderRequest>,
) -> ApiResult<Json<ApiResponse<QuizWithQuestions>>> {
    auth.require(&state, Permission::QuizzesManage)?;
    Ok(ok(state.services.quizzes.reorder(&auth, id, payload.data).await?))
}
