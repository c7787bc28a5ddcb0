//! Questionnaire handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use learnhub_auth::Permission;
use learnhub_core::types::PageResponse;
use learnhub_entity::questionnaire::{Questionnaire, QuestionnaireWithQuestions};
use learnhub_service::questionnaire::QuestionnairePayload;
use learnhub_service::validation::ReorderRequest;

use crate::dto::{ApiResponse, Created, ListQuery, QuestionnaireQuery, created, ok, ok_message};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, Payload};
use crate::state::AppState;

/// GET /api/questionnaires
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
    Query(filter): Query<QuestionnaireQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<Questionnaire>>>> {
    auth.require(&state, Permission::QuestionnairesManage)?;
    let filter = filter.filter(&query)?;
    let page = state
        .services
        .questionnaires
        .list(&auth, &filter, query.sort(), &query.page())
        .await?;
    Ok(ok(page))
}

/// GET /api/questionnaires/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<QuestionnaireWithQuestions>>> {
    auth.require(&state, Permission::QuestionnairesManage)?;
    Ok(ok(state.services.questionnaires.show(&auth, id).await?))
}

/// POST /api/questionnaires
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Payload<QuestionnairePayload>,
) -> ApiResult<Created<QuestionnaireWithQuestions>> {
    auth.require(&state, Permission::QuestionnairesManage)?;
    Ok(created(state.services.questionnaires.create(&auth, payload.data).await?))
}

/// PUT /api/questionnaires/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Payload<QuestionnairePayload>,
) -> ApiResult<Json<ApiResponse<QuestionnaireWithQuestions>>> {
    auth.require(&state, Permission::QuestionnairesManage)?;
    Ok(ok(state.services.questionnaires.update(&auth, id, payload.data).await?))
}

/// DELETE /api/questionnaires/{id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    auth.require(&state, Permission::QuestionnairesManage)?;
    state.services.questionnaires.destroy(&auth, id).await?;
    Ok(ok_message("Questionnaire deleted"))
}

/// POST /api/questionnaires/{id}/publish
pub async fn publish(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Questionnaire>>> {
    auth.require(&state, Permission::QuestionnairesManage)?;
    Ok(ok(state.services.questionnaires.set_published(&auth, id, true).await?))
}

/// POST /api/questionnaires/{id}/unpublish
pub async fn unpublish(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Questionnaire>>> {
    auth.require(&state, Permission::QuestionnairesManage)?;
    Ok(ok(state.services.questionnaires.set_published(&auth, id, false).await?))
}

/// POST /api/questionnaires/{id}/duplicate
pub async fn duplicate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Created<QuestionnaireWithQuestions>> {
    auth.require(&state, Permission::QuestionnairesManage)?;
    Ok(created(state.services.questionnaires.duplicate(&auth, id).await?))
}

/// PUT /api/questionnaires/{id}/questions/reorder
pub async fn reorder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Payload<ReorderRequest>,
) -> ApiResult<Json<ApiResponse<QuestionnaireWithQuestions>>> {
    auth.require(&state, Permission::QuestionnairesManage)?;
    Ok(ok(state.services.questionnaires.reorder(&auth, id, payload.data).await?))
}
