//! Flow action (automation rule) handlers, mounted under courses and sessions.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use learnhub_auth::Permission;
use learnhub_entity::automation::{AutomationRule, RuleOwner};
use learnhub_service::automation::{AutomationRuleDetails, RulePayload};

use crate::dto::{ApiResponse, Created, created, ok, ok_message};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, Payload};
use crate::state::AppState;

async fn list(state: AppState, auth: AuthUser, owner: RuleOwner) -> ApiResult<Json<ApiResponse<Vec<AutomationRule>>>> {
    auth.require(&state, Permission::AutomationManage)?;
    Ok(ok(state.services.automation.list(&auth, owner).await?))
}

async fn show(
    state: AppState,
    auth: AuthUser,
    owner: RuleOwner,
    id: Uuid,
) -> ApiResult<Json<ApiResponse<AutomationRuleDetails>>> {
    auth.require(&state, Permission::AutomationManage)?;
    Ok(ok(state.services.automation.show(&auth, owner, id).await?))
}

async fn create(
    state: AppState,
    auth: AuthUser,
    owner: RuleOwner,
    payload: Payload<RulePayload>,
) -> ApiResult<Created<AutomationRuleDetails>> {
    auth.require(&state, Permission::AutomationManage)?;
    let rule = state
        .services
        .automation
        .create(&auth, owner, payload.data, payload.files)
        .await?;
    Ok(created(rule))
}

async fn update(
    state: AppState,
    auth: AuthUser,
    owner: RuleOwner,
    id: Uuid,
    payload: Payload<RulePayload>,
) -> ApiResult<Json<ApiResponse<AutomationRuleDetails>>> {
    auth.require(&state, Permission::AutomationManage)?;
    let rule = state
        .services
        .automation
        .update(&auth, owner, id, payload.data, payload.files)
        .await?;
    Ok(ok(rule))
}

async fn delete(state: AppState, auth: AuthUser, owner: RuleOwner, id: Uuid) -> ApiResult<Json<ApiResponse<()>>> {
    auth.require(&state, Permission::AutomationManage)?;
    state.services.automation.delete(&auth, owner, id).await?;
    Ok(ok_message("Flow action deleted"))
}

/// GET /api/courses/{id}/flow-actions
pub async fn course_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<AutomationRule>>>> {
    list(state, auth, RuleOwner::Course(course_id)).await
}

/// GET /api/courses/{id}/flow-actions/{rule_id}
pub async fn course_show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((course_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<AutomationRuleDetails>>> {
    show(state, auth, RuleOwner::Course(course_id), id).await
}

/// POST /api/courses/{id}/flow-actions
pub async fn course_create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(course_id): Path<Uuid>,
    payload: Payload<RulePayload>,
) -> ApiResult<Created<AutomationRuleDetails>> {
    create(state, auth, RuleOwner::Course(course_id), payload).await
}

/// PUT /api/courses/{id}/flow-actions/{rule_id}
pub async fn course_update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((course_id, id)): Path<(Uuid, Uuid)>,
    payload: Payload<RulePayload>,
) -> ApiResult<Json<ApiResponse<AutomationRuleDetails>>> {
    update(state, auth, RuleOwner::Course(course_id), id, payload).await
}

/// DELETE /api/courses/{id}/flow-actions/{rule_id}
pub async fn course_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((course_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<()>>> {
    delete(state, auth, RuleOwner::Course(course_id), id).await
}

/// GET /api/sessions/{id}/flow-actions
pub async fn session_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<AutomationRule>>>> {
    list(state, auth, RuleOwner::Session(session_id)).await
}

/// GET /api/sessions/{id}/flow-actions/{rule_id}
pub async fn session_show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((session_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<AutomationRuleDetails>>> {
    show(state, auth, RuleOwner::Session(session_id), id).await
}

/// POST /api/sessions/{id}/flow-actions
pub async fn session_create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<Uuid>,
    payload: Payload<RulePayload>,
) -> ApiResult<Created<AutomationRuleDetails>> {
    create(state, auth, RuleOwner::Session(session_id), payload).await
}

/// PUT /api/sessions/{id}/flow-actions/{rule_id}
pub async fn session_update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((session_id, id)): Path<(Uuid, Uuid)>,
    payload: Payload<RulePayload>,
) -> ApiResult<Json<ApiResponse<AutomationRuleDetails>>> {
    update(state, auth, RuleOwner::Session(session_id), id, payload).await
}

/// DELETE /api/sessions/{id}/flow-actions/{rule_id}
pub async fn session_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((session_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<()>>> {
    delete(state, auth, RuleOwner::Session(session_id), id).await
}
