//! Dashboard counters.

use axum::Json;
use axum::extract::State;

use learnhub_auth::Permission;
use learnhub_entity::statistics::OrganizationOverview;

use crate::dto::{ApiResponse, ok};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/statistics/overview
pub async fn overview(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<OrganizationOverview>>> {
    auth.require(&state, Permission::StatisticsView)?;
    Ok(ok(state.services.statistics.overview(&auth).await?))
}
