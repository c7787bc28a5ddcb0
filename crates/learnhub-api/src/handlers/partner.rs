//! Company and funder handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use uuid::Uuid;

use learnhub_auth::Permission;
use learnhub_core::types::PageResponse;
use learnhub_entity::partner::{Company, Funder};
use learnhub_service::partner::{CompanyPayload, FunderPayload};

use crate::dto::{ApiResponse, Created, ExportQuery, ListQuery, created, ok, ok_message};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, Payload};
use crate::handlers::export_response;
use crate::state::AppState;

/// GET /api/companies
pub async fn list_companies(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<Company>>>> {
    auth.require(&state, Permission::PartnersManage)?;
    let page = state
        .services
        .partners
        .list_companies(&auth, &query.partner_filter(), query.sort(), &query.page())
        .await?;
    Ok(ok(page))
}

/// GET /api/companies/{id}
pub async fn show_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Company>>> {
    auth.require(&state, Permission::PartnersManage)?;
    Ok(ok(state.services.partners.company(&auth, id).await?))
}

/// POST /api/companies
pub async fn create_company(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Payload<CompanyPayload>,
) -> ApiResult<Created<Company>> {
    auth.require(&state, Permission::PartnersManage)?;
    Ok(created(state.services.partners.create_company(&auth, payload.data).await?))
}

/// PUT /api/companies/{id}
pub async fn update_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Payload<CompanyPayload>,
) -> ApiResult<Json<ApiResponse<Company>>> {
    auth.require(&state, Permission::PartnersManage)?;
    Ok(ok(state.services.partners.update_company(&auth, id, payload.data).await?))
}

/// DELETE /api/companies/{id}
pub async fn delete_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    auth.require(&state, Permission::PartnersManage)?;
    state.services.partners.delete_company(&auth, id).await?;
    Ok(ok_message("Company deleted"))
}

/// GET /api/companies/export
pub async fn export_companies(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
    Query(export): Query<ExportQuery>,
) -> ApiResult<Response> {
    auth.require(&state, Permission::PartnersManage)?;
    auth.require(&state, Permission::ExportsRun)?;
    let file = state
        .services
        .exports
        .companies(&auth, &query.partner_filter(), query.sort(), export.format()?)
        .await?;
    Ok(export_response(file))
}

/// GET /api/funders
pub async fn list_funders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<Funder>>>> {
    auth.require(&state, Permission::PartnersManage)?;
    let page = state
        .services
        .partners
        .list_funders(&auth, &query.partner_filter(), query.sort(), &query.page())
        .await?;
    Ok(ok(page))
}

/// GET /api/funders/{id}
pub async fn show_funder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Funder>>> {
    auth.require(&state, Permission::PartnersManage)?;
    Ok(ok(state.services.partners.funder(&auth, id).await?))
}

/// POST /api/funders
pub async fn create_funder(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Payload<FunderPayload>,
) -> ApiResult<Created<Funder>> {
    auth.require(&state, Permission::PartnersManage)?;
    Ok(created(state.services.partners.create_funder(&auth, payload.data).await?))
}

/// PUT /api/funders/{id}
pub async fn update_funder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Payload<FunderPayload>,
) -> ApiResult<Json<ApiResponse<Funder>>> {
    auth.require(&state, Permission::PartnersManage)?;
    Ok(ok(state.services.partners.update_funder(&auth, id, payload.data).await?))
}

/// DELETE /api/funders/{id}
pub async fn delete_funder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    auth.require(&state, Permission::PartnersManage)?;
    state.services.partners.delete_funder(&auth, id).await?;
    Ok(ok_message("Funder deleted"))
}

/// GET /api/funders/export
pub async fn export_funders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
    Query(export): Query<ExportQuery>,
) -> ApiResult<Response> {
    auth.require(&state, Permission::PartnersManage)?;
    auth.require(&state, Permission::ExportsRun)?;
    let file = state
        .services
        .exports
        .funders(&auth, &query.partner_filter(), query.sort(), export.format()?)
        .await?;
    Ok(export_response(file))
}
