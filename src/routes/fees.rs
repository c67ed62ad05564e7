use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{auth::require_admin, tenant::TenantSlug},
    models::{
        auth::AuthenticatedUser,
        fee::{CreateFeeHeadRequest, SetFeeStructureRequest},
    },
    services::fees::FeeCatalogService,
    AppState,
};

pub async fn list_fee_heads(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    _user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError> {
    let heads = FeeCatalogService::list_fee_heads(&state.db, &tenant).await?;
    Ok(Json(serde_json::to_value(heads).unwrap()))
}

pub async fn create_fee_head(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Json(body): Json<CreateFeeHeadRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_admin(&user)?;
    let head = FeeCatalogService::create_fee_head(&state.db, &tenant, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(head).unwrap())))
}

pub async fn delete_fee_head(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    FeeCatalogService::delete_fee_head(&state.db, &tenant, id).await?;
    Ok(Json(json!({ "message": "Fee head deleted" })))
}

#[derive(Deserialize)]
pub struct ListStructuresQuery {
    pub class_id: Uuid,
    pub month_year: String,
}

pub async fn list_fee_structures(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    _user: AuthenticatedUser,
    Query(params): Query<ListStructuresQuery>,
) -> Result<Json<Value>, ApiError> {
    let structures =
        FeeCatalogService::list_structures(&state.db, &tenant, params.class_id, &params.month_year)
            .await?;
    Ok(Json(serde_json::to_value(structures).unwrap()))
}

/// PUT-like POST: setting a structure for an existing (class, head, month)
/// key overwrites its amount instead of duplicating.
pub async fn set_fee_structure(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Json(body): Json<SetFeeStructureRequest>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    let structure = FeeCatalogService::set_fee_structure(&state.db, &tenant, &body).await?;
    Ok(Json(serde_json::to_value(structure).unwrap()))
}
