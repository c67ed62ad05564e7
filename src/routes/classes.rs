use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{auth::require_admin, tenant::TenantSlug},
    models::{
        auth::AuthenticatedUser,
        class::{CreateClassRequest, UpdateClassRequest},
    },
    services::classes::ClassService,
    AppState,
};

pub async fn list_classes(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    _user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError> {
    let classes = ClassService::list(&state.db, &tenant).await?;
    Ok(Json(serde_json::to_value(classes).unwrap()))
}

pub async fn create_class(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Json(body): Json<CreateClassRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_admin(&user)?;
    let class = ClassService::create(&state.db, &tenant, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(class).unwrap())))
}

pub async fn update_class(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateClassRequest>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    let class = ClassService::update(&state.db, &tenant, id, &body).await?;
    Ok(Json(serde_json::to_value(class).unwrap()))
}

pub async fn delete_class(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    ClassService::delete(&state.db, &tenant, id).await?;
    Ok(Json(json!({ "message": "Class deleted" })))
}
