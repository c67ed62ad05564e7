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
    models::{auth::AuthenticatedUser, user::CreateUserRequest},
    services::users::UserService,
    AppState,
};

pub async fn list_users(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    let users = UserService::list(&state.db, &tenant).await?;
    Ok(Json(serde_json::to_value(users).unwrap()))
}

pub async fn create_user(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_admin(&user)?;
    let created = UserService::create(&state.db, &tenant, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(created).unwrap())))
}

pub async fn deactivate_user(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    if id == user.user_id {
        return Err(ApiError::InvalidInput("You cannot deactivate yourself".into()));
    }
    UserService::deactivate(&state.db, &tenant, id).await?;
    Ok(Json(json!({ "message": "User deactivated" })))
}
