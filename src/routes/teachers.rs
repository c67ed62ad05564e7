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
        teacher::{CreateTeacherRequest, UpdateTeacherRequest},
    },
    services::teachers::TeacherService,
    AppState,
};

pub async fn list_teachers(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    _user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError> {
    let teachers = TeacherService::list(&state.db, &tenant).await?;
    Ok(Json(serde_json::to_value(teachers).unwrap()))
}

pub async fn create_teacher(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Json(body): Json<CreateTeacherRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_admin(&user)?;
    let teacher = TeacherService::create(&state.db, &tenant, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(teacher).unwrap())))
}

pub async fn update_teacher(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTeacherRequest>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    let teacher = TeacherService::update(&state.db, &tenant, id, &body).await?;
    Ok(Json(serde_json::to_value(teacher).unwrap()))
}

pub async fn delete_teacher(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    TeacherService::delete(&state.db, &tenant, id).await?;
    Ok(Json(json!({ "message": "Teacher deleted" })))
}
