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
        student::{CreateStudentRequest, UpdateStudentRequest},
    },
    services::students::StudentService,
    AppState,
};

#[derive(Deserialize)]
pub struct ListStudentsQuery {
    pub class_id: Option<Uuid>,
}

pub async fn list_students(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    _user: AuthenticatedUser,
    Query(params): Query<ListStudentsQuery>,
) -> Result<Json<Value>, ApiError> {
    let students = StudentService::list(&state.db, &tenant, params.class_id).await?;
    Ok(Json(serde_json::to_value(students).unwrap()))
}

pub async fn create_student(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Json(body): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_admin(&user)?;
    let student = StudentService::create(&state.db, &tenant, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(student).unwrap())))
}

pub async fn update_student(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStudentRequest>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    let student = StudentService::update(&state.db, &tenant, id, &body).await?;
    Ok(Json(serde_json::to_value(student).unwrap()))
}

pub async fn deactivate_student(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    StudentService::deactivate(&state.db, &tenant, id).await?;
    Ok(Json(json!({ "message": "Student deactivated" })))
}
