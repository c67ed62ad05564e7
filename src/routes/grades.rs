use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{auth::require_academic_staff, tenant::TenantSlug},
    models::{
        auth::AuthenticatedUser,
        grade::{BulkGradesRequest, CreateExamRequest},
    },
    services::grades::GradeService,
    AppState,
};

pub async fn list_exams(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    _user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError> {
    let exams = GradeService::list_exams(&state.db, &tenant).await?;
    Ok(Json(serde_json::to_value(exams).unwrap()))
}

pub async fn create_exam(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Json(body): Json<CreateExamRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_academic_staff(&user)?;
    let exam = GradeService::create_exam(&state.db, &tenant, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(exam).unwrap())))
}

/// POST /grades — one exam's marks in one request; re-submitting updates the
/// existing rows by (student, exam, subject).
pub async fn record_grades(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Json(body): Json<BulkGradesRequest>,
) -> Result<Json<Value>, ApiError> {
    require_academic_staff(&user)?;
    let outcome = GradeService::record_bulk(&state.db, &tenant, &body, user.user_id).await?;
    Ok(Json(serde_json::to_value(outcome).unwrap()))
}

#[derive(Deserialize)]
pub struct StudentGradesQuery {
    pub exam_id: Option<Uuid>,
}

pub async fn list_student_grades(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    _user: AuthenticatedUser,
    Path(student_id): Path<Uuid>,
    Query(params): Query<StudentGradesQuery>,
) -> Result<Json<Value>, ApiError> {
    let grades =
        GradeService::list_for_student(&state.db, &tenant, student_id, params.exam_id).await?;
    Ok(Json(serde_json::to_value(grades).unwrap()))
}
