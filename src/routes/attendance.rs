use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;

use crate::{
    error::ApiError,
    middleware::{auth::require_academic_staff, tenant::TenantSlug},
    models::{
        attendance::{AttendanceQuery, BulkAttendanceRequest},
        auth::AuthenticatedUser,
    },
    services::attendance::AttendanceService,
    AppState,
};

/// POST /attendance — a full day's sheet in one request; re-submitting the
/// same sheet converges on the same rows.
pub async fn record_attendance(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Json(body): Json<BulkAttendanceRequest>,
) -> Result<Json<Value>, ApiError> {
    require_academic_staff(&user)?;
    let outcome =
        AttendanceService::record_bulk(&state.db, &tenant, &body, user.user_id).await?;
    Ok(Json(serde_json::to_value(outcome).unwrap()))
}

pub async fn list_attendance(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    _user: AuthenticatedUser,
    Query(params): Query<AttendanceQuery>,
) -> Result<Json<Value>, ApiError> {
    let records =
        AttendanceService::list_for_class(&state.db, &tenant, params.class_id, params.date)
            .await?;
    Ok(Json(serde_json::to_value(records).unwrap()))
}
