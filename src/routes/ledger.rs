use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::tenant::TenantSlug,
    models::auth::AuthenticatedUser,
    services::ledger::LedgerService,
    AppState,
};

#[derive(Deserialize)]
pub struct LedgerQuery {
    pub month_year: String,
}

/// GET /students/{id}/ledger?month_year=YYYY-MM — the derived
/// due/paid/balance view for one student and month.
pub async fn student_ledger(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    _user: AuthenticatedUser,
    Path(student_id): Path<Uuid>,
    Query(params): Query<LedgerQuery>,
) -> Result<Json<Value>, ApiError> {
    let ledger =
        LedgerService::student_ledger(&state.db, &tenant, student_id, &params.month_year).await?;
    Ok(Json(serde_json::to_value(ledger).unwrap()))
}

/// GET /classes/{id}/fee-summary?month_year=YYYY-MM — per-student roll-up
/// with paid/partial/unpaid standing.
pub async fn class_fee_summary(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    _user: AuthenticatedUser,
    Path(class_id): Path<Uuid>,
    Query(params): Query<LedgerQuery>,
) -> Result<Json<Value>, ApiError> {
    let summary =
        LedgerService::class_fee_summary(&state.db, &tenant, class_id, &params.month_year).await?;
    Ok(Json(serde_json::to_value(summary).unwrap()))
}
