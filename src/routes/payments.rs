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
    middleware::{auth::require_fee_collector, tenant::TenantSlug},
    models::{auth::AuthenticatedUser, fee::RecordPaymentRequest},
    services::{metrics::PAYMENTS_COUNTER, payments::PaymentService},
    AppState,
};

pub async fn record_payment(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    user: AuthenticatedUser,
    Json(body): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_fee_collector(&user)?;

    let payment = PaymentService::record(&state.db, &tenant, &body, user.user_id).await?;
    PAYMENTS_COUNTER.with_label_values(&[&tenant]).inc();

    Ok((StatusCode::CREATED, Json(serde_json::to_value(payment).unwrap())))
}

#[derive(Deserialize)]
pub struct ListPaymentsQuery {
    pub month_year: Option<String>,
}

pub async fn list_student_payments(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    _user: AuthenticatedUser,
    Path(student_id): Path<Uuid>,
    Query(params): Query<ListPaymentsQuery>,
) -> Result<Json<Value>, ApiError> {
    let payments = PaymentService::list_for_student(
        &state.db,
        &tenant,
        student_id,
        params.month_year.as_deref(),
    )
    .await?;
    Ok(Json(serde_json::to_value(payments).unwrap()))
}
