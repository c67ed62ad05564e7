use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    middleware::{rate_limit::check_rate_limit, tenant::TenantSlug},
    models::auth::{AuthenticatedUser, LoginRequest},
    services::{auth::AuthService, metrics::LOGINS_COUNTER},
    AppState,
};

pub async fn login(
    State(state): State<AppState>,
    TenantSlug(tenant): TenantSlug,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    // Throttle per email within the tenant
    {
        let key = format!("rate:login:{tenant}:{}", body.email.to_lowercase());
        let mut redis = state.redis.clone();
        check_rate_limit(&mut redis, &key, 10, 300).await?;
    }

    let result = AuthService::login(
        &state.db,
        &tenant,
        &body.email,
        &body.password,
        &state.config.jwt_secret,
        state.config.jwt_expiry_seconds,
    )
    .await;

    let status = if result.is_ok() { "success" } else { "failure" };
    LOGINS_COUNTER.with_label_values(&[&tenant, status]).inc();

    result.map(|r| Json(serde_json::to_value(r).unwrap()))
}

pub async fn me(user: AuthenticatedUser) -> Json<Value> {
    Json(json!({
        "user_id": user.user_id,
        "tenant": user.tenant,
        "role": user.role,
    }))
}
