use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    db::tenant::provision_tenant_schema,
    error::ApiError,
    middleware::rate_limit::check_rate_limit,
    models::school::{InstitutionType, RegisterSchoolRequest, School},
    services::metrics::SIGNUPS_COUNTER,
    AppState,
};

const RESERVED_SLUGS: &[&str] = &[
    "www", "api", "demo", "admin", "app", "login", "signup", "register",
    "support", "billing", "status", "about", "contact", "docs",
];

/// Classes seeded for every new tenant of the "school" institution type.
const DEFAULT_SCHOOL_CLASSES: &[&str] = &[
    "Nursery", "LKG", "UKG", "Class 1", "Class 2", "Class 3", "Class 4",
    "Class 5", "Class 6", "Class 7", "Class 8", "Class 9", "Class 10",
];

const DEFAULT_FEE_HEAD: &str = "Tuition";

fn is_valid_signup_slug(s: &str) -> bool {
    let len = s.len();
    len >= 3
        && len <= 32
        && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !s.starts_with('-')
        && !s.ends_with('-')
}

/// Extracts the real client IP from proxy-forwarded headers.
/// Priority: X-Real-IP → first X-Forwarded-For.
fn real_ip(headers: &HeaderMap) -> String {
    if let Some(ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return ip.to_string();
    }
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = xff.split(',').next() {
            return first.trim().to_string();
        }
    }
    "unknown".to_string()
}

#[derive(Deserialize)]
pub struct CheckSlugQuery {
    pub slug: String,
}

pub async fn check_slug(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CheckSlugQuery>,
) -> Result<Json<Value>, ApiError> {
    // Backstop limit behind the proxy's own throttling
    {
        let ip = real_ip(&headers);
        let key = format!("rate:check-slug:ip:{ip}");
        let mut redis = state.redis.clone();
        check_rate_limit(&mut redis, &key, 30, 60).await?;
    }

    let slug = params.slug.to_lowercase();

    if !is_valid_signup_slug(&slug) {
        return Ok(Json(json!({
            "available": false,
            "reason": "Identifier must be 3-32 characters (lowercase letters, digits, hyphens)."
        })));
    }

    if RESERVED_SLUGS.contains(&slug.as_str()) {
        return Ok(Json(json!({ "available": false, "reason": "This identifier is reserved." })));
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM public.schools WHERE slug = $1)")
        .bind(&slug)
        .fetch_one(&state.db)
        .await
        .unwrap_or(true);

    if exists {
        Ok(Json(json!({ "available": false, "reason": "This identifier is already taken." })))
    } else {
        Ok(Json(json!({ "available": true })))
    }
}

/// POST /signup — registers a tenant: the school row, its schema, the owner
/// user, the owner back-fill, default classes and the default fee head all
/// commit in one transaction or not at all.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterSchoolRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let ip = real_ip(&headers);
    let mut redis = state.redis.clone();

    // Rate limit 1: 5 signups/hour per IP (prevents one source from abusing)
    check_rate_limit(&mut redis, &format!("rate:signup:ip:{ip}"), 5, 3600).await?;

    // Rate limit 2: 20 signups/hour globally (total cap across all IPs)
    check_rate_limit(&mut redis, "rate:signup:global", 20, 3600).await?;

    let slug = body.slug.to_lowercase();

    if !is_valid_signup_slug(&slug) {
        return Err(ApiError::InvalidInput(
            "Identifier must be 3-32 characters (lowercase letters, digits, hyphens), \
             without a leading or trailing hyphen."
                .into(),
        ));
    }
    if RESERVED_SLUGS.contains(&slug.as_str()) {
        return Err(ApiError::InvalidInput("This identifier is reserved.".into()));
    }
    if !body.email.contains('@') {
        return Err(ApiError::InvalidInput("Invalid email address.".into()));
    }
    if body.password.len() < 8 {
        return Err(ApiError::InvalidInput(
            "Password must be at least 8 characters.".into(),
        ));
    }
    if body.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("School name is required.".into()));
    }
    if body.first_name.trim().is_empty() || body.last_name.trim().is_empty() {
        return Err(ApiError::InvalidInput("First and last name are required.".into()));
    }

    let institution_type = body.institution_type.unwrap_or(InstitutionType::School);
    let password_hash =
        bcrypt::hash(&body.password, 12).map_err(anyhow::Error::new)?;

    let mut tx = state.db.begin().await?;

    // 1. School row — owner back-filled below, once the owner user exists.
    let school_id: Uuid = sqlx::query_scalar(
        "INSERT INTO public.schools (slug, name, institution_type, address, phone, email)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(&slug)
    .bind(body.name.trim())
    .bind(institution_type)
    .bind(body.address.as_deref().filter(|s| !s.trim().is_empty()))
    .bind(body.phone.as_deref().filter(|s| !s.trim().is_empty()))
    .bind(&body.email)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        let constraint = e
            .as_database_error()
            .and_then(|db| db.constraint())
            .map(str::to_owned);
        match constraint.as_deref() {
            Some("schools_slug_key") => {
                ApiError::Conflict("This identifier is already taken. Choose another.".into())
            }
            Some("schools_email_key") => {
                ApiError::Conflict("An account with this email already exists.".into())
            }
            _ => ApiError::Database(e),
        }
    })?;

    // 2. Tenant schema — DDL participates in the transaction.
    provision_tenant_schema(&mut *tx, &slug).await?;

    let schema = crate::db::tenant::schema_name(&slug);

    // 3. Owner user
    let owner_id: Uuid = sqlx::query_scalar(&format!(
        r#"INSERT INTO "{schema}".users (email, password_hash, first_name, last_name, role)
           VALUES ($1, $2, $3, $4, 'owner'::"{schema}".user_role)
           RETURNING id"#
    ))
    .bind(&body.email)
    .bind(&password_hash)
    .bind(body.first_name.trim())
    .bind(body.last_name.trim())
    .fetch_one(&mut *tx)
    .await?;

    // 4. Back-fill the owner reference
    sqlx::query("UPDATE public.schools SET owner_user_id = $1 WHERE id = $2")
        .bind(owner_id)
        .bind(school_id)
        .execute(&mut *tx)
        .await?;

    // 5. Default classes for school-type institutions
    if institution_type == InstitutionType::School {
        for name in DEFAULT_SCHOOL_CLASSES {
            sqlx::query(&format!(
                r#"INSERT INTO "{schema}".classes (name) VALUES ($1)"#
            ))
            .bind(name)
            .execute(&mut *tx)
            .await?;
        }
    }

    // 6. Default fee head
    sqlx::query(&format!(
        r#"INSERT INTO "{schema}".fee_heads (name, is_one_time) VALUES ($1, FALSE)"#
    ))
    .bind(DEFAULT_FEE_HEAD)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    SIGNUPS_COUNTER.inc();
    tracing::info!("Registered school '{slug}'");

    let school: School = sqlx::query_as(
        "SELECT id, slug, name, institution_type, address, phone, email, owner_user_id,
                is_active, created_at, updated_at
         FROM public.schools WHERE id = $1",
    )
    .bind(school_id)
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "school": school,
            "owner_user_id": owner_id,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_slugs() {
        for s in ["sunrise", "green-valley", "dps-204", "abc"] {
            assert!(is_valid_signup_slug(s), "{s} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_slugs() {
        for s in ["ab", "-sunrise", "sunrise-", "Sun Rise", "UPPER", "a_b", ""] {
            assert!(!is_valid_signup_slug(s), "{s} should be rejected");
        }
        let too_long = "a".repeat(33);
        assert!(!is_valid_signup_slug(&too_long));
    }
}


