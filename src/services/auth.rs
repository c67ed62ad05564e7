use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;

use crate::{
    db::tenant::schema_name,
    error::ApiError,
    models::{
        auth::{Claims, LoginResponse},
        user::{User, UserRole},
    },
};

pub struct AuthService;

impl AuthService {
    /// Validates credentials against the tenant's users table and issues an
    /// HS256 access token carrying the tenant slug and role.
    pub async fn login(
        pool: &PgPool,
        tenant: &str,
        email: &str,
        password: &str,
        jwt_secret: &str,
        access_ttl_secs: u64,
    ) -> Result<LoginResponse, ApiError> {
        let schema = schema_name(tenant);

        // Check the tenant schema actually exists before querying it.
        let schema_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM pg_namespace WHERE nspname = $1)",
        )
        .bind(&schema)
        .fetch_one(pool)
        .await?;
        if !schema_exists {
            return Err(ApiError::NotFound("School not found".into()));
        }

        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT id, email, password_hash, first_name, last_name,
                      role::TEXT AS role, is_active, created_at, updated_at
               FROM "{schema}".users
               WHERE email = $1 AND is_active = TRUE"#
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".into()))?;

        let valid = bcrypt::verify(password, &user.password_hash)
            .map_err(|_| ApiError::Unauthorized("Invalid credentials".into()))?;
        if !valid {
            return Err(ApiError::Unauthorized("Invalid credentials".into()));
        }

        let role: UserRole = user.role.parse().unwrap_or(UserRole::Teacher);
        let access_token = Self::generate_access_token(
            &user.id.to_string(),
            tenant,
            role,
            jwt_secret,
            access_ttl_secs,
        )?;

        let school_name: String = sqlx::query_scalar(
            "SELECT name FROM public.schools WHERE slug = $1",
        )
        .bind(tenant)
        .fetch_optional(pool)
        .await?
        .unwrap_or_default();

        Ok(LoginResponse {
            access_token,
            user: user.into(),
            school_name,
        })
    }

    pub fn generate_access_token(
        user_id: &str,
        tenant: &str,
        role: UserRole,
        secret: &str,
        ttl_secs: u64,
    ) -> Result<String, ApiError> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            tenant: tenant.to_string(),
            role,
            iat: now,
            exp: now + ttl_secs as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))
    }
}
