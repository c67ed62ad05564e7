use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::tenant::schema_name,
    error::ApiError,
    models::user::{CreateUserRequest, User, UserProfile},
};

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, \
                            role::TEXT AS role, is_active, created_at, updated_at";

pub struct UserService;

impl UserService {
    pub async fn list(pool: &PgPool, tenant: &str) -> Result<Vec<UserProfile>, ApiError> {
        let schema = schema_name(tenant);
        let users = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM "{schema}".users
               WHERE is_active = TRUE
               ORDER BY first_name, last_name"#
        ))
        .fetch_all(pool)
        .await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    pub async fn create(
        pool: &PgPool,
        tenant: &str,
        req: &CreateUserRequest,
    ) -> Result<UserProfile, ApiError> {
        if !req.email.contains('@') {
            return Err(ApiError::InvalidInput("Invalid email address".into()));
        }
        if req.password.len() < 8 {
            return Err(ApiError::InvalidInput(
                "Password must be at least 8 characters".into(),
            ));
        }
        if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("First and last name are required".into()));
        }

        let password_hash = bcrypt::hash(&req.password, 12).map_err(anyhow::Error::new)?;

        let schema = schema_name(tenant);
        let user = sqlx::query_as::<_, User>(&format!(
            r#"INSERT INTO "{schema}".users (email, password_hash, first_name, last_name, role)
               VALUES ($1, $2, $3, $4, $5::"{schema}".user_role)
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(&req.email)
        .bind(&password_hash)
        .bind(req.first_name.trim())
        .bind(req.last_name.trim())
        .bind(req.role.to_string())
        .fetch_one(pool)
        .await
        .map_err(|e| {
            ApiError::conflict_on_unique(e, "A user with this email already exists")
        })?;

        Ok(user.into())
    }

    /// Deactivation keeps the row — payments and attendance reference users
    /// as received_by/marked_by.
    pub async fn deactivate(pool: &PgPool, tenant: &str, id: Uuid) -> Result<(), ApiError> {
        let schema = schema_name(tenant);
        let result = sqlx::query(&format!(
            r#"UPDATE "{schema}".users SET is_active = FALSE WHERE id = $1"#
        ))
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("User not found".into()));
        }
        Ok(())
    }
}
