use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::tenant::schema_name,
    error::ApiError,
    models::class::{CreateClassRequest, SchoolClass, UpdateClassRequest},
};

pub struct ClassService;

impl ClassService {
    /// Definition order, so seeded classes list the way they were created.
    pub async fn list(pool: &PgPool, tenant: &str) -> Result<Vec<SchoolClass>, ApiError> {
        let schema = schema_name(tenant);
        let classes = sqlx::query_as::<_, SchoolClass>(&format!(
            r#"SELECT id, name, section, created_at, updated_at
               FROM "{schema}".classes ORDER BY created_at, id"#
        ))
        .fetch_all(pool)
        .await?;
        Ok(classes)
    }

    pub async fn create(
        pool: &PgPool,
        tenant: &str,
        req: &CreateClassRequest,
    ) -> Result<SchoolClass, ApiError> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("Class name is required".into()));
        }

        let schema = schema_name(tenant);
        let class = sqlx::query_as::<_, SchoolClass>(&format!(
            r#"INSERT INTO "{schema}".classes (name, section)
               VALUES ($1, $2)
               RETURNING id, name, section, created_at, updated_at"#
        ))
        .bind(name)
        .bind(req.section.as_deref())
        .fetch_one(pool)
        .await?;
        Ok(class)
    }

    pub async fn update(
        pool: &PgPool,
        tenant: &str,
        id: Uuid,
        req: &UpdateClassRequest,
    ) -> Result<SchoolClass, ApiError> {
        let schema = schema_name(tenant);
        sqlx::query_as::<_, SchoolClass>(&format!(
            r#"UPDATE "{schema}".classes
               SET name = COALESCE($1, name),
                   section = COALESCE($2, section)
               WHERE id = $3
               RETURNING id, name, section, created_at, updated_at"#
        ))
        .bind(req.name.as_deref())
        .bind(req.section.as_deref())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Class not found".into()))
    }

    /// A class with students or fee records keeps its history; deletion is
    /// refused while anything references it.
    pub async fn delete(pool: &PgPool, tenant: &str, id: Uuid) -> Result<(), ApiError> {
        let schema = schema_name(tenant);
        let result = sqlx::query(&format!(r#"DELETE FROM "{schema}".classes WHERE id = $1"#))
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                ApiError::conflict_on_fk(
                    e,
                    "Class has students or fee records and cannot be deleted",
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Class not found".into()));
        }
        Ok(())
    }
}
