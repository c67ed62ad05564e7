use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::tenant::schema_name,
    error::ApiError,
    models::teacher::{CreateTeacherRequest, Teacher, UpdateTeacherRequest},
};

const TEACHER_COLUMNS: &str = "id, first_name, last_name, email, phone, subject, \
                               created_at, updated_at";

pub struct TeacherService;

impl TeacherService {
    pub async fn list(pool: &PgPool, tenant: &str) -> Result<Vec<Teacher>, ApiError> {
        let schema = schema_name(tenant);
        let teachers = sqlx::query_as::<_, Teacher>(&format!(
            r#"SELECT {TEACHER_COLUMNS} FROM "{schema}".teachers
               ORDER BY first_name, last_name"#
        ))
        .fetch_all(pool)
        .await?;
        Ok(teachers)
    }

    pub async fn create(
        pool: &PgPool,
        tenant: &str,
        req: &CreateTeacherRequest,
    ) -> Result<Teacher, ApiError> {
        if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("Teacher name is required".into()));
        }

        let schema = schema_name(tenant);
        let teacher = sqlx::query_as::<_, Teacher>(&format!(
            r#"INSERT INTO "{schema}".teachers (first_name, last_name, email, phone, subject)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {TEACHER_COLUMNS}"#
        ))
        .bind(req.first_name.trim())
        .bind(req.last_name.trim())
        .bind(req.email.as_deref())
        .bind(req.phone.as_deref())
        .bind(req.subject.as_deref())
        .fetch_one(pool)
        .await?;
        Ok(teacher)
    }

    pub async fn update(
        pool: &PgPool,
        tenant: &str,
        id: Uuid,
        req: &UpdateTeacherRequest,
    ) -> Result<Teacher, ApiError> {
        let schema = schema_name(tenant);
        sqlx::query_as::<_, Teacher>(&format!(
            r#"UPDATE "{schema}".teachers
               SET first_name = COALESCE($1, first_name),
                   last_name = COALESCE($2, last_name),
                   email = COALESCE($3, email),
                   phone = COALESCE($4, phone),
                   subject = COALESCE($5, subject)
               WHERE id = $6
               RETURNING {TEACHER_COLUMNS}"#
        ))
        .bind(req.first_name.as_deref())
        .bind(req.last_name.as_deref())
        .bind(req.email.as_deref())
        .bind(req.phone.as_deref())
        .bind(req.subject.as_deref())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Teacher not found".into()))
    }

    pub async fn delete(pool: &PgPool, tenant: &str, id: Uuid) -> Result<(), ApiError> {
        let schema = schema_name(tenant);
        let result = sqlx::query(&format!(r#"DELETE FROM "{schema}".teachers WHERE id = $1"#))
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Teacher not found".into()));
        }
        Ok(())
    }
}
