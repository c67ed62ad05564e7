use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::tenant::schema_name,
    error::ApiError,
    models::student::{CreateStudentRequest, Student, UpdateStudentRequest},
};

const STUDENT_COLUMNS: &str = "id, first_name, last_name, class_id, admission_no, \
                               guardian_name, guardian_phone, is_active, created_at, updated_at";

pub struct StudentService;

impl StudentService {
    pub async fn list(
        pool: &PgPool,
        tenant: &str,
        class_id: Option<Uuid>,
    ) -> Result<Vec<Student>, ApiError> {
        let schema = schema_name(tenant);
        let students = sqlx::query_as::<_, Student>(&format!(
            r#"SELECT {STUDENT_COLUMNS} FROM "{schema}".students
               WHERE is_active = TRUE AND ($1::UUID IS NULL OR class_id = $1)
               ORDER BY first_name, last_name"#
        ))
        .bind(class_id)
        .fetch_all(pool)
        .await?;
        Ok(students)
    }

    pub async fn create(
        pool: &PgPool,
        tenant: &str,
        req: &CreateStudentRequest,
    ) -> Result<Student, ApiError> {
        if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("Student name is required".into()));
        }

        let schema = schema_name(tenant);
        sqlx::query_as::<_, Student>(&format!(
            r#"INSERT INTO "{schema}".students
                   (first_name, last_name, class_id, admission_no, guardian_name, guardian_phone)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {STUDENT_COLUMNS}"#
        ))
        .bind(req.first_name.trim())
        .bind(req.last_name.trim())
        .bind(req.class_id)
        .bind(req.admission_no.as_deref())
        .bind(req.guardian_name.as_deref())
        .bind(req.guardian_phone.as_deref())
        .fetch_one(pool)
        .await
        .map_err(|e| {
            let code = e
                .as_database_error()
                .and_then(|db| db.code())
                .map(|c| c.into_owned());
            match code.as_deref() {
                Some("23503") => ApiError::NotFound("Class not found".into()),
                Some("23505") => ApiError::Conflict(
                    "A student with this admission number already exists".into(),
                ),
                _ => ApiError::Database(e),
            }
        })
    }

    pub async fn update(
        pool: &PgPool,
        tenant: &str,
        id: Uuid,
        req: &UpdateStudentRequest,
    ) -> Result<Student, ApiError> {
        let schema = schema_name(tenant);
        sqlx::query_as::<_, Student>(&format!(
            r#"UPDATE "{schema}".students
               SET first_name = COALESCE($1, first_name),
                   last_name = COALESCE($2, last_name),
                   class_id = COALESCE($3, class_id),
                   admission_no = COALESCE($4, admission_no),
                   guardian_name = COALESCE($5, guardian_name),
                   guardian_phone = COALESCE($6, guardian_phone),
                   is_active = COALESCE($7, is_active)
               WHERE id = $8
               RETURNING {STUDENT_COLUMNS}"#
        ))
        .bind(req.first_name.as_deref())
        .bind(req.last_name.as_deref())
        .bind(req.class_id)
        .bind(req.admission_no.as_deref())
        .bind(req.guardian_name.as_deref())
        .bind(req.guardian_phone.as_deref())
        .bind(req.is_active)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| ApiError::not_found_on_fk(e, "Class not found"))?
        .ok_or_else(|| ApiError::NotFound("Student not found".into()))
    }

    /// Soft delete — fee and attendance history stays intact.
    pub async fn deactivate(pool: &PgPool, tenant: &str, id: Uuid) -> Result<(), ApiError> {
        let schema = schema_name(tenant);
        let result = sqlx::query(&format!(
            r#"UPDATE "{schema}".students SET is_active = FALSE WHERE id = $1"#
        ))
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Student not found".into()));
        }
        Ok(())
    }
}
