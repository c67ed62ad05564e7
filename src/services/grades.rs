use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::tenant::schema_name,
    error::ApiError,
    models::{
        attendance::BulkOutcome,
        grade::{BulkGradesRequest, CreateExamRequest, Exam, Grade, GradeEntry},
    },
    services::attendance::AttendanceService,
};

/// Rejects a grade batch before anything is written: blank subjects,
/// non-positive totals, or marks outside 0..=total fail the whole batch.
pub fn validate_grade_entries(entries: &[GradeEntry]) -> Result<(), ApiError> {
    if entries.is_empty() {
        return Err(ApiError::InvalidInput("Grades batch is empty".into()));
    }
    for entry in entries {
        if entry.subject.trim().is_empty() {
            return Err(ApiError::InvalidInput("Subject is required for every grade".into()));
        }
        if entry.total_marks <= Decimal::ZERO {
            return Err(ApiError::InvalidInput(format!(
                "Total marks must be positive (subject '{}')",
                entry.subject.trim()
            )));
        }
        if entry.obtained_marks < Decimal::ZERO || entry.obtained_marks > entry.total_marks {
            return Err(ApiError::InvalidInput(format!(
                "Obtained marks must be between 0 and {} (subject '{}')",
                entry.total_marks,
                entry.subject.trim()
            )));
        }
    }
    Ok(())
}

pub struct GradeService;

impl GradeService {
    pub async fn create_exam(
        pool: &PgPool,
        tenant: &str,
        req: &CreateExamRequest,
    ) -> Result<Exam, ApiError> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("Exam name is required".into()));
        }

        let schema = schema_name(tenant);
        sqlx::query_as::<_, Exam>(&format!(
            r#"INSERT INTO "{schema}".exams (name, term)
               VALUES ($1, $2)
               RETURNING id, name, term, created_at"#
        ))
        .bind(name)
        .bind(req.term.as_deref())
        .fetch_one(pool)
        .await
        .map_err(|e| {
            ApiError::conflict_on_unique(e, &format!("An exam named '{name}' already exists"))
        })
    }

    pub async fn list_exams(pool: &PgPool, tenant: &str) -> Result<Vec<Exam>, ApiError> {
        let schema = schema_name(tenant);
        let exams = sqlx::query_as::<_, Exam>(&format!(
            r#"SELECT id, name, term, created_at FROM "{schema}".exams ORDER BY created_at, id"#
        ))
        .fetch_all(pool)
        .await?;
        Ok(exams)
    }

    /// Records one exam's marks for many students at once. Each entry upserts
    /// by its natural key (student_id, exam_id, subject) — same discipline as
    /// attendance: validate the whole batch first, then apply rows
    /// independently with storage-level last-write-wins.
    pub async fn record_bulk(
        pool: &PgPool,
        tenant: &str,
        req: &BulkGradesRequest,
        graded_by: Uuid,
    ) -> Result<BulkOutcome, ApiError> {
        validate_grade_entries(&req.entries)?;

        let schema = schema_name(tenant);
        let exam_exists: bool = sqlx::query_scalar(&format!(
            r#"SELECT EXISTS(SELECT 1 FROM "{schema}".exams WHERE id = $1)"#
        ))
        .bind(req.exam_id)
        .fetch_one(pool)
        .await?;
        if !exam_exists {
            return Err(ApiError::NotFound("Exam not found".into()));
        }

        let student_ids: Vec<Uuid> = req.entries.iter().map(|e| e.student_id).collect();
        AttendanceService::ensure_students_exist(pool, &schema, &student_ids).await?;

        let mut outcome = BulkOutcome::default();
        for entry in &req.entries {
            let inserted: bool = sqlx::query_scalar(&format!(
                r#"INSERT INTO "{schema}".grades
                       (student_id, exam_id, subject, obtained_marks, total_marks, graded_by)
                   VALUES ($1, $2, $3, $4, $5, $6)
                   ON CONFLICT (student_id, exam_id, subject) DO UPDATE SET
                       obtained_marks = EXCLUDED.obtained_marks,
                       total_marks    = EXCLUDED.total_marks,
                       graded_by      = EXCLUDED.graded_by
                   RETURNING (xmax = 0)"#
            ))
            .bind(entry.student_id)
            .bind(req.exam_id)
            .bind(entry.subject.trim())
            .bind(entry.obtained_marks)
            .bind(entry.total_marks)
            .bind(graded_by)
            .fetch_one(pool)
            .await?;

            if inserted {
                outcome.upserted += 1;
            } else {
                outcome.matched += 1;
            }
        }

        Ok(outcome)
    }

    pub async fn list_for_student(
        pool: &PgPool,
        tenant: &str,
        student_id: Uuid,
        exam_id: Option<Uuid>,
    ) -> Result<Vec<Grade>, ApiError> {
        let schema = schema_name(tenant);
        let grades = sqlx::query_as::<_, Grade>(&format!(
            r#"SELECT id, student_id, exam_id, subject, obtained_marks, total_marks,
                      graded_by, created_at, updated_at
               FROM "{schema}".grades
               WHERE student_id = $1 AND ($2::UUID IS NULL OR exam_id = $2)
               ORDER BY subject"#
        ))
        .bind(student_id)
        .bind(exam_id)
        .fetch_all(pool)
        .await?;
        Ok(grades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(subject: &str, obtained: Decimal, total: Decimal) -> GradeEntry {
        GradeEntry {
            student_id: Uuid::new_v4(),
            subject: subject.to_string(),
            obtained_marks: obtained,
            total_marks: total,
        }
    }

    #[test]
    fn accepts_a_well_formed_batch() {
        let entries = vec![
            entry("Mathematics", dec!(72.5), dec!(100)),
            entry("English", dec!(0), dec!(100)),
            entry("Science", dec!(100), dec!(100)),
        ];
        assert!(validate_grade_entries(&entries).is_ok());
    }

    #[test]
    fn rejects_empty_batches() {
        assert!(validate_grade_entries(&[]).is_err());
    }

    #[test]
    fn one_bad_record_rejects_the_whole_batch() {
        let entries = vec![
            entry("Mathematics", dec!(72.5), dec!(100)),
            entry("English", dec!(105), dec!(100)),
        ];
        assert!(validate_grade_entries(&entries).is_err());
    }

    #[test]
    fn rejects_blank_subject_and_bad_totals() {
        assert!(validate_grade_entries(&[entry("  ", dec!(10), dec!(100))]).is_err());
        assert!(validate_grade_entries(&[entry("History", dec!(0), dec!(0))]).is_err());
        assert!(validate_grade_entries(&[entry("History", dec!(-1), dec!(100))]).is_err());
    }
}
