use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::tenant::schema_name,
    error::ApiError,
    models::attendance::{AttendanceRecord, BulkAttendanceRequest, BulkOutcome},
};

pub struct AttendanceService;

impl AttendanceService {
    /// Records a day's attendance for many students at once. Each entry
    /// upserts by its natural key (student_id, date), so re-submitting the
    /// same sheet converges instead of duplicating.
    ///
    /// The whole batch is validated before any row is written; after that,
    /// rows apply independently with no cross-record transaction — each
    /// upsert is idempotent on its own, so a retry after a mid-batch failure
    /// is safe.
    pub async fn record_bulk(
        pool: &PgPool,
        tenant: &str,
        req: &BulkAttendanceRequest,
        marked_by: Uuid,
    ) -> Result<BulkOutcome, ApiError> {
        if req.entries.is_empty() {
            return Err(ApiError::InvalidInput("Attendance batch is empty".into()));
        }

        let schema = schema_name(tenant);
        let student_ids: Vec<Uuid> = req.entries.iter().map(|e| e.student_id).collect();
        Self::ensure_students_exist(pool, &schema, &student_ids).await?;

        let mut outcome = BulkOutcome::default();
        for entry in &req.entries {
            let inserted: bool = sqlx::query_scalar(&format!(
                r#"INSERT INTO "{schema}".attendance (student_id, date, status, marked_by)
                   VALUES ($1, $2, $3::"{schema}".attendance_status, $4)
                   ON CONFLICT (student_id, date) DO UPDATE SET
                       status    = EXCLUDED.status,
                       marked_by = EXCLUDED.marked_by
                   RETURNING (xmax = 0)"#
            ))
            .bind(entry.student_id)
            .bind(req.date)
            .bind(entry.status.as_str())
            .bind(marked_by)
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

    pub async fn list_for_class(
        pool: &PgPool,
        tenant: &str,
        class_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, ApiError> {
        let schema = schema_name(tenant);
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            r#"SELECT a.id, a.student_id, a.date,
                      a.status::TEXT AS status,
                      a.marked_by, a.created_at, a.updated_at
               FROM "{schema}".attendance a
               JOIN "{schema}".students s ON s.id = a.student_id
               WHERE s.class_id = $1 AND a.date = $2
               ORDER BY s.first_name, s.last_name"#
        ))
        .bind(class_id)
        .bind(date)
        .fetch_all(pool)
        .await?;
        Ok(records)
    }

    pub(crate) async fn ensure_students_exist(
        pool: &PgPool,
        schema: &str,
        student_ids: &[Uuid],
    ) -> Result<(), ApiError> {
        let known: i64 = sqlx::query_scalar(&format!(
            r#"SELECT COUNT(DISTINCT id) FROM "{schema}".students WHERE id = ANY($1)"#
        ))
        .bind(student_ids)
        .fetch_one(pool)
        .await?;

        let distinct = {
            let mut ids = student_ids.to_vec();
            ids.sort_unstable();
            ids.dedup();
            ids.len() as i64
        };

        if known < distinct {
            return Err(ApiError::NotFound(
                "One or more students in the batch do not exist".into(),
            ));
        }
        Ok(())
    }
}
