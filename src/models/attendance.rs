use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Leave,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Leave => "leave",
        }
    }
}

/// DB row struct — status is fetched as TEXT (status::TEXT) to bypass the
/// schema-qualified enum OID mismatch in SQLx.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub date: NaiveDate,
    pub status: String,
    pub marked_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceEntry {
    pub student_id: Uuid,
    pub status: AttendanceStatus,
}

/// One date, many students — each entry upserts by (student_id, date).
#[derive(Debug, Deserialize)]
pub struct BulkAttendanceRequest {
    pub date: NaiveDate,
    pub entries: Vec<AttendanceEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceQuery {
    pub class_id: Uuid,
    pub date: NaiveDate,
}

/// Outcome of an idempotent bulk upsert: `upserted` rows were inserted,
/// `matched` rows already existed and were overwritten in place.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct BulkOutcome {
    pub matched: u64,
    pub upserted: u64,
}
