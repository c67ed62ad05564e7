use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exam {
    pub id: Uuid,
    pub name: String,
    pub term: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Grade {
    pub id: Uuid,
    pub student_id: Uuid,
    pub exam_id: Uuid,
    pub subject: String,
    pub obtained_marks: Decimal,
    pub total_marks: Decimal,
    pub graded_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateExamRequest {
    pub name: String,
    pub term: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GradeEntry {
    pub student_id: Uuid,
    pub subject: String,
    pub obtained_marks: Decimal,
    pub total_marks: Decimal,
}

/// One exam, many marks — each entry upserts by (student_id, exam_id, subject).
#[derive(Debug, Deserialize)]
pub struct BulkGradesRequest {
    pub exam_id: Uuid,
    pub entries: Vec<GradeEntry>,
}
