use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeeHead {
    pub id: Uuid,
    pub name: String,
    pub is_one_time: bool,
    pub created_at: DateTime<Utc>,
}

/// "In class C, for fee head H, in month M, the amount owed is A."
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeeStructure {
    pub id: Uuid,
    pub class_id: Uuid,
    pub fee_head_id: Uuid,
    pub month_year: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single payment event for one student, one month. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeePayment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub month_year: String,
    pub payment_date: NaiveDate,
    pub received_by: Uuid,
    pub total_amount_paid: Decimal,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeePaymentItem {
    pub id: Uuid,
    pub payment_id: Uuid,
    pub fee_head_id: Uuid,
    pub amount_paid: Decimal,
    pub position: i16,
}

#[derive(Debug, Serialize)]
pub struct PaymentWithItems {
    #[serde(flatten)]
    pub payment: FeePayment,
    pub items: Vec<FeePaymentItem>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFeeHeadRequest {
    pub name: String,
    pub is_one_time: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SetFeeStructureRequest {
    pub class_id: Uuid,
    pub fee_head_id: Uuid,
    pub month_year: String,
    pub amount: Decimal,
}

/// A lump sum to record against a student's outstanding dues for one month.
/// The per-head itemization is always computed server-side by the allocation
/// engine against the live ledger.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub student_id: Uuid,
    pub month_year: String,
    pub amount: Decimal,
    pub payment_date: Option<NaiveDate>,
    pub remarks: Option<String>,
}
