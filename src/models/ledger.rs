use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::fee::PaymentWithItems;

/// One due/paid/balance line of a student's monthly ledger.
#[derive(Debug, Clone, Serialize)]
pub struct FeeHeadLine {
    pub fee_head_id: Uuid,
    pub fee_head_name: String,
    pub due: Decimal,
    pub paid: Decimal,
    /// May be negative (overpayment) — reported, never rejected.
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    pub total_due: Decimal,
    /// Sum of the recorded `total_amount_paid` of each payment — the raw
    /// payment totals, not re-derived from per-head items.
    pub total_paid: Decimal,
    pub balance: Decimal,
}

/// Derived view — never stored.
#[derive(Debug, Serialize)]
pub struct StudentLedger {
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub month_year: String,
    pub lines: Vec<FeeHeadLine>,
    pub payments: Vec<PaymentWithItems>,
    pub summary: LedgerSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentFeeStatus {
    Paid,
    Partial,
    Unpaid,
    NotApplicable,
}

/// One row of the cross-student roll-up for a class/month.
#[derive(Debug, Clone, Serialize)]
pub struct ClassFeeSummaryRow {
    pub student_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub total_due: Decimal,
    pub total_paid: Decimal,
    pub balance: Decimal,
    pub status: StudentFeeStatus,
}
