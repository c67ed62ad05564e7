use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::tenant::schema_name,
    error::ApiError,
    models::fee::{FeePayment, FeePaymentItem, PaymentWithItems, RecordPaymentRequest},
    services::{
        allocation::{allocate, DueLine},
        fees::validate_month_year,
        ledger::LedgerService,
    },
};

pub struct PaymentService;

impl PaymentService {
    /// Records a lump payment against a student's outstanding dues for one
    /// month. The allocation engine splits the amount across the live due
    /// lines inside the insert transaction; a lump sum exceeding the total
    /// outstanding balance is rejected.
    ///
    /// Two concurrent payments may both allocate against the same balance
    /// snapshot and both commit — the resulting overpayment is a valid
    /// terminal state and shows up as a negative balance in the ledger view.
    pub async fn record(
        pool: &PgPool,
        tenant: &str,
        req: &RecordPaymentRequest,
        received_by: Uuid,
    ) -> Result<PaymentWithItems, ApiError> {
        validate_month_year(&req.month_year)?;
        if req.amount < Decimal::ONE {
            return Err(ApiError::InvalidInput(format!(
                "Payment amount must be at least 1 (got {})",
                req.amount
            )));
        }

        let schema = schema_name(tenant);
        let mut tx = pool.begin().await?;

        let class_id =
            LedgerService::resolve_student_class(&mut *tx, &schema, req.student_id).await?;
        let lines =
            LedgerService::head_lines(&mut *tx, &schema, class_id, req.student_id, &req.month_year)
                .await?;
        let dues: Vec<DueLine> = lines
            .iter()
            .map(|l| DueLine { fee_head_id: l.fee_head_id, balance: l.balance })
            .collect();

        let (items, remainder) = allocate(req.amount, &dues);
        if remainder > Decimal::ZERO {
            let outstanding = req.amount - remainder;
            return Err(ApiError::InvalidInput(format!(
                "Payment of {} exceeds the outstanding balance of {} for {}",
                req.amount, outstanding, req.month_year
            )));
        }

        let payment_date = req.payment_date.unwrap_or_else(|| Utc::now().date_naive());
        let remarks = req.remarks.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let payment: FeePayment = sqlx::query_as(&format!(
            r#"INSERT INTO "{schema}".fee_payments
                   (student_id, class_id, month_year, payment_date, received_by,
                    total_amount_paid, remarks)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, student_id, class_id, month_year, payment_date, received_by,
                         total_amount_paid, remarks, created_at"#
        ))
        .bind(req.student_id)
        .bind(class_id)
        .bind(&req.month_year)
        .bind(payment_date)
        .bind(received_by)
        .bind(req.amount)
        .bind(remarks)
        .fetch_one(&mut *tx)
        .await?;

        let mut saved_items = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let row: FeePaymentItem = sqlx::query_as(&format!(
                r#"INSERT INTO "{schema}".fee_payment_items
                       (payment_id, fee_head_id, amount_paid, position)
                   VALUES ($1, $2, $3, $4)
                   RETURNING id, payment_id, fee_head_id, amount_paid, position"#
            ))
            .bind(payment.id)
            .bind(item.fee_head_id)
            .bind(item.amount_paid)
            .bind(position as i16)
            .fetch_one(&mut *tx)
            .await?;
            saved_items.push(row);
        }

        tx.commit().await?;

        tracing::info!(
            "Recorded fee payment of {} for student {} ({}) across {} head(s)",
            payment.total_amount_paid,
            payment.student_id,
            payment.month_year,
            saved_items.len()
        );

        Ok(PaymentWithItems { payment, items: saved_items })
    }

    /// Append-only payment history for a student, optionally narrowed to one
    /// month.
    pub async fn list_for_student(
        pool: &PgPool,
        tenant: &str,
        student_id: Uuid,
        month_year: Option<&str>,
    ) -> Result<Vec<PaymentWithItems>, ApiError> {
        if let Some(month) = month_year {
            validate_month_year(month)?;
        }
        let schema = schema_name(tenant);
        let mut conn = pool.acquire().await?;

        // Listing an unknown student is NotFound, not an empty history.
        LedgerService::resolve_student_class(&mut conn, &schema, student_id).await?;
        LedgerService::payments_with_items(&mut conn, &schema, student_id, month_year).await
    }
}
