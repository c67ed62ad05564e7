use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    db::tenant::schema_name,
    error::ApiError,
    models::{
        fee::{FeePayment, FeePaymentItem, PaymentWithItems},
        ledger::{ClassFeeSummaryRow, FeeHeadLine, LedgerSummary, StudentFeeStatus, StudentLedger},
    },
    services::fees::validate_month_year,
};

/// Classifies a student's standing for a month from the aggregate due/paid
/// pair. Overpayment counts as paid; a month with nothing due is
/// not-applicable regardless of payments.
pub fn classify_status(total_due: Decimal, total_paid: Decimal) -> StudentFeeStatus {
    if total_due <= Decimal::ZERO {
        StudentFeeStatus::NotApplicable
    } else if total_due - total_paid <= Decimal::ZERO {
        StudentFeeStatus::Paid
    } else if total_paid > Decimal::ZERO {
        StudentFeeStatus::Partial
    } else {
        StudentFeeStatus::Unpaid
    }
}

pub struct LedgerService;

impl LedgerService {
    /// Joins the fee catalog against summed payment items to produce the
    /// due/paid/balance line per fee head, in catalog definition order.
    /// A month with no structures yields an empty list, not an error.
    ///
    /// Takes a plain connection so payment recording can reuse it inside its
    /// transaction for a live balance snapshot.
    pub(crate) async fn head_lines(
        conn: &mut PgConnection,
        schema: &str,
        class_id: Uuid,
        student_id: Uuid,
        month_year: &str,
    ) -> Result<Vec<FeeHeadLine>, ApiError> {
        let dues: Vec<(Uuid, String, Decimal)> = sqlx::query_as(&format!(
            r#"SELECT fs.fee_head_id, fh.name, fs.amount
               FROM "{schema}".fee_structures fs
               JOIN "{schema}".fee_heads fh ON fh.id = fs.fee_head_id
               WHERE fs.class_id = $1 AND fs.month_year = $2
               ORDER BY fs.created_at, fs.id"#
        ))
        .bind(class_id)
        .bind(month_year)
        .fetch_all(&mut *conn)
        .await?;

        let paid: Vec<(Uuid, Decimal)> = sqlx::query_as(&format!(
            r#"SELECT i.fee_head_id, SUM(i.amount_paid)
               FROM "{schema}".fee_payment_items i
               JOIN "{schema}".fee_payments p ON p.id = i.payment_id
               WHERE p.student_id = $1 AND p.month_year = $2
               GROUP BY i.fee_head_id"#
        ))
        .bind(student_id)
        .bind(month_year)
        .fetch_all(&mut *conn)
        .await?;

        let paid_map: HashMap<Uuid, Decimal> = paid.into_iter().collect();

        Ok(dues
            .into_iter()
            .map(|(fee_head_id, fee_head_name, due)| {
                let paid = paid_map.get(&fee_head_id).copied().unwrap_or(Decimal::ZERO);
                FeeHeadLine {
                    fee_head_id,
                    fee_head_name,
                    due,
                    paid,
                    balance: due - paid,
                }
            })
            .collect())
    }

    pub(crate) async fn resolve_student_class(
        conn: &mut PgConnection,
        schema: &str,
        student_id: Uuid,
    ) -> Result<Uuid, ApiError> {
        sqlx::query_scalar(&format!(
            r#"SELECT class_id FROM "{schema}".students WHERE id = $1"#
        ))
        .bind(student_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student not found".into()))
    }

    pub(crate) async fn payments_with_items(
        conn: &mut PgConnection,
        schema: &str,
        student_id: Uuid,
        month_year: Option<&str>,
    ) -> Result<Vec<PaymentWithItems>, ApiError> {
        let payments: Vec<FeePayment> = sqlx::query_as(&format!(
            r#"SELECT id, student_id, class_id, month_year, payment_date, received_by,
                      total_amount_paid, remarks, created_at
               FROM "{schema}".fee_payments
               WHERE student_id = $1 AND ($2::VARCHAR IS NULL OR month_year = $2)
               ORDER BY payment_date, created_at"#
        ))
        .bind(student_id)
        .bind(month_year)
        .fetch_all(&mut *conn)
        .await?;

        if payments.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = payments.iter().map(|p| p.id).collect();
        let items: Vec<FeePaymentItem> = sqlx::query_as(&format!(
            r#"SELECT id, payment_id, fee_head_id, amount_paid, position
               FROM "{schema}".fee_payment_items
               WHERE payment_id = ANY($1)
               ORDER BY position"#
        ))
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

        let mut by_payment: HashMap<Uuid, Vec<FeePaymentItem>> = HashMap::new();
        for item in items {
            by_payment.entry(item.payment_id).or_default().push(item);
        }

        Ok(payments
            .into_iter()
            .map(|payment| {
                let items = by_payment.remove(&payment.id).unwrap_or_default();
                PaymentWithItems { payment, items }
            })
            .collect())
    }

    /// The derived due/paid/balance view for one student and month.
    ///
    /// `summary.total_paid` sums the recorded `total_amount_paid` of each
    /// payment while the per-head lines sum the itemized allocations; the two
    /// diverge only if payment history references heads that no longer carry
    /// a structure for this month.
    pub async fn student_ledger(
        pool: &PgPool,
        tenant: &str,
        student_id: Uuid,
        month_year: &str,
    ) -> Result<StudentLedger, ApiError> {
        validate_month_year(month_year)?;
        let schema = schema_name(tenant);
        let mut conn = pool.acquire().await?;

        let class_id = Self::resolve_student_class(&mut conn, &schema, student_id).await?;
        let lines = Self::head_lines(&mut conn, &schema, class_id, student_id, month_year).await?;
        let payments =
            Self::payments_with_items(&mut conn, &schema, student_id, Some(month_year)).await?;

        let total_due: Decimal = lines.iter().map(|l| l.due).sum();
        let total_paid: Decimal = sqlx::query_scalar(&format!(
            r#"SELECT COALESCE(SUM(total_amount_paid), 0)
               FROM "{schema}".fee_payments
               WHERE student_id = $1 AND month_year = $2"#
        ))
        .bind(student_id)
        .bind(month_year)
        .fetch_one(&mut *conn)
        .await?;

        Ok(StudentLedger {
            student_id,
            class_id,
            month_year: month_year.to_string(),
            lines,
            payments,
            summary: LedgerSummary {
                total_due,
                total_paid,
                balance: total_due - total_paid,
            },
        })
    }

    /// Cross-student roll-up for a class/month: every active student with the
    /// class's total due, their recorded payment total, and a standing.
    pub async fn class_fee_summary(
        pool: &PgPool,
        tenant: &str,
        class_id: Uuid,
        month_year: &str,
    ) -> Result<Vec<ClassFeeSummaryRow>, ApiError> {
        validate_month_year(month_year)?;
        let schema = schema_name(tenant);

        let class_exists: bool = sqlx::query_scalar(&format!(
            r#"SELECT EXISTS(SELECT 1 FROM "{schema}".classes WHERE id = $1)"#
        ))
        .bind(class_id)
        .fetch_one(pool)
        .await?;
        if !class_exists {
            return Err(ApiError::NotFound("Class not found".into()));
        }

        let total_due: Decimal = sqlx::query_scalar(&format!(
            r#"SELECT COALESCE(SUM(amount), 0)
               FROM "{schema}".fee_structures
               WHERE class_id = $1 AND month_year = $2"#
        ))
        .bind(class_id)
        .bind(month_year)
        .fetch_one(pool)
        .await?;

        let rows: Vec<(Uuid, String, String, Decimal)> = sqlx::query_as(&format!(
            r#"SELECT s.id, s.first_name, s.last_name, COALESCE(p.paid, 0)
               FROM "{schema}".students s
               LEFT JOIN (
                   SELECT student_id, SUM(total_amount_paid) AS paid
                   FROM "{schema}".fee_payments
                   WHERE month_year = $2
                   GROUP BY student_id
               ) p ON p.student_id = s.id
               WHERE s.class_id = $1 AND s.is_active = TRUE
               ORDER BY s.first_name, s.last_name"#
        ))
        .bind(class_id)
        .bind(month_year)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(student_id, first_name, last_name, total_paid)| ClassFeeSummaryRow {
                student_id,
                first_name,
                last_name,
                total_due,
                total_paid,
                balance: total_due - total_paid,
                status: classify_status(total_due, total_paid),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fully_paid_month() {
        assert_eq!(classify_status(dec!(100), dec!(100)), StudentFeeStatus::Paid);
    }

    #[test]
    fn overpayment_still_counts_as_paid() {
        assert_eq!(classify_status(dec!(100), dec!(130)), StudentFeeStatus::Paid);
    }

    #[test]
    fn partial_payment() {
        assert_eq!(classify_status(dec!(100), dec!(40)), StudentFeeStatus::Partial);
    }

    #[test]
    fn nothing_paid_yet() {
        assert_eq!(classify_status(dec!(100), dec!(0)), StudentFeeStatus::Unpaid);
    }

    #[test]
    fn no_dues_defined_for_the_month() {
        assert_eq!(classify_status(dec!(0), dec!(0)), StudentFeeStatus::NotApplicable);
        // Payments against a month with no structures never flip the standing.
        assert_eq!(classify_status(dec!(0), dec!(50)), StudentFeeStatus::NotApplicable);
    }
}
