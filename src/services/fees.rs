use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::tenant::schema_name,
    error::ApiError,
    models::fee::{CreateFeeHeadRequest, FeeHead, FeeStructure, SetFeeStructureRequest},
};

/// Validates the `YYYY-MM` month key used by fee structures and payments.
pub fn validate_month_year(value: &str) -> Result<(), ApiError> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
        && matches!(value[5..].parse::<u8>(), Ok(1..=12));

    if well_formed {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(format!(
            "Invalid month: '{value}' (expected YYYY-MM)"
        )))
    }
}

pub struct FeeCatalogService;

impl FeeCatalogService {
    pub async fn create_fee_head(
        pool: &PgPool,
        tenant: &str,
        req: &CreateFeeHeadRequest,
    ) -> Result<FeeHead, ApiError> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("Fee head name is required".into()));
        }

        let schema = schema_name(tenant);
        sqlx::query_as::<_, FeeHead>(&format!(
            r#"INSERT INTO "{schema}".fee_heads (name, is_one_time)
               VALUES ($1, $2)
               RETURNING id, name, is_one_time, created_at"#
        ))
        .bind(name)
        .bind(req.is_one_time.unwrap_or(false))
        .fetch_one(pool)
        .await
        .map_err(|e| {
            ApiError::conflict_on_unique(e, &format!("A fee head named '{name}' already exists"))
        })
    }

    pub async fn list_fee_heads(pool: &PgPool, tenant: &str) -> Result<Vec<FeeHead>, ApiError> {
        let schema = schema_name(tenant);
        let heads = sqlx::query_as::<_, FeeHead>(&format!(
            r#"SELECT id, name, is_one_time, created_at
               FROM "{schema}".fee_heads ORDER BY created_at, id"#
        ))
        .fetch_all(pool)
        .await?;
        Ok(heads)
    }

    /// Deleting a fee head that fee structures or payment history still
    /// reference is forbidden; the FK violation surfaces as `Conflict`.
    pub async fn delete_fee_head(pool: &PgPool, tenant: &str, id: Uuid) -> Result<(), ApiError> {
        let schema = schema_name(tenant);
        let result = sqlx::query(&format!(r#"DELETE FROM "{schema}".fee_heads WHERE id = $1"#))
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                ApiError::conflict_on_fk(
                    e,
                    "Fee head is referenced by fee structures or payments and cannot be deleted",
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Fee head not found".into()));
        }
        Ok(())
    }

    /// Upsert on (class_id, fee_head_id, month_year): setting a structure for
    /// an existing key overwrites its amount, last write wins. Concurrent
    /// writers serialize on the unique constraint.
    pub async fn set_fee_structure(
        pool: &PgPool,
        tenant: &str,
        req: &SetFeeStructureRequest,
    ) -> Result<FeeStructure, ApiError> {
        validate_month_year(&req.month_year)?;
        if req.amount < Decimal::ZERO {
            return Err(ApiError::InvalidInput(format!(
                "Fee amount must not be negative (got {})",
                req.amount
            )));
        }

        let schema = schema_name(tenant);
        sqlx::query_as::<_, FeeStructure>(&format!(
            r#"INSERT INTO "{schema}".fee_structures (class_id, fee_head_id, month_year, amount)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (class_id, fee_head_id, month_year)
               DO UPDATE SET amount = EXCLUDED.amount
               RETURNING id, class_id, fee_head_id, month_year, amount, created_at, updated_at"#
        ))
        .bind(req.class_id)
        .bind(req.fee_head_id)
        .bind(&req.month_year)
        .bind(req.amount)
        .fetch_one(pool)
        .await
        .map_err(|e| ApiError::not_found_on_fk(e, "Class or fee head not found"))
    }

    /// Structures in definition order — the natural listing order the
    /// allocation engine consumes.
    pub async fn list_structures(
        pool: &PgPool,
        tenant: &str,
        class_id: Uuid,
        month_year: &str,
    ) -> Result<Vec<FeeStructure>, ApiError> {
        validate_month_year(month_year)?;
        let schema = schema_name(tenant);
        let structures = sqlx::query_as::<_, FeeStructure>(&format!(
            r#"SELECT id, class_id, fee_head_id, month_year, amount, created_at, updated_at
               FROM "{schema}".fee_structures
               WHERE class_id = $1 AND month_year = $2
               ORDER BY created_at, id"#
        ))
        .bind(class_id)
        .bind(month_year)
        .fetch_all(pool)
        .await?;
        Ok(structures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_months() {
        for m in ["2024-01", "2024-12", "1999-06", "2025-10"] {
            assert!(validate_month_year(m).is_ok(), "{m} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_months() {
        for m in ["2024-13", "2024-00", "2024-1", "202401", "24-01", "2024/01", "2024-ab", ""] {
            assert!(validate_month_year(m).is_err(), "{m} should be rejected");
        }
    }
}
