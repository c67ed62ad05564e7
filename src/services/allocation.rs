use rust_decimal::Decimal;
use uuid::Uuid;

/// An outstanding balance for one fee head, in the catalog's listing order.
#[derive(Debug, Clone, PartialEq)]
pub struct DueLine {
    pub fee_head_id: Uuid,
    pub balance: Decimal,
}

/// A per-head share of a lump payment.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationItem {
    pub fee_head_id: Uuid,
    pub amount_paid: Decimal,
}

/// Splits a lump payment across outstanding dues, greedily and in the order
/// supplied by the caller. Heads with a non-positive balance are skipped and
/// zero allocations are never emitted.
///
/// Returns the items plus the unallocatable remainder. The remainder is zero
/// unless `amount` exceeds the sum of positive balances; a non-zero remainder
/// means the caller must reject the payment.
pub fn allocate(amount: Decimal, dues: &[DueLine]) -> (Vec<AllocationItem>, Decimal) {
    let mut remaining = amount;
    let mut items = Vec::new();

    for due in dues {
        if remaining <= Decimal::ZERO {
            break;
        }
        if due.balance <= Decimal::ZERO {
            continue;
        }
        let take = remaining.min(due.balance);
        items.push(AllocationItem {
            fee_head_id: due.fee_head_id,
            amount_paid: take,
        });
        remaining -= take;
    }

    (items, remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn due(id: Uuid, balance: Decimal) -> DueLine {
        DueLine { fee_head_id: id, balance }
    }

    #[test]
    fn splits_in_caller_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let dues = vec![due(a, dec!(100)), due(b, dec!(50))];

        let (items, remainder) = allocate(dec!(120), &dues);

        assert_eq!(remainder, dec!(0));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], AllocationItem { fee_head_id: a, amount_paid: dec!(100) });
        assert_eq!(items[1], AllocationItem { fee_head_id: b, amount_paid: dec!(20) });
    }

    #[test]
    fn exact_cover_of_first_head_emits_single_item() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let dues = vec![due(a, dec!(75)), due(b, dec!(25))];

        let (items, remainder) = allocate(dec!(75), &dues);

        assert_eq!(remainder, dec!(0));
        assert_eq!(items, vec![AllocationItem { fee_head_id: a, amount_paid: dec!(75) }]);
    }

    #[test]
    fn overflow_returns_remainder() {
        let a = Uuid::new_v4();
        let dues = vec![due(a, dec!(50))];

        let (items, remainder) = allocate(dec!(80), &dues);

        assert_eq!(items, vec![AllocationItem { fee_head_id: a, amount_paid: dec!(50) }]);
        assert_eq!(remainder, dec!(30));
    }

    #[test]
    fn skips_settled_and_overpaid_heads() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let dues = vec![due(a, dec!(0)), due(b, dec!(-25)), due(c, dec!(40))];

        let (items, remainder) = allocate(dec!(40), &dues);

        assert_eq!(items, vec![AllocationItem { fee_head_id: c, amount_paid: dec!(40) }]);
        assert_eq!(remainder, dec!(0));
        assert!(items.iter().all(|i| i.amount_paid > dec!(0)));
    }

    #[test]
    fn no_outstanding_dues_leaves_everything_unallocated() {
        let (items, remainder) = allocate(dec!(100), &[]);
        assert!(items.is_empty());
        assert_eq!(remainder, dec!(100));
    }

    #[test]
    fn conserves_amount_across_items_and_remainder() {
        let dues = vec![
            due(Uuid::new_v4(), dec!(33.50)),
            due(Uuid::new_v4(), dec!(0)),
            due(Uuid::new_v4(), dec!(12.25)),
            due(Uuid::new_v4(), dec!(7)),
        ];

        for amount in [dec!(1), dec!(33.50), dec!(40), dec!(52.75), dec!(60)] {
            let (items, remainder) = allocate(amount, &dues);
            let allocated: Decimal = items.iter().map(|i| i.amount_paid).sum();
            assert_eq!(allocated + remainder, amount);
        }
    }

    #[test]
    fn deterministic_for_identical_input() {
        let dues = vec![
            due(Uuid::new_v4(), dec!(100)),
            due(Uuid::new_v4(), dec!(200)),
            due(Uuid::new_v4(), dec!(300)),
        ];

        let first = allocate(dec!(450), &dues);
        for _ in 0..10 {
            assert_eq!(allocate(dec!(450), &dues), first);
        }
    }

    #[test]
    fn partial_cover_stops_at_the_first_head() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let dues = vec![due(a, dec!(100)), due(b, dec!(50))];

        let (items, remainder) = allocate(dec!(60), &dues);

        assert_eq!(items, vec![AllocationItem { fee_head_id: a, amount_paid: dec!(60) }]);
        assert_eq!(remainder, dec!(0));
    }
}
