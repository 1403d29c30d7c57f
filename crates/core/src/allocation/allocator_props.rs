//! Property-based tests for PaymentAllocator.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::allocation::allocator::PaymentAllocator;
use crate::outstanding::{
    Direction, NewOutstanding, Outstanding, OutstandingService, OutstandingStatus,
    OutstandingType, PaymentDetails,
};

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn created(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(offset)
}

fn payable(amount: Decimal, offset: i64) -> Outstanding {
    let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    OutstandingService::open(
        NewOutstanding {
            outstanding_type: OutstandingType::PurchaseOrder,
            reference_type: "purchase_order".into(),
            reference_id: offset.to_string(),
            reference_number: format!("PO-{offset}"),
            amount,
            due_date: today,
            party_name: "Jaipur Mills".into(),
            party_contact: Some("9414000000".into()),
            notes: None,
        },
        today,
        created(offset),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Applied amounts plus leftover always equal the payment, and leftover
    /// only remains once every item is settled.
    #[test]
    fn prop_allocation_conserves_money(
        amounts in prop::collection::vec(arb_amount(), 0..12),
        offsets in prop::collection::vec(0i64..500, 12),
        payment in arb_amount(),
    ) {
        let mut items: Vec<Outstanding> = amounts
            .iter()
            .zip(offsets.iter())
            .map(|(&amount, &offset)| payable(amount, offset))
            .collect();
        let before: Vec<Decimal> = items.iter().map(|i| i.amount).collect();

        let outcome = PaymentAllocator::allocate(
            &mut items,
            "9414000000",
            Direction::Payable,
            payment,
            &PaymentDetails::default(),
            created(1_000),
        )
        .unwrap();

        prop_assert_eq!(outcome.total_applied() + outcome.leftover, payment);
        prop_assert!(outcome.leftover >= Decimal::ZERO);

        let reduced: Decimal = before
            .iter()
            .zip(items.iter())
            .map(|(b, i)| *b - i.amount)
            .sum();
        prop_assert_eq!(reduced, outcome.total_applied());

        if outcome.leftover > Decimal::ZERO {
            prop_assert!(items.iter().all(|i| i.status == OutstandingStatus::Settled));
        }
        for item in &items {
            prop_assert!(item.amount >= Decimal::ZERO);
        }
    }

    /// At most one item ends partially paid, and every item created before it
    /// is settled.
    #[test]
    fn prop_allocation_is_oldest_first(
        amounts in prop::collection::vec(arb_amount(), 1..12),
        payment in arb_amount(),
    ) {
        let mut items: Vec<Outstanding> = amounts
            .iter()
            .enumerate()
            .map(|(idx, &amount)| payable(amount, i64::try_from(idx).unwrap()))
            .collect();

        PaymentAllocator::allocate(
            &mut items,
            "9414000000",
            Direction::Payable,
            payment,
            &PaymentDetails::default(),
            created(1_000),
        )
        .unwrap();

        let partial: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, i)| i.status == OutstandingStatus::PartiallyPaid)
            .map(|(idx, _)| idx)
            .collect();
        prop_assert!(partial.len() <= 1);
        if let Some(&p) = partial.first() {
            prop_assert!(items[..p].iter().all(|i| i.status == OutstandingStatus::Settled));
            prop_assert!(items[p + 1..].iter().all(|i| i.amount == i.original_amount));
        }
    }
}
