//! Property-based tests for OutstandingService.

use chrono::{Days, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::outstanding::service::OutstandingService;
use crate::outstanding::types::{NewOutstanding, Outstanding, OutstandingStatus, OutstandingType};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn open(amount: Decimal, due_offset: u64) -> Outstanding {
    OutstandingService::open(
        NewOutstanding {
            outstanding_type: OutstandingType::InvoicePayable,
            reference_type: "purchase_order".into(),
            reference_id: "7".into(),
            reference_number: "PO-7".into(),
            amount,
            due_date: base_date() + Days::new(due_offset),
            party_name: "Supplier".into(),
            party_contact: None,
            notes: None,
        },
        base_date(),
        Utc::now(),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A second sweep on the same day never changes anything.
    #[test]
    fn prop_update_days_overdue_idempotent(
        amount in arb_amount(),
        due_offset in 0u64..60,
        today_offset in 0u64..120,
    ) {
        let mut item = open(amount, due_offset);
        let today = base_date() + Days::new(today_offset);
        let now = Utc::now();

        OutstandingService::update_days_overdue(&mut item, today, now);
        let once = item.clone();
        let changed = OutstandingService::update_days_overdue(&mut item, today, now);

        prop_assert!(!changed);
        prop_assert_eq!(&item, &once);
        prop_assert_eq!(item.days_overdue > 0, today_offset > due_offset);
        prop_assert_eq!(
            item.status == OutstandingStatus::Overdue,
            today_offset > due_offset
        );
    }

    /// Partial payments never drive the remaining amount below zero, and the
    /// item settles exactly when the payments cover it.
    #[test]
    fn prop_partial_payments_clamp_at_zero(
        amount in arb_amount(),
        payments in prop::collection::vec(arb_amount(), 1..8),
    ) {
        let mut item = open(amount, 30);
        let mut paid = Decimal::ZERO;

        for payment in payments {
            if item.status == OutstandingStatus::Settled {
                prop_assert!(
                    OutstandingService::mark_partially_paid(&mut item, payment, None, Utc::now())
                        .is_err()
                );
                continue;
            }
            OutstandingService::mark_partially_paid(&mut item, payment, None, Utc::now()).unwrap();
            paid += payment;
            prop_assert!(item.amount >= Decimal::ZERO);
        }

        if paid >= amount {
            prop_assert_eq!(item.status, OutstandingStatus::Settled);
            prop_assert_eq!(item.amount, Decimal::ZERO);
        } else {
            prop_assert_eq!(item.status, OutstandingStatus::PartiallyPaid);
            prop_assert_eq!(item.amount, amount - paid);
        }
    }
}
