//! Concurrent access stress tests.
//!
//! These tests verify that:
//! - Payments for one party running at the same time never lose an update
//! - Money is conserved across concurrent allocations
//! - Document numbers stay unique under contention
//! - The overdue sweep survives concurrent writers

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Barrier;

use bahi_core::outstanding::{
    Direction, NewOutstanding, OutstandingFilter, OutstandingStatus, OutstandingType,
    PaymentDetails,
};
use bahi_db::repositories::PaymentInput;
use bahi_db::{OutstandingRepository, PaymentRepository, SequenceRepository};
use bahi_shared::types::PageRequest;

use common::{connect, date, unique_phone, unique_suffix};

const PAYMENTS: usize = 20;

#[tokio::test]
async fn test_concurrent_payments_conserve_money() {
    let Some(db) = connect().await else { return };
    let outstanding = OutstandingRepository::new(db.clone());
    let phone = unique_phone();

    for amount in [dec!(100.00), dec!(250.00), dec!(75.50)] {
        let id = unique_suffix();
        outstanding
            .create_for_document(
                NewOutstanding {
                    outstanding_type: OutstandingType::InvoicePayable,
                    reference_type: "purchase_order".to_string(),
                    reference_number: format!("PO-{id}"),
                    reference_id: id,
                    amount,
                    due_date: date(2030, 6, 30),
                    party_name: "Jaipur Mills".to_string(),
                    party_contact: Some(phone.clone()),
                    notes: None,
                },
                date(2026, 5, 1),
            )
            .await
            .unwrap();
    }
    let owed = dec!(425.50);

    let barrier = Arc::new(Barrier::new(PAYMENTS));
    let handles = (0..PAYMENTS).map(|_| {
        let repo = PaymentRepository::new(db.clone());
        let barrier = Arc::clone(&barrier);
        let input = PaymentInput {
            direction: Direction::Payable,
            party_key: phone.clone(),
            party_name: "Jaipur Mills".to_string(),
            amount: dec!(25.00),
            details: PaymentDetails::method("cash"),
            source_reference: None,
        };
        tokio::spawn(async move {
            barrier.wait().await;
            repo.apply_payment(&input).await
        })
    });

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    let paid = dec!(25.00) * Decimal::from(u64::try_from(PAYMENTS).unwrap());
    let applied: Decimal = results.iter().map(|r| r.outcome.total_applied()).sum();
    let advanced: Decimal = results.iter().map(|r| r.outcome.leftover).sum();
    assert_eq!(applied + advanced, paid);
    assert_eq!(applied, owed.min(paid));

    let items = outstanding
        .list(
            &OutstandingFilter {
                party_key: Some(phone.clone()),
                direction: Some(Direction::Payable),
                ..OutstandingFilter::default()
            },
            &PageRequest::new(1, 10),
        )
        .await
        .unwrap();
    let remaining: Decimal = items.data.iter().map(|i| i.amount).sum();
    assert_eq!(remaining, owed - applied);
    assert!(items.data.iter().all(|i| i.amount >= Decimal::ZERO));
    assert!(
        items
            .data
            .iter()
            .all(|i| i.status == OutstandingStatus::Settled || i.amount > Decimal::ZERO)
    );

    let advances: Decimal = outstanding
        .advances_for(Direction::Payable, &phone)
        .await
        .unwrap()
        .iter()
        .map(|a| a.remaining_amount)
        .sum();
    assert_eq!(advances, advanced);
}

#[tokio::test]
async fn test_concurrent_sequence_numbers_unique() {
    let Some(db) = connect().await else { return };
    let prefix = format!("T{}", &unique_suffix()[..6]);

    let barrier = Arc::new(Barrier::new(50));
    let handles = (0..50).map(|_| {
        let repo = SequenceRepository::new(db.clone());
        let barrier = Arc::clone(&barrier);
        let prefix = prefix.clone();
        tokio::spawn(async move {
            barrier.wait().await;
            repo.next_number(&prefix, 2026).await
        })
    });

    let numbers: Vec<String> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap().to_string())
        .collect();

    let unique: HashSet<_> = numbers.iter().collect();
    assert_eq!(unique.len(), 50);
    assert!(numbers.contains(&format!("{prefix}-2026-000001")));
    assert!(numbers.contains(&format!("{prefix}-2026-000050")));
}

#[tokio::test]
async fn test_sweep_alongside_payments() {
    let Some(db) = connect().await else { return };
    let outstanding = OutstandingRepository::new(db.clone());
    let phone = unique_phone();

    let mut ids = Vec::new();
    for _ in 0..10 {
        let id = unique_suffix();
        let created = outstanding
            .create_for_document(
                NewOutstanding {
                    outstanding_type: OutstandingType::InvoiceReceivable,
                    reference_type: "order".to_string(),
                    reference_number: format!("SO-{id}"),
                    reference_id: id,
                    amount: dec!(10.00),
                    due_date: date(2026, 2, 1),
                    party_name: "Sharma Kirana".to_string(),
                    party_contact: Some(phone.clone()),
                    notes: None,
                },
                date(2026, 1, 1),
            )
            .await
            .unwrap();
        ids.push(created.item.id);
    }

    let sweeper = {
        let repo = outstanding.clone();
        tokio::spawn(async move { repo.sweep_overdue(date(2026, 2, 11), 3, 5).await })
    };
    let payer = {
        let repo = PaymentRepository::new(db.clone());
        let phone = phone.clone();
        tokio::spawn(async move {
            repo.apply_payment(&PaymentInput {
                direction: Direction::Receivable,
                party_key: phone,
                party_name: "Sharma Kirana".to_string(),
                amount: dec!(50.00),
                details: PaymentDetails::method("upi"),
                source_reference: None,
            })
            .await
        })
    };

    sweeper.await.unwrap().unwrap();
    let paid = payer.await.unwrap().unwrap();
    assert_eq!(paid.outcome.total_applied(), dec!(50.00));

    let mut settled = 0;
    for id in ids {
        let item = outstanding.find(id).await.unwrap();
        match item.status {
            OutstandingStatus::Settled => {
                settled += 1;
                assert_eq!(item.amount, dec!(0));
            }
            OutstandingStatus::Pending | OutstandingStatus::Overdue => {
                assert_eq!(item.amount, dec!(10.00));
            }
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(settled, 5);
}
