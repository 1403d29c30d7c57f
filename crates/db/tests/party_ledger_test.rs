//! Party ledger integration tests.
//!
//! These tests verify that:
//! - Ledgers are keyed by kind and normalized phone
//! - Payment entries credit the ledger, settle outstanding items and post the
//!   cash movement voucher in one transaction
//! - Suspended ledgers reject entries
//! - The credit document backfill is idempotent

mod common;

use rust_decimal_macros::dec;

use bahi_core::documents::DocumentKind;
use bahi_core::ledger::{AccountType, VoucherType};
use bahi_core::outstanding::{OutstandingStatus, PaymentDetails};
use bahi_core::party::{NewPartyLedger, PartyAddress, PartyEntryKind, PartyKind, PartyLedgerStatus};
use bahi_db::repositories::PaymentEntryInput;
use bahi_db::{OutstandingRepository, PartyLedgerRepository, VoucherRepository};
use bahi_shared::config::AccountCodesConfig;
use bahi_shared::types::{DateRange, PageRequest};

use common::{connect, create_account, date, sales_order, timestamp, unique_phone};

fn new_customer(phone: &str) -> NewPartyLedger {
    NewPartyLedger {
        kind: PartyKind::Customer,
        party_name: "Mehta Traders".to_string(),
        phone: phone.to_string(),
        email: None,
        address: PartyAddress {
            city: Some("Jaipur".to_string()),
            state: Some("Rajasthan".to_string()),
            ..PartyAddress::default()
        },
        opening_balance: dec!(0),
    }
}

#[tokio::test]
async fn test_find_or_create_keyed_by_phone() {
    let Some(db) = connect().await else { return };
    let repo = PartyLedgerRepository::new(db.clone());
    let phone = unique_phone();

    let ledger = repo.find_or_create(new_customer(&phone)).await.unwrap();
    assert_eq!(ledger.phone, phone);

    let formatted = format!("+91 {} {}", &phone[..5], &phone[5..]);
    let again = repo.find_or_create(new_customer(&formatted)).await.unwrap();
    assert_eq!(again.id, ledger.id);

    let mut supplier = new_customer(&phone);
    supplier.kind = PartyKind::Supplier;
    let other = repo.find_or_create(supplier).await.unwrap();
    assert_ne!(other.id, ledger.id);

    let found = repo
        .find_by_phone(PartyKind::Customer, &formatted)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, ledger.id);
}

#[tokio::test]
async fn test_payment_entry_allocates_and_posts_voucher() {
    let Some(db) = connect().await else { return };
    let repo = PartyLedgerRepository::new(db.clone());
    let outstanding = OutstandingRepository::new(db.clone());

    let cash = create_account(&db, "1010", "Cash", AccountType::Asset).await;
    let bank = create_account(&db, "1020", "Bank", AccountType::Asset).await;
    let receivable = create_account(&db, "1100", "Receivables", AccountType::Asset).await;
    let payable = create_account(&db, "2100", "Payables", AccountType::Liability).await;
    let codes = AccountCodesConfig {
        cash_code: cash.code.clone(),
        bank_code: bank.code.clone(),
        receivable_code: receivable.code.clone(),
        payable_code: payable.code.clone(),
    };

    let phone = unique_phone();
    let ledger = repo.find_or_create(new_customer(&phone)).await.unwrap();
    let order = sales_order(&phone, dec!(1180.00), timestamp(2026, 6, 1));

    let item = outstanding
        .open_for_transaction(&order, date(2026, 6, 1))
        .await
        .unwrap()
        .unwrap()
        .item;
    let invoice = repo
        .add_invoice_entry(ledger.id, &order, order.total)
        .await
        .unwrap();
    assert_eq!(invoice.balance_after, dec!(1180.00));

    let repeat = repo
        .add_invoice_entry(ledger.id, &order, order.total)
        .await
        .unwrap();
    assert_eq!(repeat.id, invoice.id);

    let result = repo
        .add_payment_entry(
            ledger.id,
            &PaymentEntryInput {
                amount: dec!(1180.00),
                details: PaymentDetails::method("bank"),
                entry_date: date(2026, 6, 10),
                record_cash_movement: true,
            },
            &codes,
        )
        .await
        .unwrap();

    assert_eq!(result.ledger.current_balance, dec!(0));
    assert_eq!(result.entry.credit, dec!(1180.00));
    assert_eq!(result.entry.balance_after, dec!(0));
    assert_eq!(result.allocation.outcome.total_applied(), dec!(1180.00));
    assert!(result.allocation.advance.is_none());

    let settled = outstanding.find(item.id).await.unwrap();
    assert_eq!(settled.status, OutstandingStatus::Settled);

    let voucher = result.voucher.unwrap();
    assert_eq!(voucher.voucher_type, VoucherType::Receipt);
    let stored = VoucherRepository::new(db.clone())
        .get_voucher(voucher.id)
        .await
        .unwrap();
    assert_eq!(stored.entries.len(), 2);
    assert_eq!(stored.entries[0].account_id, bank.id);
    assert_eq!(stored.entries[0].debit, dec!(1180.00));
    assert_eq!(stored.entries[1].account_id, receivable.id);
    assert_eq!(stored.entries[1].credit, dec!(1180.00));

    let reloaded = repo.find_by_id(ledger.id).await.unwrap();
    assert!(reloaded.is_consistent());
    assert_eq!(reloaded.total_debits, dec!(1180.00));
    assert_eq!(reloaded.total_credits, dec!(1180.00));
}

#[tokio::test]
async fn test_payment_entry_rolls_back_when_voucher_fails() {
    let Some(db) = connect().await else { return };
    let repo = PartyLedgerRepository::new(db.clone());

    let phone = unique_phone();
    let ledger = repo.find_or_create(new_customer(&phone)).await.unwrap();
    let codes = AccountCodesConfig {
        cash_code: "no-such-cash".to_string(),
        bank_code: "no-such-bank".to_string(),
        receivable_code: "no-such-receivable".to_string(),
        payable_code: "no-such-payable".to_string(),
    };

    let err = repo
        .add_payment_entry(
            ledger.id,
            &PaymentEntryInput {
                amount: dec!(100.00),
                details: PaymentDetails::method("cash"),
                entry_date: date(2026, 6, 10),
                record_cash_movement: true,
            },
            &codes,
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_NOT_FOUND");

    let unchanged = repo.find_by_id(ledger.id).await.unwrap();
    assert_eq!(unchanged.total_credits, dec!(0));
    let entries = repo
        .list_entries(ledger.id, None, &PageRequest::new(1, 10))
        .await
        .unwrap();
    assert_eq!(entries.meta.total, 0);
}

#[tokio::test]
async fn test_adjustments_and_entry_listing() {
    let Some(db) = connect().await else { return };
    let repo = PartyLedgerRepository::new(db.clone());

    let mut input = new_customer(&unique_phone());
    input.opening_balance = dec!(500.00);
    let ledger = repo.find_or_create(input).await.unwrap();

    repo.add_adjustment_entry(ledger.id, dec!(50.00), true, "Freight recharge", None, date(2026, 7, 1))
        .await
        .unwrap();
    repo.add_adjustment_entry(ledger.id, dec!(20.00), false, "Rate difference", None, date(2026, 7, 5))
        .await
        .unwrap();

    let blank = repo
        .add_adjustment_entry(ledger.id, dec!(1.00), true, "  ", None, date(2026, 7, 5))
        .await
        .unwrap_err();
    assert_eq!(blank.error_code(), "BLANK_FIELD");

    let all = repo
        .list_entries(ledger.id, None, &PageRequest::new(1, 10))
        .await
        .unwrap();
    let balances: Vec<_> = all.data.iter().map(|e| e.balance_after).collect();
    assert_eq!(balances, vec![dec!(550.00), dec!(530.00)]);
    assert!(all.data.iter().all(|e| e.kind == PartyEntryKind::Adjustment));

    let july_first = repo
        .list_entries(
            ledger.id,
            DateRange::new(date(2026, 7, 1), date(2026, 7, 1)),
            &PageRequest::new(1, 10),
        )
        .await
        .unwrap();
    assert_eq!(july_first.data.len(), 1);

    let reloaded = repo.find_by_id(ledger.id).await.unwrap();
    assert_eq!(reloaded.current_balance, dec!(530.00));
    assert!(reloaded.is_consistent());
}

#[tokio::test]
async fn test_suspended_ledger_rejects_entries() {
    let Some(db) = connect().await else { return };
    let repo = PartyLedgerRepository::new(db.clone());

    let ledger = repo.find_or_create(new_customer(&unique_phone())).await.unwrap();
    repo.set_status(ledger.id, PartyLedgerStatus::Suspended).await.unwrap();

    let err = repo
        .add_adjustment_entry(ledger.id, dec!(10.00), true, "Late fee", None, date(2026, 7, 1))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "PARTY_LEDGER_SUSPENDED");

    let bad = repo
        .set_status(ledger.id, PartyLedgerStatus::Inactive)
        .await
        .unwrap_err();
    assert_eq!(bad.error_code(), "INVALID_STATUS_TRANSITION");

    let active = repo.set_status(ledger.id, PartyLedgerStatus::Active).await.unwrap();
    assert_eq!(active.status, PartyLedgerStatus::Active);
}

#[tokio::test]
async fn test_backfill_is_idempotent() {
    let Some(db) = connect().await else { return };
    let repo = PartyLedgerRepository::new(db.clone());

    let phone = unique_phone();
    let first = sales_order(&phone, dec!(300.00), timestamp(2025, 11, 3));
    let second = sales_order(&phone, dec!(200.00), timestamp(2025, 12, 9));
    let mut purchase = sales_order(&unique_phone(), dec!(90.00), timestamp(2025, 12, 10));
    purchase.kind = DocumentKind::PurchaseOrder;
    let mut no_phone = sales_order(&phone, dec!(10.00), timestamp(2025, 12, 11));
    no_phone.party_phone = None;

    let documents = vec![first, second, purchase, no_phone];

    let report = repo
        .create_ledgers_for_existing_credit_orders(&documents)
        .await
        .unwrap();
    assert_eq!(report.ledgers_created, 2);
    assert_eq!(report.entries_created, 3);
    assert_eq!(report.skipped, 1);

    let again = repo
        .create_ledgers_for_existing_credit_orders(&documents)
        .await
        .unwrap();
    assert_eq!(again.ledgers_created, 0);
    assert_eq!(again.entries_created, 0);
    assert_eq!(again.skipped, 4);

    let customer = repo
        .find_by_phone(PartyKind::Customer, &phone)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(customer.current_balance, dec!(500.00));
    assert_eq!(customer.address.state.as_deref(), Some("Rajasthan"));

    let dashboard = repo.dashboard(PartyKind::Customer).await.unwrap();
    assert!(dashboard.parties_with_balance >= 1);
    assert!(dashboard.total_outstanding >= dec!(500.00));
}
