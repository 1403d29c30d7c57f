//! Property-based tests for voucher balance validation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use bahi_shared::types::AccountId;

use super::chart::{ChartOfAccounts, NewAccount};
use super::error::LedgerError;
use super::service::LedgerService;
use super::types::{AccountType, CreateVoucherInput, VoucherEntryInput, VoucherType};

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // Generate amounts from 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

fn chart() -> (ChartOfAccounts, AccountId, AccountId) {
    let mut chart = ChartOfAccounts::new();
    let debit_side = chart
        .add(NewAccount {
            code: "1000".into(),
            name: "Debit side".into(),
            account_type: AccountType::Asset,
            parent_id: None,
        })
        .unwrap();
    let credit_side = chart
        .add(NewAccount {
            code: "2000".into(),
            name: "Credit side".into(),
            account_type: AccountType::Liability,
            parent_id: None,
        })
        .unwrap();
    (chart, debit_side, credit_side)
}

fn voucher(entries: Vec<VoucherEntryInput>) -> CreateVoucherInput {
    CreateVoucherInput {
        date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        narration: "prop".into(),
        voucher_type: VoucherType::Journal,
        entries,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any accepted voucher has equal debit and credit totals.
    #[test]
    fn prop_accepted_vouchers_balance(
        debits in prop::collection::vec(positive_amount(), 1..6),
        credits in prop::collection::vec(positive_amount(), 1..6),
    ) {
        let (chart, dr, cr) = chart();
        let mut entries: Vec<VoucherEntryInput> =
            debits.iter().map(|a| VoucherEntryInput::debit(dr, *a)).collect();
        entries.extend(credits.iter().map(|a| VoucherEntryInput::credit(cr, *a)));

        let total_debit: Decimal = debits.iter().copied().sum();
        let total_credit: Decimal = credits.iter().copied().sum();

        match LedgerService::validate_against_chart(&voucher(entries), &chart) {
            Ok((resolved, totals)) => {
                prop_assert_eq!(total_debit, total_credit);
                let d: Decimal = resolved.iter().map(|e| e.debit).sum();
                let c: Decimal = resolved.iter().map(|e| e.credit).sum();
                prop_assert_eq!(d, c);
                prop_assert!(totals.is_balanced);
            }
            Err(LedgerError::ImbalancedVoucher { debit, credit }) => {
                prop_assert_ne!(total_debit, total_credit);
                prop_assert_eq!(debit, total_debit);
                prop_assert_eq!(credit, total_credit);
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    /// Splitting one debit across many credits always balances.
    #[test]
    fn prop_split_credits_balance(
        parts in prop::collection::vec(positive_amount(), 1..8),
    ) {
        let (chart, dr, cr) = chart();
        let total: Decimal = parts.iter().copied().sum();
        let mut entries = vec![VoucherEntryInput::debit(dr, total)];
        entries.extend(parts.iter().map(|a| VoucherEntryInput::credit(cr, *a)));

        let result = LedgerService::validate_against_chart(&voucher(entries), &chart);
        prop_assert!(result.is_ok());
    }
}
