//! Property-based tests for PartyLedgerService.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::party::service::PartyLedgerService;
use crate::party::types::{
    EntryDraft, NewPartyLedger, PartyAddress, PartyEntryKind, PartyKind, PartyLedgerEntry,
};

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_opening() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Running totals and the last entry's snapshot always agree with the balance.
    #[test]
    fn prop_balance_matches_totals(
        opening in arb_opening(),
        ops in prop::collection::vec((any::<bool>(), arb_amount()), 1..40),
    ) {
        let mut ledger = PartyLedgerService::open(
            NewPartyLedger {
                kind: PartyKind::Supplier,
                party_name: "Supplier".into(),
                phone: "9000000000".into(),
                email: None,
                address: PartyAddress::default(),
                opening_balance: opening,
            },
            Utc::now(),
        )
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

        let mut debits = Decimal::ZERO;
        let mut credits = Decimal::ZERO;
        let mut last: Option<PartyLedgerEntry> = None;

        for (is_debit, amount) in ops {
            let draft = EntryDraft::new(PartyEntryKind::Adjustment, date, "op");
            let entry = if is_debit {
                debits += amount;
                PartyLedgerService::add_debit(&mut ledger, amount, draft, Utc::now())
            } else {
                credits += amount;
                PartyLedgerService::add_credit(&mut ledger, amount, draft, Utc::now())
            }
            .unwrap();
            last = Some(entry);
        }

        prop_assert!(ledger.is_consistent());
        prop_assert_eq!(ledger.current_balance, opening + debits - credits);
        prop_assert_eq!(ledger.total_debits, debits);
        prop_assert_eq!(ledger.total_credits, credits);
        prop_assert_eq!(last.map(|e| e.balance_after), Some(ledger.current_balance));
    }
}
