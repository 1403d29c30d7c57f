//! Party ledger arithmetic.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use bahi_shared::types::{PartyLedgerEntryId, PartyLedgerId, is_currency_scale};

use super::error::PartyLedgerError;
use super::types::{
    EntryDraft, NewPartyLedger, PartyDashboard, PartyEntryKind, PartyKind, PartyLedger,
    PartyLedgerEntry, PartyLedgerStatus, normalize_phone,
};
use crate::documents::TransactionFacts;
use crate::outstanding::PaymentDetails;

/// Service for party ledger operations.
pub struct PartyLedgerService;

impl PartyLedgerService {
    /// Opens an ACTIVE ledger.
    pub fn open(input: NewPartyLedger, now: DateTime<Utc>) -> Result<PartyLedger, PartyLedgerError> {
        let party_name = input.party_name.trim();
        if party_name.is_empty() {
            return Err(PartyLedgerError::BlankField("party_name"));
        }
        let phone = normalize_phone(&input.phone);
        if phone.is_empty() {
            return Err(PartyLedgerError::InvalidPhone(input.phone));
        }
        if !is_currency_scale(input.opening_balance) {
            return Err(PartyLedgerError::InvalidAmount(input.opening_balance));
        }

        Ok(PartyLedger {
            id: PartyLedgerId::new(),
            kind: input.kind,
            party_name: party_name.to_string(),
            phone,
            email: input.email.filter(|e| !e.trim().is_empty()),
            address: input.address,
            opening_balance: input.opening_balance,
            current_balance: input.opening_balance,
            total_debits: Decimal::ZERO,
            total_credits: Decimal::ZERO,
            status: PartyLedgerStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Increases the balance and returns the appended entry.
    pub fn add_debit(
        ledger: &mut PartyLedger,
        amount: Decimal,
        draft: EntryDraft,
        now: DateTime<Utc>,
    ) -> Result<PartyLedgerEntry, PartyLedgerError> {
        Self::check_entry(ledger, amount)?;
        ledger.total_debits += amount;
        ledger.current_balance += amount;
        ledger.updated_at = now;
        Ok(Self::entry(ledger, amount, Decimal::ZERO, draft, now))
    }

    /// Decreases the balance and returns the appended entry.
    pub fn add_credit(
        ledger: &mut PartyLedger,
        amount: Decimal,
        draft: EntryDraft,
        now: DateTime<Utc>,
    ) -> Result<PartyLedgerEntry, PartyLedgerError> {
        Self::check_entry(ledger, amount)?;
        ledger.total_credits += amount;
        ledger.current_balance -= amount;
        ledger.updated_at = now;
        Ok(Self::entry(ledger, Decimal::ZERO, amount, draft, now))
    }

    /// Debit entry for a credit sale or purchase, labeled with the document
    /// number.
    pub fn add_invoice_entry(
        ledger: &mut PartyLedger,
        document: &impl TransactionFacts,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<PartyLedgerEntry, PartyLedgerError> {
        let label = match ledger.kind {
            PartyKind::Customer => "Invoice",
            PartyKind::Supplier => "Purchase",
        };
        let mut draft = EntryDraft::new(
            PartyEntryKind::Invoice,
            document.created_at().date_naive(),
            format!("{label} {}", document.reference_number()),
        );
        draft.reference_type = Some(document.reference_type().to_string());
        draft.reference_id = Some(document.reference_id().to_string());
        draft.reference_number = Some(document.reference_number().to_string());
        Self::add_debit(ledger, amount, draft, now)
    }

    /// Credit entry for money received from a customer or paid to a supplier.
    ///
    /// Only the ledger side is written here; the caller applies the same
    /// amount to the party's outstanding items in the same unit of work.
    pub fn add_payment_entry(
        ledger: &mut PartyLedger,
        amount: Decimal,
        details: &PaymentDetails,
        entry_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<PartyLedgerEntry, PartyLedgerError> {
        let verb = match ledger.kind {
            PartyKind::Customer => "Payment received",
            PartyKind::Supplier => "Payment made",
        };
        let description = match details.method.as_deref() {
            Some(method) => format!("{verb} ({method})"),
            None => verb.to_string(),
        };
        let mut draft = EntryDraft::new(PartyEntryKind::Payment, entry_date, description);
        draft.payment_method.clone_from(&details.method);
        draft.payment_reference.clone_from(&details.reference);
        draft.notes.clone_from(&details.notes);
        Self::add_credit(ledger, amount, draft, now)
    }

    /// Manual correction, debit or credit per `is_debit`.
    pub fn add_adjustment_entry(
        ledger: &mut PartyLedger,
        amount: Decimal,
        is_debit: bool,
        reason: &str,
        notes: Option<String>,
        entry_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<PartyLedgerEntry, PartyLedgerError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(PartyLedgerError::BlankField("reason"));
        }
        let mut draft = EntryDraft::new(
            PartyEntryKind::Adjustment,
            entry_date,
            format!("Adjustment: {reason}"),
        );
        draft.notes = notes;
        if is_debit {
            Self::add_debit(ledger, amount, draft, now)
        } else {
            Self::add_credit(ledger, amount, draft, now)
        }
    }

    /// Changes the ledger status.
    pub fn set_status(
        ledger: &mut PartyLedger,
        to: PartyLedgerStatus,
        now: DateTime<Utc>,
    ) -> Result<(), PartyLedgerError> {
        if !ledger.status.can_transition_to(to) {
            return Err(PartyLedgerError::InvalidStatusTransition {
                from: ledger.status,
                to,
            });
        }
        ledger.status = to;
        ledger.updated_at = now;
        Ok(())
    }

    /// Aggregates ledgers of one kind.
    #[must_use]
    pub fn dashboard<'a>(
        ledgers: impl IntoIterator<Item = &'a PartyLedger>,
        kind: PartyKind,
    ) -> PartyDashboard {
        let mut dashboard = PartyDashboard::default();
        for ledger in ledgers.into_iter().filter(|l| l.kind == kind) {
            dashboard.total_parties += 1;
            if ledger.current_balance > Decimal::ZERO {
                dashboard.total_outstanding += ledger.current_balance;
                dashboard.parties_with_balance += 1;
            }
        }
        dashboard
    }

    fn check_entry(ledger: &PartyLedger, amount: Decimal) -> Result<(), PartyLedgerError> {
        if !ledger.status.accepts_entries() {
            return Err(PartyLedgerError::Suspended(ledger.id));
        }
        if amount <= Decimal::ZERO || !is_currency_scale(amount) {
            return Err(PartyLedgerError::InvalidAmount(amount));
        }
        Ok(())
    }

    fn entry(
        ledger: &PartyLedger,
        debit: Decimal,
        credit: Decimal,
        draft: EntryDraft,
        now: DateTime<Utc>,
    ) -> PartyLedgerEntry {
        PartyLedgerEntry {
            id: PartyLedgerEntryId::new(),
            ledger_id: ledger.id,
            kind: draft.kind,
            entry_date: draft.entry_date,
            debit,
            credit,
            balance_after: ledger.current_balance,
            reference_type: draft.reference_type,
            reference_id: draft.reference_id,
            reference_number: draft.reference_number,
            description: draft.description,
            payment_method: draft.payment_method,
            payment_reference: draft.payment_reference,
            notes: draft.notes,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{CreditDocument, DocumentKind};
    use crate::party::types::PartyAddress;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn customer(opening: Decimal) -> PartyLedger {
        PartyLedgerService::open(
            NewPartyLedger {
                kind: PartyKind::Customer,
                party_name: " Meera Stores ".into(),
                phone: "+91 98290 11111".into(),
                email: Some(String::new()),
                address: PartyAddress::default(),
                opening_balance: opening,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_open_normalizes_fields() {
        let ledger = customer(dec!(250));
        assert_eq!(ledger.party_name, "Meera Stores");
        assert_eq!(ledger.phone, "9829011111");
        assert_eq!(ledger.email, None);
        assert_eq!(ledger.current_balance, dec!(250));
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_open_rejects_phone_without_digits() {
        let result = PartyLedgerService::open(
            NewPartyLedger {
                kind: PartyKind::Supplier,
                party_name: "Jaipur Mills".into(),
                phone: "none".into(),
                email: None,
                address: PartyAddress::default(),
                opening_balance: Decimal::ZERO,
            },
            Utc::now(),
        );
        assert!(matches!(result, Err(PartyLedgerError::InvalidPhone(_))));
    }

    #[test]
    fn test_invoice_then_payment() {
        let mut ledger = customer(Decimal::ZERO);
        let doc = CreditDocument {
            kind: DocumentKind::SalesOrder,
            id: "42".into(),
            number: "SO-42".into(),
            total: dec!(1180),
            party_name: "Meera Stores".into(),
            party_phone: Some("9829011111".into()),
            party_state: None,
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap(),
            confirmed: true,
            credit_days: 15,
        };

        let invoice = PartyLedgerService::add_invoice_entry(&mut ledger, &doc, dec!(1180), Utc::now())
            .unwrap();
        assert_eq!(invoice.description, "Invoice SO-42");
        assert_eq!(invoice.reference_id.as_deref(), Some("42"));
        assert_eq!(invoice.balance_after, dec!(1180));

        let payment = PartyLedgerService::add_payment_entry(
            &mut ledger,
            dec!(500),
            &PaymentDetails::method("cash"),
            today(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(payment.description, "Payment received (cash)");
        assert_eq!(payment.credit, dec!(500));
        assert_eq!(payment.balance_after, dec!(680));
        assert_eq!(ledger.current_balance, dec!(680));
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_adjustment_entries() {
        let mut ledger = customer(dec!(100));
        PartyLedgerService::add_adjustment_entry(
            &mut ledger,
            dec!(40),
            false,
            "rounding write-off",
            None,
            today(),
            Utc::now(),
        )
        .unwrap();
        let entry = PartyLedgerService::add_adjustment_entry(
            &mut ledger,
            dec!(15),
            true,
            "late fee",
            Some("agreed by phone".into()),
            today(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(entry.kind, PartyEntryKind::Adjustment);
        assert_eq!(entry.debit, dec!(15));
        assert_eq!(ledger.current_balance, dec!(75));

        let blank = PartyLedgerService::add_adjustment_entry(
            &mut ledger,
            dec!(1),
            true,
            "  ",
            None,
            today(),
            Utc::now(),
        );
        assert!(matches!(blank, Err(PartyLedgerError::BlankField("reason"))));
    }

    #[test]
    fn test_suspended_ledger_rejects_entries() {
        let mut ledger = customer(Decimal::ZERO);
        PartyLedgerService::set_status(&mut ledger, PartyLedgerStatus::Suspended, Utc::now())
            .unwrap();
        let draft = EntryDraft::new(PartyEntryKind::Adjustment, today(), "x");
        let result = PartyLedgerService::add_debit(&mut ledger, dec!(10), draft, Utc::now());
        assert!(matches!(result, Err(PartyLedgerError::Suspended(_))));
        assert_eq!(ledger.total_debits, Decimal::ZERO);

        let err = PartyLedgerService::set_status(&mut ledger, PartyLedgerStatus::Inactive, Utc::now())
            .unwrap_err();
        assert!(matches!(err, PartyLedgerError::InvalidStatusTransition { .. }));
        PartyLedgerService::set_status(&mut ledger, PartyLedgerStatus::Active, Utc::now()).unwrap();
    }

    #[test]
    fn test_dashboard_counts_positive_balances() {
        let mut owing = customer(Decimal::ZERO);
        let draft = EntryDraft::new(PartyEntryKind::Invoice, today(), "Invoice 1");
        PartyLedgerService::add_debit(&mut owing, dec!(900), draft, Utc::now()).unwrap();
        let in_credit = customer(dec!(-50));
        let settled = customer(Decimal::ZERO);

        let ledgers = [owing, in_credit, settled];
        let dashboard = PartyLedgerService::dashboard(&ledgers, PartyKind::Customer);
        assert_eq!(dashboard.total_outstanding, dec!(900));
        assert_eq!(dashboard.parties_with_balance, 1);
        assert_eq!(dashboard.total_parties, 3);

        let suppliers = PartyLedgerService::dashboard(&ledgers, PartyKind::Supplier);
        assert_eq!(suppliers, PartyDashboard::default());
    }
}
