//! FIFO payment allocator.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use bahi_shared::types::{AdvanceCreditId, is_currency_scale};

use super::error::AllocationError;
use super::types::{AdvanceCredit, AdvanceDraw, AllocationOutcome, Application};
use crate::outstanding::{Direction, Outstanding, OutstandingService, PaymentDetails};

/// Payment method recorded on items paid from an advance.
pub const ADVANCE_METHOD: &str = "advance";

/// Allocates payments to outstanding items, oldest first.
pub struct PaymentAllocator;

impl PaymentAllocator {
    /// Applies `payment` to the party's open items on `direction`.
    ///
    /// Items belonging to other parties, the other direction, or outside
    /// PENDING/OVERDUE/PARTIALLY_PAID are skipped. Eligible items are visited
    /// by creation time (id breaks ties) and each receives
    /// `min(remaining payment, item amount)`. Allocation stops as soon as the
    /// payment is used up.
    pub fn allocate(
        items: &mut [Outstanding],
        party_key: &str,
        direction: Direction,
        payment: Decimal,
        details: &PaymentDetails,
        now: DateTime<Utc>,
    ) -> Result<AllocationOutcome, AllocationError> {
        if payment <= Decimal::ZERO || !is_currency_scale(payment) {
            return Err(AllocationError::InvalidPaymentAmount(payment));
        }
        if party_key.trim().is_empty() {
            return Err(AllocationError::BlankParty);
        }

        let mut order: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                item.party_key == party_key
                    && item.direction == direction
                    && item.status.is_open_for_payment()
                    && item.amount > Decimal::ZERO
            })
            .map(|(idx, _)| idx)
            .collect();
        order.sort_by(|&a, &b| {
            items[a]
                .created_at
                .cmp(&items[b].created_at)
                .then_with(|| items[a].id.cmp(&items[b].id))
        });

        let mut remaining = payment;
        let mut applications = Vec::new();

        for idx in order {
            if remaining <= Decimal::ZERO {
                break;
            }
            let item = &mut items[idx];
            let applied = remaining.min(item.amount);
            OutstandingService::record_payment(item, applied, details, now)?;
            remaining -= applied;
            applications.push(Application {
                outstanding_id: item.id,
                applied,
                remaining: item.amount,
                new_status: item.status,
            });
        }

        Ok(AllocationOutcome {
            payment_amount: payment,
            applications,
            leftover: remaining,
        })
    }

    /// Turns an outcome's leftover into an advance credit.
    #[must_use]
    pub fn advance_from(
        outcome: &AllocationOutcome,
        direction: Direction,
        party_key: &str,
        party_name: &str,
        source_reference: Option<String>,
        now: DateTime<Utc>,
    ) -> Option<AdvanceCredit> {
        outcome.has_leftover().then(|| AdvanceCredit {
            id: AdvanceCreditId::new(),
            direction,
            party_key: party_key.to_string(),
            party_name: party_name.to_string(),
            original_amount: outcome.leftover,
            remaining_amount: outcome.leftover,
            source_reference,
            created_at: now,
            updated_at: now,
        })
    }

    /// Draws the party's advances into a newly opened item, oldest advance
    /// first, until the item is settled or the advances run out.
    pub fn consume_advances(
        item: &mut Outstanding,
        advances: &mut [AdvanceCredit],
        now: DateTime<Utc>,
    ) -> Result<Vec<AdvanceDraw>, AllocationError> {
        let mut order: Vec<usize> = advances
            .iter()
            .enumerate()
            .filter(|(_, adv)| {
                adv.party_key == item.party_key
                    && adv.direction == item.direction
                    && !adv.is_exhausted()
            })
            .map(|(idx, _)| idx)
            .collect();
        order.sort_by(|&a, &b| {
            advances[a]
                .created_at
                .cmp(&advances[b].created_at)
                .then_with(|| advances[a].id.cmp(&advances[b].id))
        });

        let mut draws = Vec::new();
        for idx in order {
            if !item.status.is_open_for_payment() || item.amount <= Decimal::ZERO {
                break;
            }
            let advance = &mut advances[idx];
            let drawn = advance.remaining_amount.min(item.amount);
            let details = PaymentDetails {
                method: Some(ADVANCE_METHOD.to_string()),
                reference: advance.source_reference.clone(),
                notes: Some(format!("Applied from advance {}", advance.id)),
            };
            OutstandingService::record_payment(item, drawn, &details, now)?;
            advance.remaining_amount -= drawn;
            advance.updated_at = now;
            draws.push(AdvanceDraw {
                advance_id: advance.id,
                drawn,
                remaining: advance.remaining_amount,
            });
        }
        Ok(draws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outstanding::{NewOutstanding, OutstandingStatus, OutstandingType};
    use chrono::{Duration, NaiveDate, TimeZone};
    use rust_decimal_macros::dec;

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()
    }

    fn receivable(party: &str, amount: Decimal, created: DateTime<Utc>) -> Outstanding {
        OutstandingService::open(
            NewOutstanding {
                outstanding_type: OutstandingType::InvoiceReceivable,
                reference_type: "order".into(),
                reference_id: created.timestamp().to_string(),
                reference_number: format!("SO-{}", created.timestamp()),
                amount,
                due_date: today() + chrono::Days::new(30),
                party_name: party.into(),
                party_contact: None,
                notes: None,
            },
            today(),
            created,
        )
        .unwrap()
    }

    #[test]
    fn test_oldest_first_partial_fill() {
        // Stored newest first to prove ordering comes from created_at.
        let mut items = vec![
            receivable("meera", dec!(50), t(3)),
            receivable("meera", dec!(200), t(2)),
            receivable("meera", dec!(100), t(1)),
        ];

        let outcome = PaymentAllocator::allocate(
            &mut items,
            "meera",
            Direction::Receivable,
            dec!(150),
            &PaymentDetails::method("cash"),
            t(10),
        )
        .unwrap();

        assert_eq!(items[2].status, OutstandingStatus::Settled);
        assert_eq!(items[2].amount, Decimal::ZERO);
        assert_eq!(items[1].status, OutstandingStatus::PartiallyPaid);
        assert_eq!(items[1].amount, dec!(150));
        assert_eq!(items[0].status, OutstandingStatus::Pending);
        assert_eq!(items[0].amount, dec!(50));
        assert_eq!(items[0].payment_method, None);

        assert_eq!(outcome.leftover, Decimal::ZERO);
        assert_eq!(outcome.applications.len(), 2);
        assert_eq!(outcome.applications[0].applied, dec!(100));
        assert_eq!(outcome.applications[1].applied, dec!(50));
        assert_eq!(outcome.total_applied(), dec!(150));
    }

    #[test]
    fn test_excess_becomes_advance() {
        let mut items = vec![receivable("meera", dec!(100), t(1))];
        let outcome = PaymentAllocator::allocate(
            &mut items,
            "meera",
            Direction::Receivable,
            dec!(160),
            &PaymentDetails::default(),
            t(5),
        )
        .unwrap();
        assert_eq!(outcome.leftover, dec!(60));
        assert_eq!(items[0].status, OutstandingStatus::Settled);

        let advance = PaymentAllocator::advance_from(
            &outcome,
            Direction::Receivable,
            "meera",
            "Meera Stores",
            Some("RCT-1".into()),
            t(5),
        )
        .unwrap();
        assert_eq!(advance.remaining_amount, dec!(60));

        let mut advances = vec![advance];
        let mut next = receivable("meera", dec!(45), t(20));
        let draws = PaymentAllocator::consume_advances(&mut next, &mut advances, t(20)).unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].drawn, dec!(45));
        assert_eq!(next.status, OutstandingStatus::Settled);
        assert_eq!(next.payment_method.as_deref(), Some(ADVANCE_METHOD));
        assert_eq!(advances[0].remaining_amount, dec!(15));

        let mut later = receivable("meera", dec!(40), t(30));
        PaymentAllocator::consume_advances(&mut later, &mut advances, t(30)).unwrap();
        assert_eq!(later.status, OutstandingStatus::PartiallyPaid);
        assert_eq!(later.amount, dec!(25));
        assert!(advances[0].is_exhausted());
    }

    #[test]
    fn test_no_advance_without_leftover() {
        let mut items = vec![receivable("meera", dec!(100), t(1))];
        let outcome = PaymentAllocator::allocate(
            &mut items,
            "meera",
            Direction::Receivable,
            dec!(100),
            &PaymentDetails::default(),
            t(5),
        )
        .unwrap();
        assert!(
            PaymentAllocator::advance_from(&outcome, Direction::Receivable, "meera", "M", None, t(5))
                .is_none()
        );
    }

    #[test]
    fn test_other_parties_and_closed_items_untouched() {
        let mut items = vec![
            receivable("kapoor", dec!(100), t(1)),
            receivable("meera", dec!(100), t(2)),
            receivable("meera", dec!(100), t(3)),
        ];
        OutstandingService::dispute(&mut items[1], None, t(4)).unwrap();

        let outcome = PaymentAllocator::allocate(
            &mut items,
            "meera",
            Direction::Receivable,
            dec!(30),
            &PaymentDetails::default(),
            t(5),
        )
        .unwrap();
        assert_eq!(outcome.applications.len(), 1);
        assert_eq!(outcome.applications[0].outstanding_id, items[2].id);
        assert_eq!(items[0].amount, dec!(100));
        assert_eq!(items[1].amount, dec!(100));
    }

    #[test]
    fn test_direction_selects_item_set() {
        let mut items = vec![receivable("meera", dec!(100), t(1))];
        let outcome = PaymentAllocator::allocate(
            &mut items,
            "meera",
            Direction::Payable,
            dec!(40),
            &PaymentDetails::default(),
            t(5),
        )
        .unwrap();
        assert!(outcome.applications.is_empty());
        assert_eq!(outcome.leftover, dec!(40));
    }

    #[test]
    fn test_rejects_non_positive_payment() {
        let mut items = vec![receivable("meera", dec!(100), t(1))];
        for amount in [Decimal::ZERO, dec!(-5), dec!(1.005)] {
            let result = PaymentAllocator::allocate(
                &mut items,
                "meera",
                Direction::Receivable,
                amount,
                &PaymentDetails::default(),
                t(5),
            );
            assert!(matches!(result, Err(AllocationError::InvalidPaymentAmount(_))));
        }
    }
}
