//! Outstanding queries and aggregates.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bahi_shared::types::DateRange;

use super::types::{Direction, Outstanding, OutstandingStatus, OutstandingType};

/// Filter for searching outstanding items. Unset fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutstandingFilter {
    /// Restrict to one type.
    pub outstanding_type: Option<OutstandingType>,
    /// Restrict to one status.
    pub status: Option<OutstandingStatus>,
    /// Restrict to one side of the books.
    pub direction: Option<Direction>,
    /// Restrict to one party.
    pub party_key: Option<String>,
    /// Due date window.
    pub due: Option<DateRange>,
    /// Minimum remaining amount.
    pub min_amount: Option<Decimal>,
    /// Maximum remaining amount.
    pub max_amount: Option<Decimal>,
    /// Case-insensitive text matched against party name, contact, reference
    /// number and notes.
    pub search: Option<String>,
    /// Only non-terminal items past their due date.
    pub overdue_only: bool,
}

impl OutstandingFilter {
    /// Items of one type.
    #[must_use]
    pub fn by_type(outstanding_type: OutstandingType) -> Self {
        Self {
            outstanding_type: Some(outstanding_type),
            ..Self::default()
        }
    }

    /// Items in one status.
    #[must_use]
    pub fn by_status(status: OutstandingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Non-terminal items past their due date.
    #[must_use]
    pub fn overdue() -> Self {
        Self {
            overdue_only: true,
            ..Self::default()
        }
    }

    /// Items due from `today` through `today + days`.
    #[must_use]
    pub fn due_within(today: NaiveDate, days: u32) -> Self {
        Self::due_in(DateRange::next_days(today, days))
    }

    /// Items due in the ISO week containing `today`.
    #[must_use]
    pub fn due_this_week(today: NaiveDate) -> Self {
        Self::due_in(DateRange::week_of(today))
    }

    /// Items due in the calendar month containing `today`.
    #[must_use]
    pub fn due_this_month(today: NaiveDate) -> Self {
        Self::due_in(DateRange::month_of(today))
    }

    /// Items whose remaining amount lies in `[min, max]`.
    #[must_use]
    pub fn amount_between(min: Decimal, max: Decimal) -> Self {
        Self {
            min_amount: Some(min),
            max_amount: Some(max),
            ..Self::default()
        }
    }

    /// Free-text search.
    #[must_use]
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    fn due_in(range: DateRange) -> Self {
        Self {
            due: Some(range),
            ..Self::default()
        }
    }

    /// Returns the trimmed lowercase search text, if any.
    #[must_use]
    pub fn search_text(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Returns true if `item` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, item: &Outstanding) -> bool {
        if self.outstanding_type.is_some_and(|t| t != item.outstanding_type)
            || self.status.is_some_and(|s| s != item.status)
            || self.direction.is_some_and(|d| d != item.direction)
            || self.due.is_some_and(|r| !r.contains(item.due_date))
            || self.min_amount.is_some_and(|m| item.amount < m)
            || self.max_amount.is_some_and(|m| item.amount > m)
        {
            return false;
        }
        if self
            .party_key
            .as_deref()
            .is_some_and(|key| key != item.party_key)
        {
            return false;
        }
        if self.overdue_only && (item.status.is_terminal() || item.days_overdue <= 0) {
            return false;
        }
        match self.search_text() {
            Some(text) => [
                Some(item.party_name.as_str()),
                item.party_contact.as_deref(),
                Some(item.reference_number.as_str()),
                item.notes.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&text)),
            None => true,
        }
    }

    /// Applies the filter, ordering results by due date then creation time.
    #[must_use]
    pub fn apply<'a>(&self, items: &'a [Outstanding]) -> Vec<&'a Outstanding> {
        let mut found: Vec<&Outstanding> = items.iter().filter(|i| self.matches(i)).collect();
        found.sort_by(|a, b| {
            a.due_date
                .cmp(&b.due_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        found
    }
}

/// Aggregate view over outstanding items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingSummary {
    /// Remaining amount on non-terminal receivables.
    pub total_receivable: Decimal,
    /// Remaining amount on non-terminal payables.
    pub total_payable: Decimal,
    /// Portion of `total_receivable` past due.
    pub overdue_receivable: Decimal,
    /// Portion of `total_payable` past due.
    pub overdue_payable: Decimal,
    /// Number of items per status.
    pub status_counts: BTreeMap<OutstandingStatus, u64>,
}

impl OutstandingSummary {
    /// Builds the summary from a set of items.
    #[must_use]
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a Outstanding>) -> Self {
        let mut summary = Self::default();
        for item in items {
            *summary.status_counts.entry(item.status).or_insert(0) += 1;
            if item.status.is_terminal() {
                continue;
            }
            let overdue = item.days_overdue > 0;
            match item.direction {
                Direction::Receivable => {
                    summary.total_receivable += item.amount;
                    if overdue {
                        summary.overdue_receivable += item.amount;
                    }
                }
                Direction::Payable => {
                    summary.total_payable += item.amount;
                    if overdue {
                        summary.overdue_payable += item.amount;
                    }
                }
            }
        }
        summary
    }

    /// Number of items in `status`.
    #[must_use]
    pub fn count(&self, status: OutstandingStatus) -> u64 {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }
}
