//! Inclusive calendar date windows.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included.
    pub start: NaiveDate,
    /// Last day included.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a window, returning `None` when `start` is after `end`.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Returns true if `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Monday through Sunday of the ISO week containing `date`.
    #[must_use]
    pub fn week_of(date: NaiveDate) -> Self {
        let from_monday = u64::from(date.weekday().num_days_from_monday());
        let start = date.checked_sub_days(Days::new(from_monday)).unwrap_or(NaiveDate::MIN);
        Self {
            start,
            end: start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX),
        }
    }

    /// First through last day of the calendar month containing `date`.
    #[must_use]
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Self { start, end }
    }

    /// `date` through `date + days`, clamped to the last representable date.
    #[must_use]
    pub fn next_days(date: NaiveDate, days: u32) -> Self {
        Self {
            start: date,
            end: date
                .checked_add_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_reversed_window_is_rejected() {
        assert!(DateRange::new(d(2026, 2, 1), d(2026, 1, 1)).is_none());
        assert!(DateRange::new(d(2026, 1, 1), d(2026, 1, 1)).is_some());
    }

    #[rstest]
    #[case(d(2026, 10, 19), d(2026, 10, 19), d(2026, 10, 25))]
    #[case(d(2026, 10, 25), d(2026, 10, 19), d(2026, 10, 25))]
    #[case(d(2026, 1, 1), d(2025, 12, 29), d(2026, 1, 4))]
    fn test_week_of(#[case] date: NaiveDate, #[case] start: NaiveDate, #[case] end: NaiveDate) {
        let week = DateRange::week_of(date);
        assert_eq!(week.start, start);
        assert_eq!(week.end, end);
    }

    #[rstest]
    #[case(d(2026, 2, 14), d(2026, 2, 1), d(2026, 2, 28))]
    #[case(d(2028, 2, 29), d(2028, 2, 1), d(2028, 2, 29))]
    #[case(d(2026, 12, 31), d(2026, 12, 1), d(2026, 12, 31))]
    fn test_month_of(#[case] date: NaiveDate, #[case] start: NaiveDate, #[case] end: NaiveDate) {
        let month = DateRange::month_of(date);
        assert_eq!(month.start, start);
        assert_eq!(month.end, end);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = DateRange::next_days(d(2026, 3, 1), 7);
        assert!(range.contains(d(2026, 3, 1)));
        assert!(range.contains(d(2026, 3, 8)));
        assert!(!range.contains(d(2026, 3, 9)));
    }

    #[test]
    fn test_next_days_clamps_at_max_date() {
        let range = DateRange::next_days(d(2026, 10, 19), u32::MAX);
        assert_eq!(range.start, d(2026, 10, 19));
        assert_eq!(range.end, NaiveDate::MAX);
        assert!(range.contains(d(9999, 12, 31)));
    }
}
