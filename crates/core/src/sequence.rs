//! Document number formatting.
//!
//! Numbers look like `SAL-2026-000042`: a prefix, the calendar year and a
//! counter that restarts every year. The counter itself is issued by durable
//! storage; this module only formats and parses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width of the zero-padded counter.
pub const SEQUENCE_WIDTH: usize = 6;

/// Error parsing a document number.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid document number: {0}")]
pub struct InvalidDocumentNumber(pub String);

/// A formatted document number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentNumber {
    /// Upper-case prefix, e.g. `SAL`.
    pub prefix: String,
    /// Calendar year.
    pub year: i32,
    /// Counter within the prefix and year, starting at 1.
    pub sequence: i64,
}

impl DocumentNumber {
    /// Creates a number, upper-casing the prefix.
    #[must_use]
    pub fn new(prefix: &str, year: i32, sequence: i64) -> Self {
        Self {
            prefix: prefix.trim().to_uppercase(),
            year,
            sequence,
        }
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:0width$}",
            self.prefix,
            self.year,
            self.sequence,
            width = SEQUENCE_WIDTH
        )
    }
}

impl FromStr for DocumentNumber {
    type Err = InvalidDocumentNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidDocumentNumber(s.to_string());
        let mut parts = s.trim().rsplitn(3, '-');
        let sequence = parts.next().ok_or_else(invalid)?;
        let year = parts.next().ok_or_else(invalid)?;
        let prefix = parts.next().ok_or_else(invalid)?;
        if prefix.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            prefix: prefix.to_string(),
            year: year.parse().map_err(|_| invalid())?,
            sequence: sequence.parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sal", 2026, 42, "SAL-2026-000042")]
    #[case("PAY", 2025, 1, "PAY-2025-000001")]
    #[case("JRN", 2026, 1_234_567, "JRN-2026-1234567")]
    fn test_format(
        #[case] prefix: &str,
        #[case] year: i32,
        #[case] sequence: i64,
        #[case] expected: &str,
    ) {
        assert_eq!(DocumentNumber::new(prefix, year, sequence).to_string(), expected);
    }

    #[test]
    fn test_parse() {
        let number: DocumentNumber = "CRN-2026-000007".parse().unwrap();
        assert_eq!(number, DocumentNumber::new("CRN", 2026, 7));
        assert!("CRN-2026".parse::<DocumentNumber>().is_err());
        assert!("CRN-year-000007".parse::<DocumentNumber>().is_err());
        assert!("-2026-000007".parse::<DocumentNumber>().is_err());
    }
}
