//! Tax regime selection and per-line computation.

use rust_decimal::Decimal;

use bahi_shared::types::round_currency;

use super::error::TaxError;
use super::types::{LineTax, TaxBreakdown, TaxLine, TaxRates, TaxType, TaxableProduct};
use crate::party::PartyAddress;

/// Tax engine bound to the business's home state.
#[derive(Debug, Clone)]
pub struct TaxEngine {
    business_state: String,
}

impl TaxEngine {
    /// Creates an engine for a business registered in `business_state`.
    pub fn new(business_state: impl Into<String>) -> Result<Self, TaxError> {
        let business_state = business_state.into().trim().to_string();
        if business_state.is_empty() {
            return Err(TaxError::MissingBusinessState);
        }
        Ok(Self { business_state })
    }

    /// The configured home state.
    #[must_use]
    pub fn business_state(&self) -> &str {
        &self.business_state
    }

    /// Picks the regime for a buyer.
    ///
    /// Comparison is trimmed and case-insensitive. A missing or blank state
    /// yields [`TaxType::Unknown`].
    #[must_use]
    pub fn determine_tax_type(&self, buyer_state: Option<&str>) -> TaxType {
        match buyer_state.map(str::trim).filter(|s| !s.is_empty()) {
            None => TaxType::Unknown,
            Some(state) if state.eq_ignore_ascii_case(&self.business_state) => TaxType::CgstSgst,
            Some(_) => TaxType::Igst,
        }
    }

    /// State recorded on a party's address, trimmed.
    #[must_use]
    pub fn infer_state(address: &PartyAddress) -> Option<&str> {
        address
            .state
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Computes tax for one line.
    ///
    /// Each component is rounded on its own. [`TaxType::Unknown`] is charged
    /// as intra-state.
    pub fn calculate_tax_for_line(
        product: &impl TaxableProduct,
        line_total: Decimal,
        tax_type: TaxType,
    ) -> Result<LineTax, TaxError> {
        if line_total < Decimal::ZERO {
            return Err(TaxError::NegativeLineTotal(line_total));
        }
        let rates = product.tax_rates();
        Self::check_rates(&rates)?;

        let hundred = Decimal::ONE_HUNDRED;
        Ok(match tax_type {
            TaxType::Igst => LineTax {
                igst: round_currency(line_total * rates.igst / hundred),
                ..LineTax::default()
            },
            TaxType::CgstSgst | TaxType::Unknown => LineTax {
                cgst: round_currency(line_total * rates.cgst / hundred),
                sgst: round_currency(line_total * rates.sgst / hundred),
                ..LineTax::default()
            },
        })
    }

    /// Aggregates tax across all lines for a buyer.
    pub fn calculate_tax(
        &self,
        lines: &[TaxLine],
        buyer_state: Option<&str>,
    ) -> Result<TaxBreakdown, TaxError> {
        let tax_type = self.determine_tax_type(buyer_state);

        let mut taxable_amount = Decimal::ZERO;
        let mut totals = LineTax::default();
        for line in lines {
            let tax = Self::calculate_tax_for_line(&line.rates, line.line_total, tax_type)?;
            taxable_amount += line.line_total;
            totals.cgst += tax.cgst;
            totals.sgst += tax.sgst;
            totals.igst += tax.igst;
        }

        let rate = |pick: fn(&TaxRates) -> Decimal, amount: Decimal| {
            Self::reported_rate(lines, pick, amount, taxable_amount)
        };
        let (cgst_rate, sgst_rate, igst_rate) = if tax_type.is_inter_state() {
            (Decimal::ZERO, Decimal::ZERO, rate(|r| r.igst, totals.igst))
        } else {
            (
                rate(|r| r.cgst, totals.cgst),
                rate(|r| r.sgst, totals.sgst),
                Decimal::ZERO,
            )
        };

        Ok(TaxBreakdown {
            tax_type,
            taxable_amount,
            cgst_amount: totals.cgst,
            cgst_rate,
            sgst_amount: totals.sgst,
            sgst_rate,
            igst_amount: totals.igst,
            igst_rate,
            total_tax: totals.total(),
        })
    }

    /// Common rate when every line agrees, otherwise the effective rate.
    fn reported_rate(
        lines: &[TaxLine],
        pick: fn(&TaxRates) -> Decimal,
        amount: Decimal,
        taxable: Decimal,
    ) -> Decimal {
        let mut rates = lines.iter().map(|l| pick(&l.rates));
        let Some(first) = rates.next() else {
            return Decimal::ZERO;
        };
        if rates.all(|r| r == first) {
            first
        } else if taxable.is_zero() {
            Decimal::ZERO
        } else {
            round_currency(amount * Decimal::ONE_HUNDRED / taxable)
        }
    }

    fn check_rates(rates: &TaxRates) -> Result<(), TaxError> {
        for rate in [rates.cgst, rates.sgst, rates.igst] {
            if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
                return Err(TaxError::InvalidRate(rate));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn engine() -> TaxEngine {
        TaxEngine::new("Rajasthan").unwrap()
    }

    #[rstest]
    #[case(Some("Rajasthan"), TaxType::CgstSgst)]
    #[case(Some("  rajasthan "), TaxType::CgstSgst)]
    #[case(Some("RAJASTHAN"), TaxType::CgstSgst)]
    #[case(Some("Maharashtra"), TaxType::Igst)]
    #[case(Some("   "), TaxType::Unknown)]
    #[case(Some(""), TaxType::Unknown)]
    #[case(None, TaxType::Unknown)]
    fn test_determine_tax_type(#[case] state: Option<&str>, #[case] expected: TaxType) {
        assert_eq!(engine().determine_tax_type(state), expected);
    }

    #[test]
    fn test_split_line() {
        let tax =
            TaxEngine::calculate_tax_for_line(&TaxRates::standard(), dec!(1000.00), TaxType::CgstSgst)
                .unwrap();
        assert_eq!(tax.cgst, dec!(90.00));
        assert_eq!(tax.sgst, dec!(90.00));
        assert_eq!(tax.igst, Decimal::ZERO);
        assert_eq!(tax.total(), dec!(180.00));
    }

    #[test]
    fn test_integrated_line_matches_split_total() {
        let rates = TaxRates::standard();
        let igst = TaxEngine::calculate_tax_for_line(&rates, dec!(1000.00), TaxType::Igst).unwrap();
        let split =
            TaxEngine::calculate_tax_for_line(&rates, dec!(1000.00), TaxType::CgstSgst).unwrap();
        assert_eq!(igst.igst, dec!(180.00));
        assert_eq!(igst.total(), split.total());
    }

    #[test]
    fn test_rounding_per_component() {
        // 0.25 * 2.5% = 0.00625 per component
        let rates = TaxRates::split(dec!(2.5), dec!(2.5));
        let tax = TaxEngine::calculate_tax_for_line(&rates, dec!(0.25), TaxType::CgstSgst).unwrap();
        assert_eq!(tax.cgst, dec!(0.01));
        assert_eq!(tax.sgst, dec!(0.01));
        assert_eq!(tax.total(), dec!(0.02));

        // 10.10 * 5% = 0.505 rounds half-up
        let igst = TaxEngine::calculate_tax_for_line(&TaxRates::split(dec!(2.5), dec!(2.5)), dec!(10.10), TaxType::Igst)
            .unwrap();
        assert_eq!(igst.igst, dec!(0.51));
    }

    #[test]
    fn test_calculate_tax_aggregates_lines() {
        let lines = vec![
            TaxLine::new("Shirt", dec!(1000.00), TaxRates::standard()),
            TaxLine::new("Saree", dec!(500.00), TaxRates::standard()),
        ];
        let local = engine().calculate_tax(&lines, Some("Rajasthan")).unwrap();
        assert!(local.is_intra_state());
        assert_eq!(local.cgst_amount, dec!(135.00));
        assert_eq!(local.sgst_amount, dec!(135.00));
        assert_eq!(local.cgst_rate, dec!(9));
        assert_eq!(local.total_tax, dec!(270.00));
        assert_eq!(local.grand_total(), dec!(1770.00));

        let outside = engine().calculate_tax(&lines, Some("Maharashtra")).unwrap();
        assert!(outside.is_inter_state());
        assert_eq!(outside.regime_label(), "IGST (Inter-State)");
        assert_eq!(outside.igst_amount, dec!(270.00));
        assert_eq!(outside.igst_rate, dec!(18));
        assert_eq!(outside.cgst_amount, Decimal::ZERO);
    }

    #[test]
    fn test_unknown_state_charges_split() {
        let lines = vec![TaxLine::new("Shirt", dec!(1000.00), TaxRates::standard())];
        let breakdown = engine().calculate_tax(&lines, None).unwrap();
        assert_eq!(breakdown.tax_type, TaxType::Unknown);
        assert!(!breakdown.is_intra_state());
        assert!(!breakdown.is_inter_state());
        assert_eq!(breakdown.cgst_amount, dec!(90.00));
        assert_eq!(breakdown.total_tax, dec!(180.00));
    }

    #[test]
    fn test_mixed_rates_report_effective_rate() {
        let lines = vec![
            TaxLine::new("Shirt", dec!(1000.00), TaxRates::standard()),
            TaxLine::new("Rice", dec!(1000.00), TaxRates::split(dec!(2.5), dec!(2.5))),
        ];
        let breakdown = engine().calculate_tax(&lines, Some("Rajasthan")).unwrap();
        assert_eq!(breakdown.cgst_amount, dec!(115.00));
        assert_eq!(breakdown.cgst_rate, dec!(5.75));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            TaxEngine::calculate_tax_for_line(&TaxRates::standard(), dec!(-1), TaxType::Igst),
            Err(TaxError::NegativeLineTotal(_))
        ));
        assert!(matches!(
            TaxEngine::calculate_tax_for_line(&TaxRates::split(dec!(-1), dec!(9)), dec!(1), TaxType::Igst),
            Err(TaxError::InvalidRate(_))
        ));
        assert!(matches!(TaxEngine::new("  "), Err(TaxError::MissingBusinessState)));
    }

    #[test]
    fn test_infer_state_from_address() {
        let address = PartyAddress {
            state: Some(" Gujarat ".into()),
            ..PartyAddress::default()
        };
        assert_eq!(TaxEngine::infer_state(&address), Some("Gujarat"));
        assert_eq!(TaxEngine::infer_state(&PartyAddress::default()), None);
    }
}
