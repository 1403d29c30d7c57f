//! Tax domain types.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tax regime for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxType {
    /// Intra-state: central plus state component.
    CgstSgst,
    /// Inter-state: single integrated component.
    Igst,
    /// Buyer state not known.
    Unknown,
}

impl TaxType {
    /// Returns the string representation of the regime.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CgstSgst => "CGST_SGST",
            Self::Igst => "IGST",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Human-readable label for invoices.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::CgstSgst => "CGST + SGST (Intra-State)",
            Self::Igst => "IGST (Inter-State)",
            Self::Unknown => "Tax regime unknown",
        }
    }

    /// Returns true for the split regime.
    #[must_use]
    pub fn is_intra_state(&self) -> bool {
        matches!(self, Self::CgstSgst)
    }

    /// Returns true for the integrated regime.
    #[must_use]
    pub fn is_inter_state(&self) -> bool {
        matches!(self, Self::Igst)
    }
}

impl fmt::Display for TaxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Percent rates configured on a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRates {
    /// Central rate, percent.
    pub cgst: Decimal,
    /// State rate, percent.
    pub sgst: Decimal,
    /// Integrated rate, percent.
    pub igst: Decimal,
}

impl TaxRates {
    /// Rates with IGST equal to CGST + SGST.
    #[must_use]
    pub fn split(cgst: Decimal, sgst: Decimal) -> Self {
        Self {
            cgst,
            sgst,
            igst: cgst + sgst,
        }
    }

    /// The common 18% slab (9 + 9, or 18 integrated).
    #[must_use]
    pub fn standard() -> Self {
        Self::split(Decimal::from(9), Decimal::from(9))
    }

    /// No tax.
    #[must_use]
    pub fn exempt() -> Self {
        Self::split(Decimal::ZERO, Decimal::ZERO)
    }
}

impl Default for TaxRates {
    fn default() -> Self {
        Self::standard()
    }
}

/// Anything that carries tax rates.
pub trait TaxableProduct {
    /// Rates for this product.
    fn tax_rates(&self) -> TaxRates;
}

impl TaxableProduct for TaxRates {
    fn tax_rates(&self) -> TaxRates {
        *self
    }
}

/// One line of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxLine {
    /// Line description.
    pub description: String,
    /// Taxable value of the line.
    pub line_total: Decimal,
    /// Rates for the line's product.
    pub rates: TaxRates,
}

impl TaxLine {
    /// Creates a line.
    #[must_use]
    pub fn new(description: impl Into<String>, line_total: Decimal, rates: TaxRates) -> Self {
        Self {
            description: description.into(),
            line_total,
            rates,
        }
    }
}

/// Tax computed for one line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTax {
    /// Central component.
    pub cgst: Decimal,
    /// State component.
    pub sgst: Decimal,
    /// Integrated component.
    pub igst: Decimal,
}

impl LineTax {
    /// Sum of all components.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cgst + self.sgst + self.igst
    }
}

/// Tax aggregated across a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Regime requested for the buyer.
    pub tax_type: TaxType,
    /// Sum of line totals.
    pub taxable_amount: Decimal,
    /// Central component.
    pub cgst_amount: Decimal,
    /// Central rate; the common rate when all lines share it, otherwise the
    /// effective rate.
    pub cgst_rate: Decimal,
    /// State component.
    pub sgst_amount: Decimal,
    /// State rate.
    pub sgst_rate: Decimal,
    /// Integrated component.
    pub igst_amount: Decimal,
    /// Integrated rate.
    pub igst_rate: Decimal,
    /// Sum of all components.
    pub total_tax: Decimal,
}

impl TaxBreakdown {
    /// Human-readable regime label.
    #[must_use]
    pub fn regime_label(&self) -> &'static str {
        self.tax_type.label()
    }

    /// Returns true if CGST + SGST were charged.
    #[must_use]
    pub fn is_intra_state(&self) -> bool {
        self.tax_type.is_intra_state()
    }

    /// Returns true if IGST was charged.
    #[must_use]
    pub fn is_inter_state(&self) -> bool {
        self.tax_type.is_inter_state()
    }

    /// Taxable amount plus tax.
    #[must_use]
    pub fn grand_total(&self) -> Decimal {
        self.taxable_amount + self.total_tax
    }
}
