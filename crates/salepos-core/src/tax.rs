//! # Tax Module
//!
//! The seam to the host's tax engine, the nominal-rate rule behind the
//! 0%/12% subtotals, and the accumulator that merges per-line tax results
//! into document totals.
//!
//! ## Tax Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For every product line                                                 │
//! │                                                                         │
//! │  taxes, unit_price, quantity ──► TaxEngine::compute ──► Vec<TaxLine>   │
//! │                                                        │                │
//! │                                                        ▼                │
//! │                                  TaxAccumulator (merge by TaxKey)       │
//! │                                  TaxRounding::Line → round every line   │
//! │                                                                         │
//! │  After the last line                                                    │
//! │    TaxRounding::Document → round once ──► sum = tax_amount             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::TaxRounding;
use crate::error::CoreResult;
use crate::money::Currency;
use crate::types::Tax;
use crate::{TWELVE_RATE_PERCENT, ZERO_RATE_PERCENT};

// =============================================================================
// Tax Engine Seam
// =============================================================================

/// Context the host tax engine evaluates rules against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxContext {
    /// Customer of the order, for customer-specific tax rules.
    pub customer: Option<String>,
}

impl TaxContext {
    pub fn for_customer(customer: Option<&str>) -> Self {
        TaxContext {
            customer: customer.map(str::to_string),
        }
    }
}

/// Grouping key of a computed tax. Tax lines with equal keys are summed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaxKey(pub String);

/// One computed tax amount for one order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxLine {
    pub key: TaxKey,
    pub base: Decimal,
    pub amount: Decimal,
}

/// The host's tax computation engine.
pub trait TaxEngine {
    /// Computes the taxes of `quantity` units at `unit_price`.
    fn compute(
        &self,
        context: &TaxContext,
        taxes: &[Tax],
        unit_price: Decimal,
        quantity: Decimal,
    ) -> CoreResult<Vec<TaxLine>>;
}

/// Plain percentage taxes: `amount = unit_price × quantity × rate`.
///
/// Each tax is keyed by its id, so repeated taxes across lines merge.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentageTaxEngine;

impl TaxEngine for PercentageTaxEngine {
    fn compute(
        &self,
        _context: &TaxContext,
        taxes: &[Tax],
        unit_price: Decimal,
        quantity: Decimal,
    ) -> CoreResult<Vec<TaxLine>> {
        let base = unit_price * quantity;
        Ok(taxes
            .iter()
            .map(|tax| TaxLine {
                key: TaxKey(tax.id.clone()),
                base,
                amount: base * tax.rate,
            })
            .collect())
    }
}

// =============================================================================
// Rate Buckets
// =============================================================================

/// A tax's rate as a whole percentage, rounded half to even.
///
/// `0.12` → 12, `0.125` → 12, `0.135` → 14, `0.004` → 0.
pub fn nominal_percentage(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

/// The two subtotal buckets a tax can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateBucket {
    Zero,
    Twelve,
}

impl RateBucket {
    /// Bucket for a tax, or `None` when its nominal rate is neither 0% nor 12%.
    pub fn for_tax(tax: &Tax) -> Option<RateBucket> {
        let percent = nominal_percentage(tax.rate);
        if percent == Decimal::from(TWELVE_RATE_PERCENT) {
            Some(RateBucket::Twelve)
        } else if percent == Decimal::from(ZERO_RATE_PERCENT) {
            Some(RateBucket::Zero)
        } else {
            None
        }
    }
}

// =============================================================================
// Tax Accumulator
// =============================================================================

/// Merges tax lines of a document and applies the configured rounding.
#[derive(Debug)]
pub struct TaxAccumulator<'a> {
    currency: Option<&'a Currency>,
    rounding: TaxRounding,
    taxes: BTreeMap<TaxKey, Decimal>,
}

impl<'a> TaxAccumulator<'a> {
    pub fn new(currency: Option<&'a Currency>, rounding: TaxRounding) -> Self {
        TaxAccumulator {
            currency,
            rounding,
            taxes: BTreeMap::new(),
        }
    }

    /// Adds the tax lines of one order line.
    pub fn add_line(&mut self, lines: Vec<TaxLine>) {
        for line in lines {
            *self.taxes.entry(line.key).or_insert(Decimal::ZERO) += line.amount;
        }
        if self.rounding == TaxRounding::Line {
            self.round_taxes();
        }
    }

    /// Current merged amount for a key.
    pub fn amount(&self, key: &TaxKey) -> Option<Decimal> {
        self.taxes.get(key).copied()
    }

    /// Applies document rounding and returns the total tax amount.
    pub fn finish(mut self) -> Decimal {
        if self.rounding == TaxRounding::Document {
            self.round_taxes();
        }
        self.taxes.values().copied().sum()
    }

    fn round_taxes(&mut self) {
        if let Some(currency) = self.currency {
            for value in self.taxes.values_mut() {
                *value = currency.round(*value);
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tax(id: &str, rate: Decimal) -> Tax {
        Tax::new(id, id, rate)
    }

    #[test]
    fn test_nominal_percentage() {
        assert_eq!(nominal_percentage(dec!(0.12)), dec!(12));
        assert_eq!(nominal_percentage(dec!(0.125)), dec!(12));
        assert_eq!(nominal_percentage(dec!(0.135)), dec!(14));
        assert_eq!(nominal_percentage(dec!(0.1249)), dec!(12));
        assert_eq!(nominal_percentage(dec!(0.004)), dec!(0));
        assert_eq!(nominal_percentage(dec!(0.08)), dec!(8));
    }

    #[test]
    fn test_rate_bucket() {
        assert_eq!(RateBucket::for_tax(&tax("a", dec!(0.12))), Some(RateBucket::Twelve));
        assert_eq!(RateBucket::for_tax(&tax("b", dec!(0))), Some(RateBucket::Zero));
        assert_eq!(RateBucket::for_tax(&tax("c", dec!(0.08))), None);
        assert_eq!(RateBucket::for_tax(&tax("d", dec!(0.14))), None);
    }

    #[test]
    fn test_percentage_engine() {
        let lines = PercentageTaxEngine
            .compute(
                &TaxContext::default(),
                &[tax("iva", dec!(0.12)), tax("ice", dec!(0.15))],
                dec!(10),
                dec!(2),
            )
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].key, TaxKey("iva".to_string()));
        assert_eq!(lines[0].base, dec!(20));
        assert_eq!(lines[0].amount, dec!(2.40));
        assert_eq!(lines[1].amount, dec!(3.00));
    }

    #[test]
    fn test_accumulator_merges_same_key() {
        let mut acc = TaxAccumulator::new(None, TaxRounding::Document);
        let key = TaxKey("iva".to_string());
        acc.add_line(vec![TaxLine { key: key.clone(), base: dec!(1), amount: dec!(0.12) }]);
        acc.add_line(vec![TaxLine { key: key.clone(), base: dec!(1), amount: dec!(0.12) }]);

        assert_eq!(acc.amount(&key), Some(dec!(0.24)));
        assert_eq!(acc.finish(), dec!(0.24));
    }

    #[test]
    fn test_line_rounding_differs_from_document_rounding() {
        let usd = Currency::new("USD", 2);
        let key = TaxKey("iva".to_string());
        let third = || vec![TaxLine { key: key.clone(), base: dec!(0.0278), amount: dec!(0.00334) }];

        // Three lines of 0.00334 tax each.
        let mut per_line = TaxAccumulator::new(Some(&usd), TaxRounding::Line);
        let mut per_doc = TaxAccumulator::new(Some(&usd), TaxRounding::Document);
        for _ in 0..3 {
            per_line.add_line(third());
            per_doc.add_line(third());
        }

        // Per line: 0.00334 → 0.00, repeated: stays 0.00.
        assert_eq!(per_line.finish(), dec!(0.00));
        // Per document: 0.01002 → 0.01.
        assert_eq!(per_doc.finish(), dec!(0.01));
    }

    #[test]
    fn test_accumulator_without_currency_keeps_precision() {
        let mut acc = TaxAccumulator::new(None, TaxRounding::Line);
        acc.add_line(vec![TaxLine {
            key: TaxKey("iva".to_string()),
            base: dec!(1.111),
            amount: dec!(0.13332),
        }]);
        assert_eq!(acc.finish(), dec!(0.13332));
    }
}
