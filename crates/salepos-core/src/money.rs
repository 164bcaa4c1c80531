//! # Money Module
//!
//! Provides the `Currency` record and its rounding rule.
//!
//! ## Why Decimal and Not Cents?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AMOUNTS COME FROM THE HOST                                             │
//! │                                                                         │
//! │  Line amounts, tax rates and caches are host decimals with the          │
//! │  currency's own precision (2 digits for USD, 0 for CLP, ...).          │
//! │                                                                         │
//! │  An order without a currency keeps its amounts UNROUNDED, so a fixed   │
//! │  cents representation cannot express it.                               │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal everywhere, rounded explicitly    │
//! │    Currency::round(12.345) with rounding 0.01 → 12.34 (half to even)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use salepos_core::money::Currency;
//!
//! let usd = Currency::new("USD", 2);
//! assert_eq!(usd.round(Decimal::new(12345, 3)), Decimal::new(1234, 2));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Currency Type
// =============================================================================

/// A currency as configured in the host.
///
/// ## Fields
/// - `digits`: display precision, used for formatting
/// - `rounding`: smallest representable step (0.01 for USD, 0.05 for CHF cash)
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Currency Rounding Is Used                      │
/// │                                                                         │
/// │  on_change_lines ──► untaxed, tax, total rounded for the editing UI     │
/// │                                                                         │
/// │  tax accumulation ──► per line or per document (TaxRounding)            │
/// │                                                                         │
/// │  No currency on the order ──► amounts stay unrounded                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Currency {
    /// ISO 4217 code.
    pub code: String,

    /// Number of decimal places shown.
    pub digits: u32,

    /// Rounding step.
    #[ts(as = "String")]
    pub rounding: Decimal,
}

impl Currency {
    /// Creates a currency whose rounding step matches its display digits.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use salepos_core::money::Currency;
    ///
    /// let usd = Currency::new("USD", 2);
    /// assert_eq!(usd.rounding, Decimal::new(1, 2));
    /// ```
    pub fn new(code: impl Into<String>, digits: u32) -> Self {
        Currency {
            code: code.into(),
            digits,
            rounding: Decimal::new(1, digits),
        }
    }

    /// Creates a currency with a rounding step coarser than its digits.
    pub fn with_rounding(code: impl Into<String>, digits: u32, rounding: Decimal) -> Self {
        Currency {
            code: code.into(),
            digits,
            rounding,
        }
    }

    /// Rounds an amount to the currency's rounding step.
    ///
    /// Uses round half to even, the host's rounding for monetary amounts,
    /// so `0.125` becomes `0.12` and `0.135` becomes `0.14`.
    ///
    /// A zero rounding step leaves the amount untouched.
    pub fn round(&self, amount: Decimal) -> Decimal {
        if self.rounding.is_zero() {
            return amount;
        }
        let steps = (amount / self.rounding)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
        (steps * self.rounding).round_dp(self.digits.max(self.rounding.scale()))
    }

    /// Checks whether an amount rounds to zero in this currency.
    pub fn is_zero(&self, amount: Decimal) -> bool {
        self.round(amount).is_zero()
    }
}

/// Display shows the code, for log lines.
impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// Rounds `amount` when a currency is present, otherwise returns it unchanged.
#[inline]
pub fn round_opt(currency: Option<&Currency>, amount: Decimal) -> Decimal {
    match currency {
        Some(currency) => currency.round(amount),
        None => amount,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
