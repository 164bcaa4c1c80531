//! # salepos-core: Pure Business Logic for the Sale POS Amounts Extension
//!
//! This crate holds every rule the extension adds to the host sale model,
//! written as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Sale POS Amounts Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Host framework (ORM, reports)                   │   │
//! │  │    on_change_lines ──► get_amount ──► store_cache ──► ticket    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ SaleContext / ReportRenderer           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    salepos-host                                 │   │
//! │  │    Sale model entry points, TicketReport hook                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ salepos-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  amounts  │  │    tax    │  │  access   │  │   │
//! │  │   │   Order   │  │ buckets   │  │ TaxEngine │  │ readonly  │  │   │
//! │  │   │   Line    │  │ caches    │  │ rounding  │  │ rules     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Host records this extension reads (Order, OrderLine, Payment, ...)
//! - [`money`] - Currency rounding
//! - [`tax`] - Tax engine seam and per-document tax accumulation
//! - [`amounts`] - Untaxed/tax/total amounts and the 0%/12% subtotals
//! - [`access`] - Read-only and invisibility rules driven by invoice state
//! - [`ticket`] - Company-local timestamps for the printed ticket
//! - [`config`] - Account configuration record
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use salepos_core::amounts::{compute_line_changes, AmountEnv, LineChanges};
//! use salepos_core::tax::PercentageTaxEngine;
//! use salepos_core::{AccountConfiguration, OrderLine, Tax};
//!
//! let iva_12 = Tax::new("iva-12", "IVA 12%", Decimal::new(12, 2));
//! let line = OrderLine::product("l1", "Coffee", Decimal::new(100, 0), Decimal::ONE, vec![iva_12]);
//!
//! let engine = PercentageTaxEngine;
//! let config = AccountConfiguration::default();
//! let env = AmountEnv::new(&engine, &config);
//!
//! let amounts = compute_line_changes(&env, &LineChanges::new(&[line])).unwrap();
//! assert_eq!(amounts.subtotal_12, Decimal::new(100, 0));
//! assert_eq!(amounts.total_amount, Decimal::new(112, 0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod amounts;
pub mod config;
pub mod error;
pub mod money;
pub mod tax;
pub mod ticket;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use amounts::{AmountField, AmountsByField, OrderAmounts};
pub use config::{AccountConfiguration, TaxRounding};
pub use error::{CoreError, CoreResult};
pub use money::Currency;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Order states whose cached amounts are trusted.
///
/// Once an order is confirmed its lines no longer change, so the amounts
/// written by `store_cache` stay valid for the rest of its life.
pub const CACHED_STATES: [OrderState; 4] = [
    OrderState::Confirmed,
    OrderState::Processing,
    OrderState::Done,
    OrderState::Cancel,
];

/// Nominal tax percentage collected into `subtotal_0`.
pub const ZERO_RATE_PERCENT: i64 = 0;

/// Nominal tax percentage collected into `subtotal_12`.
pub const TWELVE_RATE_PERCENT: i64 = 12;
