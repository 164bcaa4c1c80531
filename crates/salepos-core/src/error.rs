//! # Error Types
//!
//! Domain-specific error types for salepos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  salepos-core errors (this file)                                       │
//! │  └── CoreError        - Rule evaluation failures                       │
//! │                                                                         │
//! │  salepos-host errors (separate crate)                                  │
//! │  └── HostError        - Lookup / write / render failures               │
//! │                                                                         │
//! │  Flow: CoreError → HostError → host request aborts                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is recovered from. Every error aborts the enclosing host
//! transaction so a wrong figure is never written or printed.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The company's timezone is not a known IANA name.
    ///
    /// ## When This Occurs
    /// - Ticket report for a company configured with a typo like "America/Guayaquill"
    #[error("Company {company} has an unknown timezone: {timezone}")]
    InvalidTimezone { company: String, timezone: String },

    /// The tax engine could not compute a line's taxes.
    #[error("Tax computation failed for {tax}: {reason}")]
    TaxComputation { tax: String, reason: String },

    /// A derived amount was requested by a name this extension does not know.
    #[error("Unknown amount field: {0}")]
    UnknownAmountField(String),

    /// A configuration record handed over by the host could not be decoded.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
