//! # Host Error Types
//!
//! Error types for operations that go through the host.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  CoreError (salepos-core)        lookup / write / render failure       │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  HostError (this module) ← Adds record context                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Host aborts the request and rolls back its transaction                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use salepos_core::CoreError;
use thiserror::Error;

/// Host operation errors.
#[derive(Debug, Error)]
pub enum HostError {
    /// Record not found in the host.
    ///
    /// ## When This Occurs
    /// - Order id passed to `get_amount` / `store_cache` doesn't exist
    /// - Order references a company the host doesn't know
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A derived field was requested that this extension doesn't provide.
    #[error("Unknown derived field: {0}")]
    UnknownField(String),

    /// The report engine failed to render.
    #[error("Report rendering failed: {0}")]
    Render(String),

    /// A ticket was requested without any record.
    #[error("Report {0} needs at least one record")]
    NoRecords(String),

    /// Business rule failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl HostError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        HostError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;
