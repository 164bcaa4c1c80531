//! # salepos-host: Host Integration Layer
//!
//! Connects the pure rules of `salepos-core` to the host framework that owns
//! the records, the tax engine and the report engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Host Integration Flow                            │
//! │                                                                         │
//! │  Host framework                                                         │
//! │       │                                                                 │
//! │       │  Sale::get_amount(&ctx, ids, names)                             │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Sale / TicketReport (this crate)                               │   │
//! │  │  - Load records through SaleContext                             │   │
//! │  │  - Build AmountEnv from configuration + tax engine              │   │
//! │  │  - Call salepos-core                                            │   │
//! │  │  - Write caches back / hand the context to ReportRenderer       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  salepos-core (pure functions)                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use salepos_core::{AmountField, Order, OrderLine, Tax};
//! use salepos_host::{InMemoryContext, Sale};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let mut ctx = InMemoryContext::new(today);
//!
//! let mut order = Order::draft("s1", "c1", today.and_hms_opt(9, 0, 0).unwrap());
//! let iva = Tax::new("iva", "IVA 12%", Decimal::new(12, 2));
//! order.lines.push(OrderLine::product("l1", "Coffee", Decimal::new(100, 0), Decimal::ONE, vec![iva]));
//! ctx.insert_order(order);
//!
//! let ids = vec!["s1".to_string()];
//! let amounts = Sale::get_amount(&ctx, &ids, &[AmountField::TotalAmount]).unwrap();
//! assert_eq!(amounts[&AmountField::TotalAmount]["s1"], Decimal::new(112, 0));
//!
//! Sale::store_cache(&mut ctx, &ids).unwrap();
//! assert_eq!(ctx.cache_writes(), 1);
//! ```

pub mod context;
pub mod error;
pub mod logging;
pub mod report;
pub mod sale;

pub use context::{InMemoryContext, SaleContext};
pub use error::{HostError, HostResult};
pub use logging::init_tracing;
pub use report::{ReportRenderer, TicketReport};
pub use sale::Sale;
