//! # Host Context
//!
//! Everything the Sale model needs from the host framework, passed in
//! explicitly instead of being looked up from global state.
//!
//! ## Context Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Host request (one transaction)                                         │
//! │       │                                                                 │
//! │       │  Sale::get_amount(&ctx, ids, names)                             │
//! │       ▼                                                                 │
//! │  SaleContext                                                            │
//! │  ├── browse_orders(ids)           record lookup                         │
//! │  ├── write_order_cache(id, ..)    record write                          │
//! │  ├── company(id)                  record lookup                         │
//! │  ├── account_configuration()      settings                              │
//! │  ├── tax_engine()                 tax collaborator                      │
//! │  └── today()                      current date                          │
//! │                                                                         │
//! │  InMemoryContext implements it over plain maps for tests and demos.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use salepos_core::tax::{PercentageTaxEngine, TaxEngine};
use salepos_core::{AccountConfiguration, AmountCache, Company, Order};
use tracing::debug;
use uuid::Uuid;

use crate::error::{HostError, HostResult};

/// Capabilities the host exposes to the Sale model for one request.
pub trait SaleContext {
    /// Loads orders by id, in the order given.
    fn browse_orders(&self, ids: &[String]) -> HostResult<Vec<Order>>;

    /// Loads one order.
    fn order(&self, id: &str) -> HostResult<Order> {
        self.browse_orders(&[id.to_string()])?
            .pop()
            .ok_or_else(|| HostError::not_found("Order", id))
    }

    /// Writes the five amount cache fields of an order in one call.
    fn write_order_cache(&mut self, id: &str, cache: AmountCache) -> HostResult<()>;

    /// Loads a company.
    fn company(&self, id: &str) -> HostResult<Company>;

    /// The account configuration record.
    fn account_configuration(&self) -> HostResult<AccountConfiguration>;

    /// The host's tax engine.
    fn tax_engine(&self) -> &dyn TaxEngine;

    /// Current date in the host.
    fn today(&self) -> NaiveDate;
}

// =============================================================================
// In-Memory Host
// =============================================================================

/// A host context backed by in-memory maps.
#[derive(Debug)]
pub struct InMemoryContext<E = PercentageTaxEngine> {
    orders: BTreeMap<String, Order>,
    companies: BTreeMap<String, Company>,
    configuration: AccountConfiguration,
    tax_engine: E,
    today: NaiveDate,
    cache_writes: usize,
}

impl InMemoryContext<PercentageTaxEngine> {
    /// Creates an empty host whose current date is `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self::with_tax_engine(today, PercentageTaxEngine)
    }
}

impl<E: TaxEngine> InMemoryContext<E> {
    /// Creates an empty host with a custom tax engine.
    pub fn with_tax_engine(today: NaiveDate, tax_engine: E) -> Self {
        InMemoryContext {
            orders: BTreeMap::new(),
            companies: BTreeMap::new(),
            configuration: AccountConfiguration::default(),
            tax_engine,
            today,
            cache_writes: 0,
        }
    }

    pub fn set_configuration(&mut self, configuration: AccountConfiguration) {
        self.configuration = configuration;
    }

    pub fn insert_company(&mut self, company: Company) {
        self.companies.insert(company.id.clone(), company);
    }

    /// Stores an order, assigning an id when it has none. Returns the id.
    pub fn insert_order(&mut self, mut order: Order) -> String {
        if order.id.is_empty() {
            order.id = Uuid::new_v4().to_string();
        }
        let id = order.id.clone();
        debug!(id = %id, lines = order.lines.len(), "Inserting order");
        self.orders.insert(id.clone(), order);
        id
    }

    /// Direct access to a stored order, bypassing the context API.
    pub fn stored_order(&self, id: &str) -> Option<&Order> {
        self.orders.get(id)
    }

    /// Mutable access to a stored order, for host-side edits.
    pub fn stored_order_mut(&mut self, id: &str) -> Option<&mut Order> {
        self.orders.get_mut(id)
    }

    /// Number of cache write calls received.
    pub fn cache_writes(&self) -> usize {
        self.cache_writes
    }
}

impl<E: TaxEngine> SaleContext for InMemoryContext<E> {
    fn browse_orders(&self, ids: &[String]) -> HostResult<Vec<Order>> {
        ids.iter()
            .map(|id| {
                self.orders
                    .get(id)
                    .cloned()
                    .ok_or_else(|| HostError::not_found("Order", id.as_str()))
            })
            .collect()
    }

    fn write_order_cache(&mut self, id: &str, cache: AmountCache) -> HostResult<()> {
        let order = self
            .orders
            .get_mut(id)
            .ok_or_else(|| HostError::not_found("Order", id))?;
        order.cache = cache;
        self.cache_writes += 1;
        Ok(())
    }

    fn company(&self, id: &str) -> HostResult<Company> {
        self.companies
            .get(id)
            .cloned()
            .ok_or_else(|| HostError::not_found("Company", id))
    }

    fn account_configuration(&self) -> HostResult<AccountConfiguration> {
        Ok(self.configuration.clone())
    }

    fn tax_engine(&self) -> &dyn TaxEngine {
        &self.tax_engine
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn created() -> NaiveDateTime {
        today().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_insert_assigns_id() {
        let mut ctx = InMemoryContext::new(today());
        let id = ctx.insert_order(Order::draft("", "c1", created()));

        assert!(!id.is_empty());
        assert_eq!(ctx.order(&id).unwrap().id, id);
    }

    #[test]
    fn test_browse_keeps_requested_order() {
        let mut ctx = InMemoryContext::new(today());
        ctx.insert_order(Order::draft("a", "c1", created()));
        ctx.insert_order(Order::draft("b", "c1", created()));

        let orders = ctx
            .browse_orders(&["b".to_string(), "a".to_string()])
            .unwrap();
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_missing_records() {
        let mut ctx = InMemoryContext::new(today());

        assert!(matches!(ctx.order("nope"), Err(HostError::NotFound { .. })));
        assert!(matches!(ctx.company("nope"), Err(HostError::NotFound { .. })));
        assert!(matches!(
            ctx.write_order_cache("nope", AmountCache::default()),
            Err(HostError::NotFound { .. })
        ));
        assert_eq!(ctx.cache_writes(), 0);
    }
}
