//! # Amounts Module
//!
//! Untaxed, tax and total amounts of an order plus the two subtotals split
//! by nominal tax rate (`subtotal_0`, `subtotal_12`).
//!
//! ## Two Entry Points
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Editing an order (lines changed)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  compute_line_changes ──► OrderAmounts shown in the form (no writes)   │
//! │                                                                         │
//! │  Reading stored orders                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  derive_amounts ──► trusted cache?  ── yes ──► cached amounts          │
//! │                          │                                              │
//! │                          no ──► summed from lines + tax engine          │
//! │                                                                         │
//! │  subtotal_0 / subtotal_12 are rescanned from the lines on BOTH paths.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The buckets are a partial view: a line taxed at 8% shows up in
//! `tax_amount` and `total_amount` but in neither subtotal, and a line with
//! two matching taxes is counted once per tax.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::config::AccountConfiguration;
use crate::error::{CoreError, CoreResult};
use crate::money::{round_opt, Currency};
use crate::tax::{RateBucket, TaxAccumulator, TaxContext, TaxEngine};
use crate::types::{AmountCache, Order, OrderLine};

// =============================================================================
// Order Amounts
// =============================================================================

/// The five amounts of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderAmounts {
    #[ts(as = "String")]
    pub untaxed_amount: Decimal,
    #[ts(as = "String")]
    pub tax_amount: Decimal,
    #[ts(as = "String")]
    pub total_amount: Decimal,
    #[ts(as = "String")]
    pub subtotal_0: Decimal,
    #[ts(as = "String")]
    pub subtotal_12: Decimal,
}

impl From<OrderAmounts> for AmountCache {
    fn from(amounts: OrderAmounts) -> Self {
        AmountCache {
            untaxed_amount: Some(amounts.untaxed_amount),
            tax_amount: Some(amounts.tax_amount),
            total_amount: Some(amounts.total_amount),
            subtotal_0: Some(amounts.subtotal_0),
            subtotal_12: Some(amounts.subtotal_12),
        }
    }
}

/// Environment shared by the amount computations.
#[derive(Clone, Copy)]
pub struct AmountEnv<'a> {
    pub tax_engine: &'a dyn TaxEngine,
    pub config: &'a AccountConfiguration,
}

impl<'a> AmountEnv<'a> {
    pub fn new(tax_engine: &'a dyn TaxEngine, config: &'a AccountConfiguration) -> Self {
        AmountEnv { tax_engine, config }
    }
}

impl fmt::Debug for AmountEnv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmountEnv")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Building Blocks
// =============================================================================

/// The 0% and 12% subtotals of a set of lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketTotals {
    pub subtotal_0: Decimal,
    pub subtotal_12: Decimal,
}

/// Sums line amounts into the 0% and 12% buckets.
///
/// Every tax of a line is checked on its own, so a line carrying both a 0%
/// and a 12% tax lands in both buckets with its full amount.
pub fn bucket_subtotals(lines: &[OrderLine]) -> BucketTotals {
    let mut totals = BucketTotals::default();
    for line in lines {
        for tax in &line.taxes {
            match RateBucket::for_tax(tax) {
                Some(RateBucket::Twelve) => totals.subtotal_12 += line.amount,
                Some(RateBucket::Zero) => totals.subtotal_0 += line.amount,
                None => {}
            }
        }
    }
    totals
}

/// Sum of `amount` over product lines.
pub fn untaxed_amount(lines: &[OrderLine]) -> Decimal {
    lines
        .iter()
        .filter(|line| line.is_product_line())
        .map(|line| line.amount)
        .sum()
}

/// Tax amount of a set of lines, honoring the configured tax rounding.
///
/// Only product lines are taxed. Missing unit prices count as zero.
pub fn compute_tax_amount(
    env: &AmountEnv<'_>,
    lines: &[OrderLine],
    currency: Option<&Currency>,
    party: Option<&str>,
) -> CoreResult<Decimal> {
    let context = TaxContext::for_customer(party);
    let mut taxes = TaxAccumulator::new(currency, env.config.tax_rounding);

    for line in lines.iter().filter(|line| line.is_product_line()) {
        let tax_lines = env.tax_engine.compute(
            &context,
            &line.taxes,
            line.unit_price.unwrap_or(Decimal::ZERO),
            line.quantity,
        )?;
        taxes.add_line(tax_lines);
    }

    Ok(taxes.finish())
}

// =============================================================================
// Interactive Recompute
// =============================================================================

/// The in-progress order state an edit session hands over.
#[derive(Debug, Clone, Copy)]
pub struct LineChanges<'a> {
    pub lines: &'a [OrderLine],
    pub currency: Option<&'a Currency>,
    pub party: Option<&'a str>,
}

impl<'a> LineChanges<'a> {
    pub fn new(lines: &'a [OrderLine]) -> Self {
        LineChanges {
            lines,
            currency: None,
            party: None,
        }
    }

    pub fn with_currency(mut self, currency: Option<&'a Currency>) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_party(mut self, party: Option<&'a str>) -> Self {
        self.party = party;
        self
    }
}

/// Proposed amounts for an order whose lines are being edited.
///
/// Nothing is read from or written to the host. Untaxed, tax and total are
/// rounded to the currency when there is one; the bucket subtotals are the
/// plain sums of line amounts.
pub fn compute_line_changes(
    env: &AmountEnv<'_>,
    changes: &LineChanges<'_>,
) -> CoreResult<OrderAmounts> {
    let mut amounts = OrderAmounts::default();

    if !changes.lines.is_empty() {
        let buckets = bucket_subtotals(changes.lines);
        amounts.subtotal_0 = buckets.subtotal_0;
        amounts.subtotal_12 = buckets.subtotal_12;
        amounts.untaxed_amount = untaxed_amount(changes.lines);
        amounts.tax_amount =
            compute_tax_amount(env, changes.lines, changes.currency, changes.party)?;
    }

    amounts.untaxed_amount = round_opt(changes.currency, amounts.untaxed_amount);
    amounts.tax_amount = round_opt(changes.currency, amounts.tax_amount);
    amounts.total_amount = round_opt(
        changes.currency,
        amounts.untaxed_amount + amounts.tax_amount,
    );

    Ok(amounts)
}

// =============================================================================
// Amount Fields
// =============================================================================

/// The derived amount fields of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AmountField {
    UntaxedAmount,
    TaxAmount,
    TotalAmount,
    #[serde(rename = "subtotal_0")]
    Subtotal0,
    #[serde(rename = "subtotal_12")]
    Subtotal12,
}

impl AmountField {
    pub const ALL: [AmountField; 5] = [
        AmountField::UntaxedAmount,
        AmountField::TaxAmount,
        AmountField::TotalAmount,
        AmountField::Subtotal0,
        AmountField::Subtotal12,
    ];

    /// Field name as the host knows it.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AmountField::UntaxedAmount => "untaxed_amount",
            AmountField::TaxAmount => "tax_amount",
            AmountField::TotalAmount => "total_amount",
            AmountField::Subtotal0 => "subtotal_0",
            AmountField::Subtotal12 => "subtotal_12",
        }
    }

    /// Tax and total need the tax engine; the others do not.
    #[inline]
    pub fn needs_taxes(&self) -> bool {
        matches!(self, AmountField::TaxAmount | AmountField::TotalAmount)
    }

    /// Picks this field out of a full set of amounts.
    pub fn of(&self, amounts: &OrderAmounts) -> Decimal {
        match self {
            AmountField::UntaxedAmount => amounts.untaxed_amount,
            AmountField::TaxAmount => amounts.tax_amount,
            AmountField::TotalAmount => amounts.total_amount,
            AmountField::Subtotal0 => amounts.subtotal_0,
            AmountField::Subtotal12 => amounts.subtotal_12,
        }
    }
}

impl fmt::Display for AmountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmountField {
    type Err = CoreError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        AmountField::ALL
            .into_iter()
            .find(|field| field.as_str() == name)
            .ok_or_else(|| CoreError::UnknownAmountField(name.to_string()))
    }
}

// =============================================================================
// Batch Derive
// =============================================================================

/// Requested field → (order id → value).
pub type AmountsByField = BTreeMap<AmountField, BTreeMap<String, Decimal>>;

/// Amounts of a batch of stored orders.
///
/// ## Per Order
/// 1. `subtotal_0` / `subtotal_12` are rescanned from the order's own lines,
///    starting from zero for every order.
/// 2. Trusted cache (finalized state, all five cache fields set): untaxed,
///    both subtotals, and tax/total when requested, come from the cache.
/// 3. Otherwise untaxed is summed from product lines, and tax/total, when
///    requested, come from the tax engine.
///
/// Orders in a finalized state are visited first. Only requested fields
/// appear in the result.
pub fn derive_amounts(
    env: &AmountEnv<'_>,
    orders: &[Order],
    names: &[AmountField],
) -> CoreResult<AmountsByField> {
    let compute_taxes = names.iter().any(AmountField::needs_taxes);

    let mut ordered: Vec<&Order> = orders.iter().collect();
    ordered.sort_by_key(|order| !order.state.is_cached());

    let mut untaxed = BTreeMap::new();
    let mut tax = BTreeMap::new();
    let mut total = BTreeMap::new();
    let mut subtotal_0 = BTreeMap::new();
    let mut subtotal_12 = BTreeMap::new();

    for order in ordered {
        // Scanned for every order, used only when the cache is not trusted.
        let buckets = bucket_subtotals(&order.lines);

        match cached_amounts(order) {
            Some(cached) => {
                debug!(order = %order.id, "Using cached amounts");
                untaxed.insert(order.id.clone(), cached.untaxed_amount);
                subtotal_0.insert(order.id.clone(), cached.subtotal_0);
                subtotal_12.insert(order.id.clone(), cached.subtotal_12);
                if compute_taxes {
                    tax.insert(order.id.clone(), cached.tax_amount);
                    total.insert(order.id.clone(), cached.total_amount);
                }
            }
            None => {
                let untaxed_amount = untaxed_amount(&order.lines);
                untaxed.insert(order.id.clone(), untaxed_amount);
                subtotal_0.insert(order.id.clone(), buckets.subtotal_0);
                subtotal_12.insert(order.id.clone(), buckets.subtotal_12);
                if compute_taxes {
                    let tax_amount = compute_tax_amount(
                        env,
                        &order.lines,
                        order.currency.as_ref(),
                        order.party.as_deref(),
                    )?;
                    tax.insert(order.id.clone(), tax_amount);
                    total.insert(order.id.clone(), untaxed_amount + tax_amount);
                }
            }
        }
    }

    let mut result = AmountsByField::new();
    for (field, values) in [
        (AmountField::UntaxedAmount, untaxed),
        (AmountField::TaxAmount, tax),
        (AmountField::TotalAmount, total),
        (AmountField::Subtotal0, subtotal_0),
        (AmountField::Subtotal12, subtotal_12),
    ] {
        if names.contains(&field) {
            result.insert(field, values);
        }
    }

    debug!(orders = orders.len(), fields = ?names, "Derived order amounts");
    Ok(result)
}

/// The cached amounts of an order when they are trusted.
fn cached_amounts(order: &Order) -> Option<OrderAmounts> {
    if !order.state.is_cached() {
        return None;
    }
    let cache = &order.cache;
    Some(OrderAmounts {
        untaxed_amount: cache.untaxed_amount?,
        tax_amount: cache.tax_amount?,
        total_amount: cache.total_amount?,
        subtotal_0: cache.subtotal_0?,
        subtotal_12: cache.subtotal_12?,
    })
}

// =============================================================================
// Derived Field Dispatch
// =============================================================================

/// A derived-field computation: batch of orders → field → id → value.
pub type DeriveFn =
    fn(&AmountEnv<'_>, &[Order], &[AmountField]) -> CoreResult<AmountsByField>;

/// Computation registered for each derived field name.
const DERIVATIONS: [(AmountField, DeriveFn); 5] = [
    (AmountField::UntaxedAmount, derive_amounts),
    (AmountField::TaxAmount, derive_amounts),
    (AmountField::TotalAmount, derive_amounts),
    (AmountField::Subtotal0, derive_amounts),
    (AmountField::Subtotal12, derive_amounts),
];

/// Looks up the computation behind a derived field name.
pub fn derivation_for(name: &str) -> Option<(AmountField, DeriveFn)> {
    DERIVATIONS
        .iter()
        .find(|(field, _)| field.as_str() == name)
        .copied()
}

/// Amounts of a single order, all five fields.
pub fn amounts_of(env: &AmountEnv<'_>, order: &Order) -> CoreResult<OrderAmounts> {
    let derived = derive_amounts(env, std::slice::from_ref(order), &AmountField::ALL)?;
    let value = |field: AmountField| {
        derived
            .get(&field)
            .and_then(|values| values.get(&order.id))
            .copied()
            .unwrap_or(Decimal::ZERO)
    };
    Ok(OrderAmounts {
        untaxed_amount: value(AmountField::UntaxedAmount),
        tax_amount: value(AmountField::TaxAmount),
        total_amount: value(AmountField::TotalAmount),
        subtotal_0: value(AmountField::Subtotal0),
        subtotal_12: value(AmountField::Subtotal12),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
