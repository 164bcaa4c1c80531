//! # Sale Model Entry Points
//!
//! The hooks the host calls on the sale model: on-change of lines, derived
//! amount fields, cache write-back, defaults and access rules.
//!
//! Every entry point takes the host context explicitly. Read-only paths take
//! `&impl SaleContext`; only [`Sale::store_cache`] needs `&mut`.
//!
//! ```text
//! ┌──────────────────────┐     ┌──────────────────────┐     ┌──────────────┐
//! │  on_change_lines     │────►│ compute_line_changes │     │              │
//! │  get_amount          │────►│ derive_amounts       │────►│ salepos-core │
//! │  compute_field       │────►│ derivation_for       │     │              │
//! │  store_cache         │────►│ amounts_of           │     └──────────────┘
//! └──────────┬───────────┘     └──────────────────────┘
//!            │ write_order_cache (store_cache only)
//!            ▼
//!      SaleContext
//! ```

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use salepos_core::access::OrderFieldRules;
use salepos_core::amounts::{
    amounts_of, compute_line_changes, derivation_for, derive_amounts, AmountEnv, LineChanges,
};
use salepos_core::{AmountField, AmountsByField, OrderAmounts};
use tracing::debug;

use crate::context::SaleContext;
use crate::error::{HostError, HostResult};

/// The sale model as extended for point of sale.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sale;

impl Sale {
    // =========================================================================
    // Defaults
    // =========================================================================

    /// A new sale is dated today.
    pub fn default_sale_date(ctx: &impl SaleContext) -> NaiveDate {
        ctx.today()
    }

    /// Field access rules, built on first use.
    pub fn field_rules() -> &'static OrderFieldRules {
        static RULES: OnceLock<OrderFieldRules> = OnceLock::new();
        RULES.get_or_init(OrderFieldRules::sale_pos)
    }

    // =========================================================================
    // Amounts
    // =========================================================================

    /// Proposed amounts while the lines of an order are being edited.
    pub fn on_change_lines(
        ctx: &impl SaleContext,
        changes: &LineChanges<'_>,
    ) -> HostResult<OrderAmounts> {
        let config = ctx.account_configuration()?;
        let env = AmountEnv::new(ctx.tax_engine(), &config);

        let amounts = compute_line_changes(&env, changes)?;
        debug!(
            lines = changes.lines.len(),
            total = %amounts.total_amount,
            "Recomputed amounts on line change"
        );
        Ok(amounts)
    }

    /// Derived amount fields of stored orders.
    pub fn get_amount(
        ctx: &impl SaleContext,
        ids: &[String],
        names: &[AmountField],
    ) -> HostResult<AmountsByField> {
        let orders = ctx.browse_orders(ids)?;
        let config = ctx.account_configuration()?;
        let env = AmountEnv::new(ctx.tax_engine(), &config);

        Ok(derive_amounts(&env, &orders, names)?)
    }

    /// Computes one derived field by name, as the host's field getter does.
    pub fn compute_field(
        ctx: &impl SaleContext,
        name: &str,
        ids: &[String],
    ) -> HostResult<BTreeMap<String, Decimal>> {
        let (field, derive) =
            derivation_for(name).ok_or_else(|| HostError::UnknownField(name.to_string()))?;

        let orders = ctx.browse_orders(ids)?;
        let config = ctx.account_configuration()?;
        let env = AmountEnv::new(ctx.tax_engine(), &config);

        let mut values = derive(&env, &orders, &[field])?;
        Ok(values.remove(&field).unwrap_or_default())
    }

    /// Persists the current amounts of each order into its cache fields.
    ///
    /// One write per order. The order's state is not checked.
    pub fn store_cache(ctx: &mut impl SaleContext, ids: &[String]) -> HostResult<()> {
        let orders = ctx.browse_orders(ids)?;
        let config = ctx.account_configuration()?;

        let computed = {
            let env = AmountEnv::new(ctx.tax_engine(), &config);
            orders
                .iter()
                .map(|order| -> HostResult<(String, OrderAmounts)> {
                    Ok((order.id.clone(), amounts_of(&env, order)?))
                })
                .collect::<HostResult<Vec<_>>>()?
        };

        for (id, amounts) in computed {
            debug!(
                order = %id,
                untaxed = %amounts.untaxed_amount,
                total = %amounts.total_amount,
                "Storing amount cache"
            );
            ctx.write_order_cache(&id, amounts.into())?;
        }

        Ok(())
    }
}
