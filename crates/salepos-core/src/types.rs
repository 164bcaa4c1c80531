//! # Domain Types
//!
//! The host records this extension reads and the fields it adds to them.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │   OrderLine     │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  state          │   │  line_type      │   │  amount         │       │
//! │  │  invoice_state  │   │  amount         │   │  create_date    │       │
//! │  │  lines/payments │   │  taxes          │   └─────────────────┘       │
//! │  │  cache (5 amts) │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Tax        │   │   OrderState    │   │    Company      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  rate (0.12)    │   │  Draft ... Done │   │  timezone       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timestamps are `NaiveDateTime` because the host stores them without an
//! offset; they are UTC by convention.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Currency;
use crate::CACHED_STATES;

// =============================================================================
// Order State
// =============================================================================

/// Workflow state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Draft,
    Quotation,
    Confirmed,
    Processing,
    Done,
    Cancel,
}

impl OrderState {
    /// Checks whether cached amounts are trusted in this state.
    #[inline]
    pub fn is_cached(&self) -> bool {
        CACHED_STATES.contains(self)
    }
}

impl Default for OrderState {
    fn default() -> Self {
        OrderState::Draft
    }
}

// =============================================================================
// Invoice State
// =============================================================================

/// Invoicing progress of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceState {
    /// No invoice has been created yet.
    None,
    Waiting,
    Paid,
    Exception,
}

impl InvoiceState {
    /// True once invoicing has started.
    #[inline]
    pub fn is_started(&self) -> bool {
        *self != InvoiceState::None
    }
}

impl Default for InvoiceState {
    fn default() -> Self {
        InvoiceState::None
    }
}

// =============================================================================
// Tax
// =============================================================================

/// A tax definition attached to an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tax {
    pub id: String,
    pub name: String,
    /// Fractional rate: 0.12 means 12%.
    #[ts(as = "String")]
    pub rate: Decimal,
}

impl Tax {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rate: Decimal) -> Self {
        Tax {
            id: id.into(),
            name: name.into(),
            rate,
        }
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// Kind of an order line. Only `Line` entries contribute to totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    /// A real product line.
    Line,
    /// Displays the running subtotal of the lines above it.
    Subtotal,
    /// Section heading.
    Title,
    /// Free text note.
    Comment,
}

impl Default for LineType {
    fn default() -> Self {
        LineType::Line
    }
}

/// A line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub id: String,
    #[serde(rename = "type", default)]
    pub line_type: LineType,
    pub description: String,
    #[ts(as = "Option<String>")]
    pub unit_price: Option<Decimal>,
    #[serde(default = "OrderLine::default_quantity")]
    #[ts(as = "String")]
    pub quantity: Decimal,
    /// Signed contribution to the order subtotal.
    #[ts(as = "String")]
    pub amount: Decimal,
    #[serde(default)]
    pub taxes: Vec<Tax>,
}

impl OrderLine {
    /// Default quantity for a new line.
    #[inline]
    pub fn default_quantity() -> Decimal {
        Decimal::ONE
    }

    /// Creates a product line whose amount is `unit_price × quantity`.
    pub fn product(
        id: impl Into<String>,
        description: impl Into<String>,
        unit_price: Decimal,
        quantity: Decimal,
        taxes: Vec<Tax>,
    ) -> Self {
        OrderLine {
            id: id.into(),
            line_type: LineType::Line,
            description: description.into(),
            unit_price: Some(unit_price),
            quantity,
            amount: unit_price * quantity,
            taxes,
        }
    }

    /// Creates a non-product line (title, comment, subtotal) with a display amount.
    pub fn display(
        id: impl Into<String>,
        line_type: LineType,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        OrderLine {
            id: id.into(),
            line_type,
            description: description.into(),
            unit_price: None,
            quantity: Self::default_quantity(),
            amount,
            taxes: Vec::new(),
        }
    }

    /// Checks whether this line contributes to order totals.
    #[inline]
    pub fn is_product_line(&self) -> bool {
        self.line_type == LineType::Line
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment recorded against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Payment {
    pub id: String,
    #[ts(as = "String")]
    pub amount: Decimal,
    /// Creation time, UTC without offset.
    #[ts(as = "String")]
    pub create_date: NaiveDateTime,
}

// =============================================================================
// Company
// =============================================================================

/// The company an order belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Company {
    pub id: String,
    pub name: String,
    /// IANA timezone name such as "America/Guayaquil".
    pub timezone: Option<String>,
}

// =============================================================================
// Amount Cache
// =============================================================================

/// The five persisted cache fields of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AmountCache {
    #[ts(as = "Option<String>")]
    pub untaxed_amount: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub tax_amount: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub total_amount: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub subtotal_0: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub subtotal_12: Option<Decimal>,
}

impl AmountCache {
    /// All five fields populated.
    pub fn is_complete(&self) -> bool {
        self.untaxed_amount.is_some()
            && self.tax_amount.is_some()
            && self.total_amount.is_some()
            && self.subtotal_0.is_some()
            && self.subtotal_12.is_some()
    }
}

// =============================================================================
// Order
// =============================================================================

/// A sale order as seen by this extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub company: String,
    pub party: Option<String>,
    pub payment_term: Option<String>,
    pub currency: Option<Currency>,
    #[serde(default)]
    pub state: OrderState,
    #[serde(default)]
    pub invoice_state: InvoiceState,
    #[ts(as = "Option<String>")]
    pub sale_date: Option<NaiveDate>,
    pub sale_device: Option<String>,
    pub warehouse: Option<String>,
    #[serde(default)]
    pub self_pick_up: bool,
    /// Accumulative (loyalty) sale flag.
    #[serde(default)]
    pub acumulativo: bool,
    #[serde(default)]
    pub lines: Vec<OrderLine>,
    /// Payments in the order the host stores them.
    #[serde(default)]
    pub payments: Vec<Payment>,
    /// Creation time, UTC without offset.
    #[ts(as = "String")]
    pub create_date: NaiveDateTime,
    #[serde(default)]
    pub cache: AmountCache,
}

impl Order {
    /// Creates an empty draft order.
    pub fn draft(
        id: impl Into<String>,
        company: impl Into<String>,
        create_date: NaiveDateTime,
    ) -> Self {
        Order {
            id: id.into(),
            company: company.into(),
            party: None,
            payment_term: None,
            currency: None,
            state: OrderState::Draft,
            invoice_state: InvoiceState::None,
            sale_date: None,
            sale_device: None,
            warehouse: None,
            self_pick_up: false,
            acumulativo: false,
            lines: Vec::new(),
            payments: Vec::new(),
            create_date,
            cache: AmountCache::default(),
        }
    }

    /// Cached amounts are authoritative: finalized state and a complete cache.
    pub fn has_trusted_cache(&self) -> bool {
        self.state.is_cached() && self.cache.is_complete()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn created() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(15, 30, 0))
            .unwrap()
    }

    fn full_cache() -> AmountCache {
        AmountCache {
            untaxed_amount: Some(dec!(100)),
            tax_amount: Some(dec!(12)),
            total_amount: Some(dec!(112)),
            subtotal_0: Some(dec!(0)),
            subtotal_12: Some(dec!(100)),
        }
    }

    #[test]
    fn test_cached_states() {
        assert!(!OrderState::Draft.is_cached());
        assert!(!OrderState::Quotation.is_cached());
        assert!(OrderState::Confirmed.is_cached());
        assert!(OrderState::Processing.is_cached());
        assert!(OrderState::Done.is_cached());
        assert!(OrderState::Cancel.is_cached());
    }

    #[test]
    fn test_invoice_state_started() {
        assert!(!InvoiceState::None.is_started());
        assert!(InvoiceState::Waiting.is_started());
        assert!(InvoiceState::Paid.is_started());
    }

    #[test]
    fn test_product_line_amount() {
        let line = OrderLine::product("l1", "Tea", dec!(2.50), dec!(3), vec![]);
        assert_eq!(line.amount, dec!(7.50));
        assert!(line.is_product_line());

        let note = OrderLine::display("l2", LineType::Comment, "Gift wrap", dec!(0));
        assert!(!note.is_product_line());
    }

    #[test]
    fn test_cache_completeness() {
        let mut cache = full_cache();
        assert!(cache.is_complete());

        cache.subtotal_12 = None;
        assert!(!cache.is_complete());
        assert!(!AmountCache::default().is_complete());
    }

    #[test]
    fn test_trusted_cache_requires_finalized_state() {
        let mut order = Order::draft("s1", "c1", created());
        order.cache = full_cache();
        assert!(!order.has_trusted_cache());

        order.state = OrderState::Done;
        assert!(order.has_trusted_cache());

        order.cache.tax_amount = None;
        assert!(!order.has_trusted_cache());
    }

    #[test]
    fn test_line_quantity_defaults_to_one() {
        let json = r#"{
            "id": "l1",
            "description": "Water",
            "unit_price": "1.00",
            "amount": "1.00"
        }"#;
        let line: OrderLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.quantity, dec!(1));
        assert_eq!(line.line_type, LineType::Line);
        assert!(line.taxes.is_empty());
    }
}
