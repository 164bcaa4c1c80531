//! # Access Rules
//!
//! Read-only and invisibility conditions of order fields and buttons.
//!
//! The base sale model already locks most fields once an order leaves draft.
//! This extension additionally locks them as soon as invoicing starts, and
//! hides the payment and add-product wizards at the same moment.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  final readonly(field) = base readonly(field)  OR  invoice_state != none│
//! │  final readonly(party) =                           invoice_state != none│
//! │  invisible(button)     =                           invoice_state != none│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The table is built once by [`OrderFieldRules::sale_pos`] and only read
//! afterwards.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{Order, OrderState};

// =============================================================================
// Fields and Buttons
// =============================================================================

/// Order fields whose edit permission depends on invoicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderField {
    Party,
    PaymentTerm,
    Lines,
    SelfPickUp,
    Acumulativo,
    SaleDate,
    SaleDevice,
    Warehouse,
}

impl OrderField {
    pub const ALL: [OrderField; 8] = [
        OrderField::Party,
        OrderField::PaymentTerm,
        OrderField::Lines,
        OrderField::SelfPickUp,
        OrderField::Acumulativo,
        OrderField::SaleDate,
        OrderField::SaleDevice,
        OrderField::Warehouse,
    ];
}

/// Order form buttons hidden once invoicing starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderButton {
    WizardSalePayment,
    WizardAddProduct,
}

// =============================================================================
// Conditions
// =============================================================================

/// A boolean condition over an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "args")]
pub enum Condition {
    Never,
    StateIn(Vec<OrderState>),
    StateNotIn(Vec<OrderState>),
    /// Invoice state is anything but `none`.
    InvoiceStarted,
    Any(Vec<Condition>),
}

impl Condition {
    /// Logical OR, flattening nested `Any`s.
    pub fn or(self, other: Condition) -> Condition {
        match (self, other) {
            (Condition::Never, c) | (c, Condition::Never) => c,
            (Condition::Any(mut left), Condition::Any(right)) => {
                left.extend(right);
                Condition::Any(left)
            }
            (Condition::Any(mut left), c) => {
                left.push(c);
                Condition::Any(left)
            }
            (c, Condition::Any(mut right)) => {
                right.insert(0, c);
                Condition::Any(right)
            }
            (left, right) => Condition::Any(vec![left, right]),
        }
    }

    pub fn eval(&self, order: &Order) -> bool {
        match self {
            Condition::Never => false,
            Condition::StateIn(states) => states.contains(&order.state),
            Condition::StateNotIn(states) => !states.contains(&order.state),
            Condition::InvoiceStarted => order.invoice_state.is_started(),
            Condition::Any(conditions) => conditions.iter().any(|c| c.eval(order)),
        }
    }
}

// =============================================================================
// Field Rules
// =============================================================================

/// Read-only condition of a field plus the order fields it reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRule {
    pub readonly: Condition,
    pub depends: Vec<&'static str>,
}

impl FieldRule {
    fn new(readonly: Condition, depends: &[&'static str]) -> Self {
        FieldRule {
            readonly,
            depends: depends.to_vec(),
        }
    }

    /// ORs the invoice condition in and records the `invoice_state` dependency.
    fn lock_when_invoiced(mut self) -> Self {
        self.readonly = self.readonly.or(Condition::InvoiceStarted);
        if !self.depends.contains(&"invoice_state") {
            self.depends.push("invoice_state");
        }
        self
    }
}

/// Access rules of the order form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderFieldRules {
    fields: BTreeMap<OrderField, FieldRule>,
    buttons: BTreeMap<OrderButton, Condition>,
}

impl OrderFieldRules {
    /// Rules of the base POS sale model, before this extension.
    pub fn base() -> Self {
        use OrderState::*;

        let not_draft = || Condition::StateNotIn(vec![Draft]);
        let not_editable = || Condition::StateNotIn(vec![Draft, Quotation]);

        let fields = BTreeMap::from([
            (OrderField::Party, FieldRule::new(not_draft(), &["state"])),
            (OrderField::PaymentTerm, FieldRule::new(not_draft(), &["state"])),
            (OrderField::Lines, FieldRule::new(not_draft(), &["party", "state"])),
            (OrderField::SelfPickUp, FieldRule::new(not_editable(), &["state"])),
            (OrderField::Acumulativo, FieldRule::new(not_draft(), &["state"])),
            (OrderField::SaleDate, FieldRule::new(not_editable(), &["state"])),
            (
                OrderField::SaleDevice,
                FieldRule::new(Condition::StateIn(vec![Processing, Done, Cancel]), &["state"]),
            ),
            (OrderField::Warehouse, FieldRule::new(not_editable(), &["state"])),
        ]);

        let buttons = BTreeMap::from([
            (OrderButton::WizardSalePayment, Condition::StateIn(vec![Done])),
            (OrderButton::WizardAddProduct, Condition::StateIn(vec![Done])),
        ]);

        OrderFieldRules { fields, buttons }
    }

    /// Rules with this extension applied.
    ///
    /// Every listed field is additionally locked once invoicing starts. The
    /// party keeps only the invoice condition, and both wizard buttons are
    /// replaced by it.
    pub fn sale_pos() -> Self {
        let mut rules = Self::base();

        for (field, rule) in rules.fields.iter_mut() {
            *rule = if *field == OrderField::Party {
                FieldRule::new(Condition::InvoiceStarted, &["invoice_state"])
            } else {
                rule.clone().lock_when_invoiced()
            };
        }

        for condition in rules.buttons.values_mut() {
            *condition = Condition::InvoiceStarted;
        }

        rules
    }

    pub fn rule(&self, field: OrderField) -> Option<&FieldRule> {
        self.fields.get(&field)
    }

    /// Whether `field` is read-only for `order`.
    pub fn is_readonly(&self, field: OrderField, order: &Order) -> bool {
        self.fields
            .get(&field)
            .is_some_and(|rule| rule.readonly.eval(order))
    }

    /// Whether `button` is hidden for `order`.
    pub fn is_button_invisible(&self, button: OrderButton, order: &Order) -> bool {
        self.buttons
            .get(&button)
            .is_some_and(|condition| condition.eval(order))
    }

    /// Every field that is read-only for `order`.
    pub fn readonly_fields(&self, order: &Order) -> Vec<OrderField> {
        OrderField::ALL
            .into_iter()
            .filter(|field| self.is_readonly(*field, order))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InvoiceState;
    use chrono::NaiveDate;

    fn order(state: OrderState, invoice_state: InvoiceState) -> Order {
        let created = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let mut order = Order::draft("s1", "c1", created);
        order.state = state;
        order.invoice_state = invoice_state;
        order
    }

    #[test]
    fn test_draft_order_is_editable() {
        let rules = OrderFieldRules::sale_pos();
        let draft = order(OrderState::Draft, InvoiceState::None);

        assert!(rules.readonly_fields(&draft).is_empty());
        assert!(!rules.is_button_invisible(OrderButton::WizardSalePayment, &draft));
        assert!(!rules.is_button_invisible(OrderButton::WizardAddProduct, &draft));
    }

    #[test]
    fn test_invoicing_locks_every_field() {
        let rules = OrderFieldRules::sale_pos();
        let invoiced = order(OrderState::Draft, InvoiceState::Waiting);

        assert_eq!(rules.readonly_fields(&invoiced), OrderField::ALL.to_vec());
        assert!(rules.is_button_invisible(OrderButton::WizardSalePayment, &invoiced));
        assert!(rules.is_button_invisible(OrderButton::WizardAddProduct, &invoiced));
    }

    #[test]
    fn test_base_condition_still_applies() {
        let rules = OrderFieldRules::sale_pos();
        let confirmed = order(OrderState::Confirmed, InvoiceState::None);

        assert!(rules.is_readonly(OrderField::Lines, &confirmed));
        assert!(rules.is_readonly(OrderField::PaymentTerm, &confirmed));
        assert!(rules.is_readonly(OrderField::Warehouse, &confirmed));
    }

    #[test]
    fn test_party_only_follows_invoice_state() {
        let rules = OrderFieldRules::sale_pos();

        let confirmed = order(OrderState::Confirmed, InvoiceState::None);
        assert!(!rules.is_readonly(OrderField::Party, &confirmed));

        let paid = order(OrderState::Done, InvoiceState::Paid);
        assert!(rules.is_readonly(OrderField::Party, &paid));

        let base = OrderFieldRules::base();
        assert!(base.is_readonly(OrderField::Party, &confirmed));
    }

    #[test]
    fn test_buttons_ignore_base_condition() {
        let rules = OrderFieldRules::sale_pos();
        let done = order(OrderState::Done, InvoiceState::None);

        assert!(!rules.is_button_invisible(OrderButton::WizardSalePayment, &done));
        assert!(OrderFieldRules::base().is_button_invisible(OrderButton::WizardSalePayment, &done));
    }

    #[test]
    fn test_invoice_state_added_to_depends() {
        let rules = OrderFieldRules::sale_pos();
        for field in OrderField::ALL {
            let rule = rules.rule(field).unwrap();
            assert_eq!(
                rule.depends.iter().filter(|d| **d == "invoice_state").count(),
                1,
                "{:?}",
                field
            );
        }
        assert_eq!(
            rules.rule(OrderField::Lines).unwrap().depends,
            vec!["party", "state", "invoice_state"]
        );
    }

    #[test]
    fn test_condition_or_flattens() {
        let c = Condition::StateIn(vec![OrderState::Done])
            .or(Condition::InvoiceStarted)
            .or(Condition::Never)
            .or(Condition::StateNotIn(vec![OrderState::Draft]));

        match c {
            Condition::Any(items) => assert_eq!(items.len(), 3),
            other => panic!("expected Any, got {:?}", other),
        }
    }
}
