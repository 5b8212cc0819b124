//! # Customer
//!
//! Customers come in two variants that differ only in their discount:
//!
//! ```text
//! ┌──────────────┬──────────────────────────────┐
//! │ Variant      │ discount()                   │
//! ├──────────────┼──────────────────────────────┤
//! │ Regular      │ 0.0                          │
//! │ Premium      │ loyalty fraction, unmodified │
//! └──────────────┴──────────────────────────────┘
//! ```
//!
//! Upgrading a Regular customer builds a new Premium record carrying the same
//! id, name and order history. Orders refer to customers by id, so the
//! replacement is invisible to them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::order::OrderId;
use crate::validation::{normalize_text, validate_discount_fraction, validate_id, validate_name};

pub type CustomerId = u32;

/// The discount policy of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CustomerKind {
    Regular,
    /// `loyalty` is a fraction: 0.10 means 10% off.
    Premium { loyalty: f64 },
}

impl CustomerKind {
    /// Returns the label used in the customers file.
    pub fn label(&self) -> &'static str {
        match self {
            CustomerKind::Regular => "Regular",
            CustomerKind::Premium { .. } => "Premium",
        }
    }

    /// Returns the discount fraction this policy grants.
    pub fn discount(&self) -> f64 {
        match self {
            CustomerKind::Regular => 0.0,
            CustomerKind::Premium { loyalty } => *loyalty,
        }
    }
}

impl fmt::Display for CustomerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A customer record with its append-only order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    name: String,
    kind: CustomerKind,
    order_history: Vec<OrderId>,
}

impl Customer {
    /// Creates a Regular customer.
    pub fn regular(id: CustomerId, name: impl Into<String>) -> CoreResult<Self> {
        Self::with_kind(id, name.into(), CustomerKind::Regular)
    }

    /// Creates a Premium customer.
    ///
    /// The loyalty fraction must be finite and not negative. A fraction of 1.0
    /// or more can be held but will be refused when an order is finalized.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::Customer;
    ///
    /// let c = Customer::premium(5, "Dana", 0.15).unwrap();
    /// assert_eq!(c.discount(), 0.15);
    /// assert!(Customer::premium(5, "Dana", -0.1).is_err());
    /// ```
    pub fn premium(id: CustomerId, name: impl Into<String>, loyalty: f64) -> CoreResult<Self> {
        if !loyalty.is_finite() || loyalty < 0.0 {
            return Err(ValidationError::InvalidFormat {
                field: "loyalty".to_string(),
                reason: format!("{} is not a valid fraction", loyalty),
            }
            .into());
        }

        Self::with_kind(id, name.into(), CustomerKind::Premium { loyalty })
    }

    fn with_kind(id: CustomerId, name: String, kind: CustomerKind) -> CoreResult<Self> {
        let name = normalize_text(name);
        validate_id("customer id", id)?;
        validate_name("customer name", &name)?;

        Ok(Customer {
            id,
            name,
            kind,
            order_history: Vec::new(),
        })
    }

    /// Replaces the order history, for records rebuilt from storage.
    pub fn with_history(mut self, history: Vec<OrderId>) -> Self {
        self.order_history = history;
        self
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> CoreResult<()> {
        let name = normalize_text(name);
        validate_name("customer name", &name)?;
        self.name = name;
        Ok(())
    }

    pub fn kind(&self) -> CustomerKind {
        self.kind
    }

    pub fn is_premium(&self) -> bool {
        matches!(self.kind, CustomerKind::Premium { .. })
    }

    /// Loyalty fraction as stored (0 for Regular).
    pub fn loyalty(&self) -> f64 {
        self.kind.discount()
    }

    /// The discount fraction applied when this customer's orders finalize.
    pub fn discount(&self) -> f64 {
        self.kind.discount()
    }

    pub fn order_history(&self) -> &[OrderId] {
        &self.order_history
    }

    /// Appends an order to the history.
    pub fn record_order(&mut self, order_id: OrderId) {
        self.order_history.push(order_id);
    }

    /// Builds the Premium replacement for this customer.
    ///
    /// The identifier, name and full history are copied. Fails if the
    /// customer is already Premium or the fraction is outside `[0, 1)`.
    pub fn to_premium(&self, loyalty: f64) -> CoreResult<Customer> {
        if self.is_premium() {
            return Err(CoreError::AlreadyPremium(self.id));
        }
        validate_discount_fraction("loyalty", loyalty)?;

        Ok(Customer {
            id: self.id,
            name: self.name.clone(),
            kind: CustomerKind::Premium { loyalty },
            order_history: self.order_history.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_has_no_discount() {
        let c = Customer::regular(1, "Alice").unwrap();
        assert_eq!(c.discount(), 0.0);
        assert!(!c.is_premium());
        assert_eq!(c.kind().label(), "Regular");
    }

    #[test]
    fn test_premium_discount_is_unmodified_fraction() {
        let c = Customer::premium(2, "Bob", 0.10).unwrap();
        assert_eq!(c.discount(), 0.10);
        assert_eq!(c.kind().label(), "Premium");
    }

    #[test]
    fn test_name_required() {
        assert!(Customer::regular(1, "").is_err());
        assert!(Customer::premium(1, " ", 0.1).is_err());
    }

    #[test]
    fn test_id_must_be_positive() {
        assert!(Customer::regular(0, "Alice").is_err());
        assert!(Customer::premium(0, "Bob", 0.1).is_err());
    }

    #[test]
    fn test_name_is_trimmed() {
        let mut c = Customer::regular(1, " Alice ").unwrap();
        assert_eq!(c.name(), "Alice");
        c.set_name("Alice Smith  ").unwrap();
        assert_eq!(c.name(), "Alice Smith");
    }

    #[test]
    fn test_history_is_append_only() {
        let mut c = Customer::regular(1, "Alice").unwrap();
        c.record_order(10);
        c.record_order(11);
        assert_eq!(c.order_history(), &[10, 11]);
    }

    #[test]
    fn test_upgrade_copies_identity_and_history() {
        let c = Customer::regular(5, "Eve").unwrap().with_history(vec![1, 2]);
        let upgraded = c.to_premium(0.15).unwrap();

        assert_eq!(upgraded.id(), 5);
        assert_eq!(upgraded.name(), "Eve");
        assert_eq!(upgraded.order_history(), &[1, 2]);
        assert_eq!(upgraded.discount(), 0.15);
        assert!(upgraded.is_premium());
    }

    #[test]
    fn test_upgrade_rejects_premium_and_bad_fraction() {
        let premium = Customer::premium(5, "Eve", 0.1).unwrap();
        assert!(matches!(
            premium.to_premium(0.2),
            Err(CoreError::AlreadyPremium(5))
        ));

        let regular = Customer::regular(6, "Finn").unwrap();
        assert!(regular.to_premium(1.0).is_err());
        assert!(regular.to_premium(-0.2).is_err());
    }
}
