//! # Product
//!
//! An inventory item. Every setter validates, so a product can never hold a
//! negative price, cost or quantity no matter how it was built.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{
    normalize_text, validate_id, validate_name, validate_non_negative_amount,
    validate_stock_quantity,
};

/// Product identifiers are positive integers.
pub type ProductId = u32;

/// An inventory item.
///
/// ## Lifecycle
/// ```text
/// add_product / load ──► Product ──► restock (+qty)
///                           │
///                           └──────► order finalize (−qty)
/// ```
/// Products are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    price: Money,
    cost: Money,
    quantity: i64,
}

impl Product {
    /// Creates a product, validating every field.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::{Money, Product};
    ///
    /// let laptop = Product::new(1, "Laptop", Money::from_cents(120_000), Money::from_cents(90_000), 5).unwrap();
    /// assert_eq!(laptop.quantity(), 5);
    ///
    /// assert!(Product::new(0, "Laptop", Money::zero(), Money::zero(), 1).is_err());
    /// ```
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Money,
        cost: Money,
        quantity: i64,
    ) -> CoreResult<Self> {
        let name = normalize_text(name);
        validate_id("product id", id)?;
        validate_name("product name", &name)?;
        validate_non_negative_amount("price", price)?;
        validate_non_negative_amount("cost", cost)?;
        validate_stock_quantity("quantity", quantity)?;

        Ok(Product {
            id,
            name,
            price,
            cost,
            quantity,
        })
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn cost(&self) -> Money {
        self.cost
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> CoreResult<()> {
        let name = normalize_text(name);
        validate_name("product name", &name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_price(&mut self, price: Money) -> CoreResult<()> {
        validate_non_negative_amount("price", price)?;
        self.price = price;
        Ok(())
    }

    pub fn set_cost(&mut self, cost: Money) -> CoreResult<()> {
        validate_non_negative_amount("cost", cost)?;
        self.cost = cost;
        Ok(())
    }

    pub fn set_quantity(&mut self, quantity: i64) -> CoreResult<()> {
        validate_stock_quantity("quantity", quantity)?;
        self.quantity = quantity;
        Ok(())
    }

    /// Adjusts stock by `delta` (positive to restock, negative to sell).
    ///
    /// Fails with `InsufficientStock` if the result would be negative; the
    /// quantity is left unchanged in that case.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::{Money, Product};
    ///
    /// let mut p = Product::new(1, "Mouse", Money::from_cents(2500), Money::from_cents(1000), 2).unwrap();
    /// p.update_stock(-2).unwrap();
    /// assert_eq!(p.quantity(), 0);
    /// assert!(p.update_stock(-1).is_err());
    /// assert_eq!(p.quantity(), 0);
    /// ```
    pub fn update_stock(&mut self, delta: i64) -> CoreResult<()> {
        let new_quantity = self.quantity.checked_add(delta).ok_or_else(|| {
            ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: "0".to_string(),
                max: i64::MAX.to_string(),
            }
        })?;
        if new_quantity < 0 {
            return Err(self.insufficient(delta.saturating_neg()));
        }

        self.quantity = new_quantity;
        Ok(())
    }

    /// Returns true if `qty` units can be taken from stock.
    pub fn has_stock(&self, qty: i64) -> bool {
        qty <= self.quantity
    }

    /// Builds the error for a request of `requested` units.
    pub fn insufficient(&self, requested: i64) -> CoreError {
        CoreError::InsufficientStock {
            product_id: self.id,
            name: self.name.clone(),
            available: self.quantity,
            requested,
        }
    }

    /// Profit if the whole stock sold at the current price.
    pub fn potential_profit(&self) -> CoreResult<Money> {
        (self.price - self.cost).multiply_quantity(self.quantity)
    }

    /// Value of the stock at cost.
    pub fn stock_value(&self) -> CoreResult<Money> {
        self.cost.multiply_quantity(self.quantity)
    }
}

/// Looks up a product by id.
pub fn find_product(products: &[Product], id: ProductId) -> CoreResult<&Product> {
    products
        .iter()
        .find(|p| p.id == id)
        .ok_or(CoreError::ProductNotFound(id))
}

/// Looks up a product by id for mutation.
pub fn find_product_mut(products: &mut [Product], id: ProductId) -> CoreResult<&mut Product> {
    products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(CoreError::ProductNotFound(id))
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Product{{id={},name=\"{}\",price={},cost={},quantity={}}}",
            self.id,
            self.name,
            self.price.to_decimal_string(),
            self.cost.to_decimal_string(),
            self.quantity
        )
    }
}
