//! # Orders
//!
//! Draft orders collect line items; finalizing turns one into a posted,
//! immutable financial event.
//!
//! ## State Machine
//! ```text
//! ┌─────────┐   finalize()    ┌───────────┐
//! │  Draft  │ ──────────────► │ Finalized │  (terminal)
//! └─────────┘                 └───────────┘
//!   add_item                    no further mutation
//!   remove_item
//! ```
//!
//! ## Finalize Protocol
//! ```text
//! 1. reject if already finalized
//! 2. reject without customer or items
//! 3. subtotal = Σ price × qty
//! 4. reject discount outside [0, 1)
//! 5. total = subtotal × (1 − discount)
//! 6. check every product can cover its combined quantity ─┐ nothing is
//! 7. post Revenue "Order #<id>" for total (if non-zero)    │ touched until
//!    ...then decrement every product                     ─┘ all checks pass
//! 8. append order id to the customer's history
//! 9. mark finalized, freeze total
//! ```
//!
//! Orders hold the customer and products by identifier only. Callers hand in
//! the current records, so upgrading a customer never leaves an order
//! pointing at a retired record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::customer::{Customer, CustomerId};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::finance::Finance;
use crate::money::{DiscountRate, Money};
use crate::product::{find_product, find_product_mut, Product, ProductId};
use crate::validation::{normalize_text, validate_positive_quantity, validate_text_field};

pub type OrderId = u32;

// =============================================================================
// Order Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Items can be added and removed.
    #[default]
    Draft,
    /// Priced, stock taken, revenue posted. Terminal.
    Finalized,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Draft => f.write_str("Draft"),
            OrderStatus::Finalized => f.write_str("Finalized"),
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product line. A product appears at most once per order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl LineItem {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        LineItem {
            product_id,
            quantity,
        }
    }
}

/// Adds `item` to `items`, merging with an existing line for the product.
fn merge_item(items: &mut Vec<LineItem>, item: LineItem) -> CoreResult<()> {
    match items.iter_mut().find(|i| i.product_id == item.product_id) {
        Some(existing) => existing.quantity = combine_quantity(existing.quantity, item.quantity)?,
        None => items.push(item),
    }
    Ok(())
}

fn combine_quantity(a: i64, b: i64) -> CoreResult<i64> {
    a.checked_add(b).ok_or_else(|| {
        ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: "1".to_string(),
            max: i64::MAX.to_string(),
        }
        .into()
    })
}

// =============================================================================
// Order
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    date: String,
    items: Vec<LineItem>,
    total: Money,
    status: OrderStatus,
}

impl Order {
    /// Creates an empty draft order.
    pub fn new(id: OrderId, customer_id: CustomerId, date: impl Into<String>) -> CoreResult<Self> {
        let date = normalize_text(date);
        validate_text_field("order date", &date)?;

        Ok(Order {
            id,
            customer_id,
            date,
            items: Vec::new(),
            total: Money::zero(),
            status: OrderStatus::Draft,
        })
    }

    /// Rebuilds a draft saved in an earlier session.
    ///
    /// Drafts never reserve stock, so a saved draft may ask for more than is
    /// on hand after other orders were finalized. Stock is therefore not
    /// checked here; finalize still checks it. Quantities must be positive,
    /// and repeated products are merged.
    pub fn restore_draft(
        id: OrderId,
        customer_id: CustomerId,
        date: impl Into<String>,
        items: impl IntoIterator<Item = LineItem>,
    ) -> CoreResult<Self> {
        let mut order = Order::new(id, customer_id, date)?;
        for item in items {
            validate_positive_quantity("quantity", item.quantity)?;
            merge_item(&mut order.items, item)?;
        }
        Ok(order)
    }

    /// Rebuilds an order that was finalized in an earlier session.
    ///
    /// No stock is checked or taken and nothing is posted: the product and
    /// ledger files already reflect this order. Quantities must still be
    /// positive, and repeated products are merged.
    pub fn restore_finalized(
        id: OrderId,
        customer_id: CustomerId,
        date: impl Into<String>,
        items: impl IntoIterator<Item = LineItem>,
        total: Money,
    ) -> CoreResult<Self> {
        let mut order = Order::new(id, customer_id, date)?;
        for item in items {
            validate_positive_quantity("quantity", item.quantity)?;
            merge_item(&mut order.items, item)?;
        }
        Finance::check_amount(total)?;

        order.total = total;
        order.status = OrderStatus::Finalized;
        Ok(order)
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The stored total: the last computed subtotal for drafts, the
    /// discounted total for finalized orders.
    pub fn total(&self) -> Money {
        self.total
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_finalized(&self) -> bool {
        self.status == OrderStatus::Finalized
    }

    /// Quantity ordered of one product (0 if absent).
    pub fn quantity_of(&self, product_id: ProductId) -> i64 {
        self.items
            .iter()
            .find(|i| i.product_id == product_id)
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    fn ensure_draft(&self) -> CoreResult<()> {
        if self.is_finalized() {
            return Err(CoreError::OrderFinalized { order_id: self.id });
        }
        Ok(())
    }

    /// Adds `qty` units of `product`, merging with an existing line.
    ///
    /// Stock is checked against the product's current quantity but not
    /// reserved; finalize checks again.
    ///
    /// ## Errors
    /// - `OrderFinalized` once the order is finalized
    /// - `Validation` if `qty <= 0`
    /// - `InsufficientStock` if the line's quantity would exceed stock
    pub fn add_item(&mut self, product: &Product, qty: i64) -> CoreResult<()> {
        self.ensure_draft()?;
        validate_positive_quantity("quantity", qty)?;

        let combined = combine_quantity(self.quantity_of(product.id()), qty)?;
        if !product.has_stock(combined) {
            return Err(product.insufficient(combined));
        }

        merge_item(&mut self.items, LineItem::new(product.id(), qty))
    }

    /// Removes the line for a product. Returns whether a line was removed.
    pub fn remove_item(&mut self, product_id: ProductId) -> CoreResult<bool> {
        self.ensure_draft()?;

        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        Ok(self.items.len() != before)
    }

    /// Σ price × qty over the current lines, at current prices.
    pub fn subtotal(&self, products: &[Product]) -> CoreResult<Money> {
        self.items.iter().try_fold(Money::zero(), |acc, item| {
            let product = find_product(products, item.product_id)?;
            acc.checked_add(product.price().multiply_quantity(item.quantity)?)
        })
    }

    /// Recomputes and stores the total for a draft.
    ///
    /// For a finalized order the frozen discounted total is returned and left
    /// untouched.
    pub fn calculate_total(&mut self, products: &[Product]) -> CoreResult<Money> {
        if !self.is_finalized() {
            self.total = self.subtotal(products)?;
        }
        Ok(self.total)
    }

    /// Finalizes the order. See the module docs for the step order.
    ///
    /// Either every effect is applied (stock, ledger, history, status) or
    /// none is.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::{Customer, Finance, Money, Order, Product};
    ///
    /// let mut products = vec![
    ///     Product::new(1, "Laptop", Money::from_cents(120_000), Money::from_cents(90_000), 5).unwrap(),
    /// ];
    /// let mut customer = Customer::premium(7, "Dana", 0.10).unwrap();
    /// let mut ledger = Finance::new();
    ///
    /// let mut order = Order::new(1, 7, "2024-03-01").unwrap();
    /// order.add_item(&products[0], 2).unwrap();
    ///
    /// let total = order.finalize(Some(&mut customer), &mut products, &mut ledger).unwrap();
    /// assert_eq!(total.to_decimal_string(), "2160.00");
    /// assert_eq!(products[0].quantity(), 3);
    /// assert_eq!(customer.order_history(), &[1]);
    /// ```
    pub fn finalize(
        &mut self,
        customer: Option<&mut Customer>,
        products: &mut [Product],
        ledger: &mut Finance,
    ) -> CoreResult<Money> {
        self.ensure_draft()?;

        let customer = match customer {
            Some(c) if c.id() == self.customer_id => c,
            _ => return Err(CoreError::MissingCustomer { order_id: self.id }),
        };
        if self.items.is_empty() {
            return Err(CoreError::EmptyOrder { order_id: self.id });
        }

        let subtotal = self.subtotal(products)?;

        let discount = customer.discount();
        if !(0.0..1.0).contains(&discount) {
            return Err(CoreError::InvalidDiscount {
                customer_id: customer.id(),
                discount,
            });
        }
        let total = subtotal.apply_discount(DiscountRate::from_fraction(discount));
        Finance::check_amount(total)?;

        let mut required: BTreeMap<ProductId, i64> = BTreeMap::new();
        for item in &self.items {
            let entry = required.entry(item.product_id).or_default();
            *entry = combine_quantity(*entry, item.quantity)?;
        }
        for (&product_id, &qty) in &required {
            let product = find_product(products, product_id)?;
            if !product.has_stock(qty) {
                return Err(product.insufficient(qty));
            }
        }

        // Every check has passed. The ledger post is the last step that can
        // fail, so it goes before the stock is taken.
        if !total.is_zero() {
            ledger.record_revenue(total, &format!("Order #{}", self.id), &self.date)?;
        }
        for (&product_id, &qty) in &required {
            find_product_mut(products, product_id)?.update_stock(-qty)?;
        }
        customer.record_order(self.id);

        self.total = total;
        self.status = OrderStatus::Finalized;
        Ok(total)
    }

    /// Builds the invoice view of this order.
    ///
    /// Finalized orders show the frozen total; drafts show the undiscounted
    /// subtotal as their total.
    pub fn invoice(&self, products: &[Product]) -> CoreResult<Invoice> {
        let lines = self
            .items
            .iter()
            .map(|item| {
                let product = find_product(products, item.product_id)?;
                Ok(InvoiceLine {
                    product_id: product.id(),
                    name: product.name().to_string(),
                    unit_price: product.price(),
                    quantity: item.quantity,
                    line_total: product.price().multiply_quantity(item.quantity)?,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let subtotal = lines
            .iter()
            .try_fold(Money::zero(), |acc, l| acc.checked_add(l.line_total))?;
        let total = if self.is_finalized() { self.total } else { subtotal };

        Ok(Invoice {
            order_id: self.id,
            customer_id: self.customer_id,
            date: self.date.clone(),
            lines,
            subtotal,
            discount: subtotal - total,
            total,
            finalized: self.is_finalized(),
        })
    }
}

// =============================================================================
// Invoice
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub line_total: Money,
}

/// A priced view of an order, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub date: String,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub finalized: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn test_product(id: ProductId, price_cents: i64, qty: i64) -> Product {
        Product::new(
            id,
            format!("Product {}", id),
            Money::from_cents(price_cents),
            Money::from_cents(price_cents / 2),
            qty,
        )
        .unwrap()
    }

    #[test]
    fn test_add_item_merges_quantities() {
        let product = test_product(1, 1000, 10);
        let mut order = Order::new(1, 1, "2024-01-01").unwrap();

        order.add_item(&product, 2).unwrap();
        order.add_item(&product, 3).unwrap();

        assert_eq!(order.items().len(), 1);
        assert_eq!(order.quantity_of(1), 5);
    }

    #[test]
    fn test_add_item_checks_combined_stock() {
        let product = test_product(1, 1000, 4);
        let mut order = Order::new(1, 1, "").unwrap();

        order.add_item(&product, 3).unwrap();
        let err = order.add_item(&product, 2).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert_eq!(order.quantity_of(1), 3);
    }

    #[test]
    fn test_add_item_rejects_non_positive_quantity() {
        let product = test_product(1, 1000, 4);
        let mut order = Order::new(1, 1, "").unwrap();

        assert!(order.add_item(&product, 0).is_err());
        assert!(order.add_item(&product, -2).is_err());
        assert!(order.items().is_empty());
    }

    #[test]
    fn test_remove_item() {
        let product = test_product(1, 1000, 4);
        let mut order = Order::new(1, 1, "").unwrap();
        order.add_item(&product, 1).unwrap();

        assert!(order.remove_item(1).unwrap());
        assert!(!order.remove_item(1).unwrap());
        assert!(order.items().is_empty());
    }

    #[test]
    fn test_calculate_total_for_draft() {
        let products = vec![test_product(1, 1000, 10), test_product(2, 250, 10)];
        let mut order = Order::new(1, 1, "").unwrap();
        order.add_item(&products[0], 2).unwrap();
        order.add_item(&products[1], 3).unwrap();

        assert_eq!(order.calculate_total(&products).unwrap().cents(), 2750);
        assert_eq!(order.total().cents(), 2750);
    }

    #[test]
    fn test_finalize_applies_discount_stock_and_ledger() {
        let mut products = vec![Product::new(
            1,
            "Laptop",
            Money::from_cents(120_000),
            Money::from_cents(90_000),
            5,
        )
        .unwrap()];
        let mut customer = Customer::premium(3, "Dana", 0.10).unwrap();
        let mut ledger = Finance::new();

        let mut order = Order::new(1, 3, "2024-03-01").unwrap();
        order.add_item(&products[0], 2).unwrap();
        let total = order
            .finalize(Some(&mut customer), &mut products, &mut ledger)
            .unwrap();

        assert_eq!(total.cents(), 216_000);
        assert_eq!(order.total().cents(), 216_000);
        assert!(order.is_finalized());
        assert_eq!(products[0].quantity(), 3);
        assert_eq!(ledger.total_revenue().cents(), 216_000);
        assert_eq!(ledger.transactions()[0].description, "Order #1");
        assert_eq!(ledger.transactions()[0].date, "2024-03-01");
        assert_eq!(customer.order_history(), &[1]);
    }

    #[test]
    fn test_finalize_twice_changes_nothing() {
        let mut products = vec![test_product(1, 1000, 5)];
        let mut customer = Customer::regular(1, "Al").unwrap();
        let mut ledger = Finance::new();

        let mut order = Order::new(1, 1, "").unwrap();
        order.add_item(&products[0], 2).unwrap();
        order
            .finalize(Some(&mut customer), &mut products, &mut ledger)
            .unwrap();

        let err = order
            .finalize(Some(&mut customer), &mut products, &mut ledger)
            .unwrap_err();
        assert!(matches!(err, CoreError::OrderFinalized { order_id: 1 }));
        assert_eq!(order.total().cents(), 2000);
        assert_eq!(products[0].quantity(), 3);
        assert_eq!(ledger.transactions().len(), 1);
        assert_eq!(customer.order_history(), &[1]);
    }

    #[test]
    fn test_finalize_rejects_empty_and_missing_customer() {
        let mut products = vec![test_product(1, 1000, 5)];
        let mut ledger = Finance::new();
        let mut customer = Customer::regular(1, "Al").unwrap();

        let mut empty = Order::new(1, 1, "").unwrap();
        assert!(matches!(
            empty.finalize(Some(&mut customer), &mut products, &mut ledger),
            Err(CoreError::EmptyOrder { .. })
        ));

        let mut order = Order::new(2, 1, "").unwrap();
        order.add_item(&products[0], 1).unwrap();
        assert!(matches!(
            order.finalize(None, &mut products, &mut ledger),
            Err(CoreError::MissingCustomer { .. })
        ));

        let mut stranger = Customer::regular(9, "Zed").unwrap();
        assert!(matches!(
            order.finalize(Some(&mut stranger), &mut products, &mut ledger),
            Err(CoreError::MissingCustomer { .. })
        ));
        assert!(!order.is_finalized());
    }

    #[test]
    fn test_finalize_rejects_discount_of_one() {
        let mut products = vec![test_product(1, 1000, 5)];
        let mut customer = Customer::premium(1, "Al", 1.0).unwrap();
        let mut ledger = Finance::new();

        let mut order = Order::new(1, 1, "").unwrap();
        order.add_item(&products[0], 1).unwrap();

        let err = order
            .finalize(Some(&mut customer), &mut products, &mut ledger)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidDiscount { .. }));
        assert_eq!(products[0].quantity(), 5);
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn test_failed_finalize_touches_no_stock() {
        let mut products = vec![test_product(1, 1000, 5), test_product(2, 500, 5)];
        let mut customer = Customer::regular(1, "Al").unwrap();
        let mut ledger = Finance::new();

        let mut order = Order::new(1, 1, "").unwrap();
        order.add_item(&products[0], 2).unwrap();
        order.add_item(&products[1], 4).unwrap();

        // Stock of the second product drops after the item was added.
        products[1].set_quantity(1).unwrap();

        let err = order
            .finalize(Some(&mut customer), &mut products, &mut ledger)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert_eq!(products[0].quantity(), 5);
        assert_eq!(products[1].quantity(), 1);
        assert!(ledger.transactions().is_empty());
        assert!(customer.order_history().is_empty());
        assert_eq!(order.status(), OrderStatus::Draft);
    }

    #[test]
    fn test_finalized_order_is_frozen() {
        let mut products = vec![test_product(1, 1000, 5)];
        let mut customer = Customer::premium(1, "Al", 0.5).unwrap();
        let mut ledger = Finance::new();

        let mut order = Order::new(1, 1, "").unwrap();
        order.add_item(&products[0], 2).unwrap();
        order
            .finalize(Some(&mut customer), &mut products, &mut ledger)
            .unwrap();

        assert!(order.add_item(&products[0], 1).is_err());
        assert!(order.remove_item(1).is_err());
        assert_eq!(order.calculate_total(&products).unwrap().cents(), 1000);
        assert_eq!(order.total().cents(), 1000);
    }

    #[test]
    fn test_restore_finalized_has_no_side_effects() {
        let order = Order::restore_finalized(
            4,
            2,
            "2024-02-02",
            vec![LineItem::new(1, 2), LineItem::new(1, 1)],
            Money::from_cents(2700),
        )
        .unwrap();

        assert!(order.is_finalized());
        assert_eq!(order.items(), &[LineItem::new(1, 3)]);
        assert_eq!(order.total().cents(), 2700);

        assert!(Order::restore_finalized(4, 2, "", vec![LineItem::new(1, 0)], Money::zero()).is_err());
    }

    #[test]
    fn test_restore_draft_skips_stock_check() {
        let mut products = vec![test_product(1, 1000, 2)];
        let mut customer = Customer::regular(2, "Bo").unwrap();
        let mut ledger = Finance::new();

        let mut order = Order::restore_draft(
            5,
            2,
            " 2024-02-03 ",
            vec![LineItem::new(1, 2), LineItem::new(1, 1)],
        )
        .unwrap();
        assert!(!order.is_finalized());
        assert_eq!(order.items(), &[LineItem::new(1, 3)]);
        assert_eq!(order.date(), "2024-02-03");

        let err = order
            .finalize(Some(&mut customer), &mut products, &mut ledger)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert_eq!(products[0].quantity(), 2);

        assert!(Order::restore_draft(5, 2, "", vec![LineItem::new(1, -1)]).is_err());
    }

    #[test]
    fn test_quantity_overflow_is_an_error() {
        let product = test_product(1, 0, i64::MAX);
        let mut order = Order::new(1, 1, "").unwrap();
        order.add_item(&product, i64::MAX).unwrap();
        assert!(order.add_item(&product, 1).is_err());
        assert_eq!(order.quantity_of(1), i64::MAX);

        let items = vec![LineItem::new(1, i64::MAX), LineItem::new(1, 1)];
        assert!(Order::restore_draft(2, 1, "", items).is_err());
    }

    #[test]
    fn test_subtotal_overflow_is_an_error() {
        let products = vec![test_product(1, i64::MAX / 2, 10)];
        let mut order = Order::new(1, 1, "").unwrap();
        order.add_item(&products[0], 3).unwrap();
        assert!(order.calculate_total(&products).is_err());
        assert!(order.invoice(&products).is_err());
    }

    #[test]
    fn test_zero_total_posts_nothing() {
        let mut products = vec![test_product(1, 0, 5)];
        let mut customer = Customer::regular(1, "Al").unwrap();
        let mut ledger = Finance::new();

        let mut order = Order::new(1, 1, "").unwrap();
        order.add_item(&products[0], 2).unwrap();
        let total = order
            .finalize(Some(&mut customer), &mut products, &mut ledger)
            .unwrap();

        assert!(total.is_zero());
        assert!(order.is_finalized());
        assert_eq!(products[0].quantity(), 3);
        assert!(ledger.transactions().is_empty());
        assert_eq!(customer.order_history(), &[1]);
    }

    #[test]
    fn test_invoice() {
        let mut products = vec![test_product(1, 1000, 5)];
        let mut customer = Customer::premium(1, "Al", 0.25).unwrap();
        let mut ledger = Finance::new();

        let mut order = Order::new(1, 1, "2024-05-05").unwrap();
        order.add_item(&products[0], 2).unwrap();

        let draft = order.invoice(&products).unwrap();
        assert_eq!(draft.total.cents(), 2000);
        assert!(draft.discount.is_zero());
        assert!(!draft.finalized);

        order
            .finalize(Some(&mut customer), &mut products, &mut ledger)
            .unwrap();
        let done = order.invoice(&products).unwrap();
        assert_eq!(done.subtotal.cents(), 2000);
        assert_eq!(done.discount.cents(), 500);
        assert_eq!(done.total.cents(), 1500);
        assert_eq!(done.lines[0].name, "Product 1");
    }

    #[test]
    fn test_date_with_delimiter_rejected() {
        assert!(Order::new(1, 1, "2024,01,01").is_err());
    }
}
