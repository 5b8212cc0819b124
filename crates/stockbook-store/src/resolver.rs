//! # Reference Resolver
//!
//! Turns decoded order rows into orders, checking every identifier against
//! the products and customers already loaded.
//!
//! ```text
//! OrderRow { customer_id: 3, items: [1:2] }
//!      │
//!      ├── customer #3 loaded?  no ──► DanglingReference (whole load fails)
//!      ├── product  #1 loaded?  no ──► DanglingReference
//!      │
//!      ├── draft     ──► Order::restore_draft (quantities checked, stock not)
//!      └── finalized ──► Order::restore_finalized (no stock taken, nothing posted)
//! ```
//!
//! Rows are resolved in file order and the first failure stops the load.

use stockbook_core::{find_product, CoreError, Customer, Order, Product};
use tracing::debug;

use crate::codec::orders::OrderRow;
use crate::config::ORDERS_FILE;
use crate::error::{StoreError, StoreResult};

/// Resolves one row.
pub fn resolve_order(row: OrderRow, products: &[Product], customers: &[Customer]) -> StoreResult<Order> {
    let (line, order_id) = (row.line, row.order_id);
    let rejected =
        |e: CoreError| StoreError::malformed(ORDERS_FILE, line, format!("order #{}: {}", order_id, e));

    if !customers.iter().any(|c| c.id() == row.customer_id) {
        return Err(StoreError::DanglingReference {
            order_id: row.order_id,
            entity: "customer",
            id: row.customer_id,
        });
    }
    for item in &row.items {
        if find_product(products, item.product_id).is_err() {
            return Err(StoreError::DanglingReference {
                order_id: row.order_id,
                entity: "product",
                id: item.product_id,
            });
        }
    }

    if row.finalized {
        return Order::restore_finalized(row.order_id, row.customer_id, row.date, row.items, row.total)
            .map_err(rejected);
    }

    let mut order =
        Order::restore_draft(row.order_id, row.customer_id, row.date, row.items).map_err(rejected)?;
    order.calculate_total(products).map_err(rejected)?;

    Ok(order)
}

/// Resolves every row, in order.
pub fn resolve_orders(
    rows: Vec<OrderRow>,
    products: &[Product],
    customers: &[Customer],
) -> StoreResult<Vec<Order>> {
    let orders = rows
        .into_iter()
        .map(|row| resolve_order(row, products, customers))
        .collect::<StoreResult<Vec<_>>>()?;

    debug!(count = orders.len(), "Resolved order references");
    Ok(orders)
}
