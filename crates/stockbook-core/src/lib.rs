//! # stockbook-core: Business Records Entity Model
//!
//! Products, customers, orders and the finance ledger, with the rules that
//! keep stock levels, order totals and ledger balances consistent. This
//! crate does no I/O; `stockbook-store` reads and writes the data files.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   stockbook-store (files, config, logging)                              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌─────────────────────────────────────────────────────────────────┐  │
//! │   │                 stockbook-core (THIS CRATE)                     │  │
//! │   │                                                                 │  │
//! │   │  Product ◄──── LineItem ◄──── Order ────► Customer (by id)     │  │
//! │   │                                 │                               │  │
//! │   │                                 └── finalize ──► Finance       │  │
//! │   └─────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`product`] - Inventory items and stock adjustments
//! - [`customer`] - Regular and Premium customers, upgrade by replacement
//! - [`order`] - Draft/Finalized orders, the finalize protocol, invoices
//! - [`finance`] - Append-only revenue/expense ledger
//! - [`money`] - Integer-cent money and basis-point discounts
//! - [`report`] - Sales and inventory projections
//! - [`validation`] - Field validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockbook_core::{Customer, Finance, Money, Order, Product};
//!
//! let mut products = vec![
//!     Product::new(1, "Laptop", Money::from_cents(120_000), Money::from_cents(90_000), 5).unwrap(),
//! ];
//! let mut customer = Customer::regular(1, "Alice").unwrap();
//! let mut ledger = Finance::new();
//!
//! let mut order = Order::new(100, 1, "2024-03-01").unwrap();
//! order.add_item(&products[0], 1).unwrap();
//! order.finalize(Some(&mut customer), &mut products, &mut ledger).unwrap();
//!
//! assert_eq!(ledger.total_revenue(), Money::from_cents(120_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod customer;
pub mod error;
pub mod finance;
pub mod money;
pub mod order;
pub mod product;
pub mod report;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use customer::{Customer, CustomerId, CustomerKind};
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use finance::{Finance, Transaction, TransactionKind, UNKNOWN_DATE};
pub use money::{DiscountRate, Money};
pub use order::{Invoice, InvoiceLine, LineItem, Order, OrderId, OrderStatus};
pub use product::{find_product, find_product_mut, Product, ProductId};
