//! # Data Store
//!
//! Owns every collection for one session and is the single entry point for
//! loading, saving and mutating them.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         DataStore Session                               │
//! │                                                                         │
//! │  StoreConfig::load() ──► DataStore::open(config)                       │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  load():  products ─► customers ─► finance ─► orders (resolver)        │
//! │           decoded into fresh collections, swapped in on success         │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  add_product / create_order / add_item_to_order / finalize_order ...    │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  save():  products, customers, orders, finance rewritten in full        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Semantics
//! A failed load leaves the previous collections untouched. Business rule
//! failures come back as [`StoreError::Core`] with the store unchanged.

use stockbook_core::validation::{validate_discount_fraction, validate_positive_quantity};
use stockbook_core::{
    find_product, find_product_mut, CoreError, Customer, CustomerId, Finance, Invoice, LineItem,
    Money, Order, OrderId, Product, ProductId,
};
use tracing::{debug, info, warn};

use crate::codec::{self, read_table, write_table};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::resolver::resolve_orders;

/// In-memory collections backed by the four table files.
#[derive(Debug, Clone)]
pub struct DataStore {
    config: StoreConfig,
    products: Vec<Product>,
    customers: Vec<Customer>,
    orders: Vec<Order>,
    finance: Finance,
}

/// Everything decoded by one load, before it replaces the live state.
struct Loaded {
    products: Vec<Product>,
    customers: Vec<Customer>,
    orders: Vec<Order>,
    finance: Finance,
}

/// Reads a table, treating a missing file as empty.
fn read_or_empty(path: &std::path::Path) -> StoreResult<String> {
    match read_table(path) {
        Ok(text) => Ok(text),
        Err(err) if err.is_not_found() => {
            warn!(?path, "Data file not found, starting empty");
            Ok(String::new())
        }
        Err(err) => Err(err),
    }
}

impl DataStore {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Creates an empty store for the configured directory. Nothing is read.
    pub fn new(config: StoreConfig) -> Self {
        DataStore {
            config,
            products: Vec::new(),
            customers: Vec::new(),
            orders: Vec::new(),
            finance: Finance::new(),
        }
    }

    /// Creates a store and loads it.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let mut store = Self::new(config);
        store.load()?;
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Replaces every collection with the contents of the data directory.
    ///
    /// ## Errors
    /// Any unreadable file, malformed row, dangling reference or totals
    /// mismatch fails the whole load; the store keeps its previous state.
    pub fn load(&mut self) -> StoreResult<()> {
        let loaded = self.decode_all()?;

        info!(
            data_dir = ?self.config.data_dir(),
            products = loaded.products.len(),
            customers = loaded.customers.len(),
            orders = loaded.orders.len(),
            transactions = loaded.finance.transactions().len(),
            "Data store loaded"
        );

        self.products = loaded.products;
        self.customers = loaded.customers;
        self.orders = loaded.orders;
        self.finance = loaded.finance;
        Ok(())
    }

    fn decode_all(&self) -> StoreResult<Loaded> {
        let products = codec::products::decode(&read_or_empty(&self.config.products_path())?)?;
        debug!(count = products.len(), "Decoded products");

        let customers = codec::customers::decode(&read_or_empty(&self.config.customers_path())?)?;
        debug!(count = customers.len(), "Decoded customers");

        let finance = codec::finance::decode(&read_or_empty(&self.config.finance_path())?)?;
        debug!(count = finance.transactions().len(), "Decoded transactions");

        let rows = codec::orders::decode(&read_or_empty(&self.config.orders_path())?)?;
        let orders = resolve_orders(rows, &products, &customers)?;

        Ok(Loaded {
            products,
            customers,
            orders,
            finance,
        })
    }

    /// Writes all four tables, creating the data directory if needed.
    pub fn save(&self) -> StoreResult<()> {
        let dir = self.config.data_dir();
        std::fs::create_dir_all(dir).map_err(|source| StoreError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        write_table(&self.config.products_path(), &codec::products::encode(&self.products))?;
        write_table(&self.config.customers_path(), &codec::customers::encode(&self.customers))?;
        write_table(&self.config.orders_path(), &codec::orders::encode(&self.orders))?;
        write_table(&self.config.finance_path(), &codec::finance::encode(&self.finance))?;

        info!(
            data_dir = ?dir,
            products = self.products.len(),
            customers = self.customers.len(),
            orders = self.orders.len(),
            "Data store saved"
        );
        Ok(())
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn finance(&self) -> &Finance {
        &self.finance
    }

    pub fn product(&self, id: ProductId) -> StoreResult<&Product> {
        Ok(find_product(&self.products, id)?)
    }

    pub fn customer(&self, id: CustomerId) -> StoreResult<&Customer> {
        self.customers
            .iter()
            .find(|c| c.id() == id)
            .ok_or(StoreError::Core(CoreError::CustomerNotFound(id)))
    }

    pub fn order(&self, id: OrderId) -> StoreResult<&Order> {
        self.orders
            .iter()
            .find(|o| o.id() == id)
            .ok_or(StoreError::Core(CoreError::OrderNotFound(id)))
    }

    /// Mutable access to one product, for price or name edits.
    pub fn product_mut(&mut self, id: ProductId) -> StoreResult<&mut Product> {
        Ok(find_product_mut(&mut self.products, id)?)
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub fn add_product(&mut self, product: Product) -> StoreResult<()> {
        if self.products.iter().any(|p| p.id() == product.id()) {
            return Err(CoreError::DuplicateId {
                entity: "Product",
                id: product.id(),
            }
            .into());
        }
        debug!(product_id = product.id(), name = product.name(), "Product added");
        self.products.push(product);
        Ok(())
    }

    /// Adds stock and posts the purchase as an Expense of `cost × qty`.
    ///
    /// A product with zero cost is restocked without a ledger entry.
    pub fn restock_product(&mut self, id: ProductId, qty: i64, date: &str) -> StoreResult<()> {
        validate_positive_quantity("restock quantity", qty).map_err(CoreError::from)?;

        let product = find_product_mut(&mut self.products, id)?;
        let expense = product.cost().multiply_quantity(qty)?;
        let mut restocked = product.clone();
        restocked.update_stock(qty)?;

        // The ledger validates the date; stock only moves once it accepts.
        if !expense.is_zero() {
            self.finance
                .record_expense(expense, &format!("Restock product #{}", id), date)?;
        }
        *product = restocked;

        debug!(product_id = id, qty, %expense, stock = product.quantity(), "Product restocked");
        Ok(())
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub fn add_customer(&mut self, customer: Customer) -> StoreResult<()> {
        if self.customers.iter().any(|c| c.id() == customer.id()) {
            return Err(CoreError::DuplicateId {
                entity: "Customer",
                id: customer.id(),
            }
            .into());
        }
        if customer.is_premium() {
            validate_discount_fraction("loyalty", customer.loyalty()).map_err(CoreError::from)?;
        }
        debug!(customer_id = customer.id(), kind = customer.kind().label(), "Customer added");
        self.customers.push(customer);
        Ok(())
    }

    /// Upgrades a Regular customer to Premium in place.
    pub fn upgrade_customer(&mut self, id: CustomerId, loyalty: f64) -> StoreResult<&Customer> {
        let index = self
            .customers
            .iter()
            .position(|c| c.id() == id)
            .ok_or(CoreError::CustomerNotFound(id))?;

        let upgraded = self.customers[index].to_premium(loyalty)?;
        self.customers[index] = upgraded;

        info!(customer_id = id, loyalty, "Customer upgraded to Premium");
        Ok(&self.customers[index])
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Opens a draft order for an existing customer.
    pub fn create_order(
        &mut self,
        order_id: OrderId,
        customer_id: CustomerId,
        date: &str,
    ) -> StoreResult<&Order> {
        if self.orders.iter().any(|o| o.id() == order_id) {
            return Err(CoreError::DuplicateId {
                entity: "Order",
                id: order_id,
            }
            .into());
        }
        self.customer(customer_id)?;

        let order = Order::new(order_id, customer_id, date)?;
        debug!(order_id, customer_id, "Draft order created");
        self.orders.push(order);

        let last = self.orders.len() - 1;
        Ok(&self.orders[last])
    }

    /// Adds a line to a draft and refreshes its total.
    pub fn add_item_to_order(
        &mut self,
        order_id: OrderId,
        product_id: ProductId,
        qty: i64,
    ) -> StoreResult<Money> {
        let product = find_product(&self.products, product_id)?;
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id() == order_id)
            .ok_or(CoreError::OrderNotFound(order_id))?;

        order.add_item(product, qty)?;
        let total = order.calculate_total(&self.products)?;

        debug!(order_id, product_id, qty, %total, "Item added to order");
        Ok(total)
    }

    /// Removes a product's line from a draft. Returns whether one was removed.
    pub fn remove_item_from_order(
        &mut self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> StoreResult<bool> {
        let products = &self.products;
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id() == order_id)
            .ok_or(CoreError::OrderNotFound(order_id))?;

        let removed = order.remove_item(product_id)?;
        order.calculate_total(products)?;

        debug!(order_id, product_id, removed, "Item removed from order");
        Ok(removed)
    }

    /// Finalizes a draft: stock is taken, revenue posted and the customer's
    /// history extended, all or nothing.
    pub fn finalize_order(&mut self, order_id: OrderId) -> StoreResult<Money> {
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id() == order_id)
            .ok_or(CoreError::OrderNotFound(order_id))?;
        let customer_id = order.customer_id();
        let customer = self.customers.iter_mut().find(|c| c.id() == customer_id);

        let total = order.finalize(customer, &mut self.products, &mut self.finance)?;

        info!(order_id, customer_id, %total, "Order finalized");
        Ok(total)
    }

    pub fn invoice(&self, order_id: OrderId) -> StoreResult<Invoice> {
        Ok(self.order(order_id)?.invoice(&self.products)?)
    }

    /// Lines of one order, for callers that only need identifiers.
    pub fn order_items(&self, order_id: OrderId) -> StoreResult<Vec<LineItem>> {
        Ok(self.order(order_id)?.items().to_vec())
    }

    // =========================================================================
    // Ledger
    // =========================================================================

    pub fn record_revenue(&mut self, amount: Money, description: &str, date: &str) -> StoreResult<()> {
        self.finance.record_revenue(amount, description, date)?;
        debug!(%amount, description, "Revenue recorded");
        Ok(())
    }

    pub fn record_expense(&mut self, amount: Money, description: &str, date: &str) -> StoreResult<()> {
        self.finance.record_expense(amount, description, date)?;
        debug!(%amount, description, "Expense recorded");
        Ok(())
    }
}
