//! # Reports
//!
//! Read-only projections over products, customers and orders. Sales figures
//! count finalized orders only; drafts have not sold anything yet.
//!
//! Formatting is left to the caller. Every function returns plain rows.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::customer::{Customer, CustomerId};
use crate::error::CoreResult;
use crate::money::Money;
use crate::order::Order;
use crate::product::{Product, ProductId};

/// Stock above this with sales below [`DEFAULT_RISK_MAX_SOLD`] is at risk.
pub const DEFAULT_RISK_MIN_STOCK: i64 = 50;

pub const DEFAULT_RISK_MAX_SOLD: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub product_id: ProductId,
    pub name: String,
    pub quantity_sold: i64,
    pub stock: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSpend {
    pub customer_id: CustomerId,
    pub name: String,
    pub premium: bool,
    pub orders: usize,
    pub total_spent: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySales {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: Money,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Valuation {
    pub lines: Vec<(ProductId, Money)>,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskScore {
    pub product_id: ProductId,
    pub name: String,
    pub stock: i64,
    pub quantity_sold: i64,
    /// stock / (sold + 1); higher means slower-moving stock.
    pub score: f64,
}

fn finalized(orders: &[Order]) -> impl Iterator<Item = &Order> {
    orders.iter().filter(|o| o.is_finalized())
}

/// Units sold per product across finalized orders.
pub fn units_sold(orders: &[Order]) -> HashMap<ProductId, i64> {
    let mut sold = HashMap::new();
    for item in finalized(orders).flat_map(|o| o.items()) {
        *sold.entry(item.product_id).or_insert(0) += item.quantity;
    }
    sold
}

fn sales_rows(products: &[Product], orders: &[Order]) -> Vec<ProductSales> {
    let sold = units_sold(orders);
    products
        .iter()
        .map(|p| ProductSales {
            product_id: p.id(),
            name: p.name().to_string(),
            quantity_sold: sold.get(&p.id()).copied().unwrap_or(0),
            stock: p.quantity(),
        })
        .collect()
}

/// Products with at most `threshold` units on hand.
pub fn low_stock(products: &[Product], threshold: i64) -> Vec<&Product> {
    products.iter().filter(|p| p.quantity() <= threshold).collect()
}

/// Products that sold at least one unit, most sold first.
pub fn best_sellers(products: &[Product], orders: &[Order]) -> Vec<ProductSales> {
    let mut rows: Vec<_> = sales_rows(products, orders)
        .into_iter()
        .filter(|r| r.quantity_sold > 0)
        .collect();
    rows.sort_by(|a, b| {
        b.quantity_sold
            .cmp(&a.quantity_sold)
            .then(a.product_id.cmp(&b.product_id))
    });
    rows
}

/// Every customer with spend over finalized orders, biggest spender first.
pub fn top_customers(customers: &[Customer], orders: &[Order]) -> Vec<CustomerSpend> {
    let mut spend: HashMap<CustomerId, (usize, Money)> = HashMap::new();
    for order in finalized(orders) {
        let entry = spend.entry(order.customer_id()).or_default();
        entry.0 += 1;
        entry.1 += order.total();
    }

    let mut rows: Vec<_> = customers
        .iter()
        .map(|c| {
            let (orders, total_spent) = spend.get(&c.id()).copied().unwrap_or_default();
            CustomerSpend {
                customer_id: c.id(),
                name: c.name().to_string(),
                premium: c.is_premium(),
                orders,
                total_spent,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_spent
            .cmp(&a.total_spent)
            .then(a.customer_id.cmp(&b.customer_id))
    });
    rows
}

/// Stock value at cost, per product and in total.
///
/// Fails with `InvalidAmount` if a value does not fit in [`Money`].
pub fn inventory_valuation(products: &[Product]) -> CoreResult<Valuation> {
    let lines = products
        .iter()
        .map(|p| Ok((p.id(), p.stock_value()?)))
        .collect::<CoreResult<Vec<_>>>()?;
    let total = lines
        .iter()
        .try_fold(Money::zero(), |acc, (_, v)| acc.checked_add(*v))?;
    Ok(Valuation { lines, total })
}

/// Extracts `YYYY-MM` from an order date.
///
/// ISO dates are parsed; anything else falls back to its first seven
/// characters, and dates shorter than that are grouped under themselves.
pub fn month_of(date: &str) -> String {
    let date = date.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return parsed.format("%Y-%m").to_string();
    }
    date.chars().take(7).collect()
}

/// Finalized revenue per month, oldest month first.
pub fn monthly_sales(orders: &[Order]) -> Vec<MonthlySales> {
    let mut months: BTreeMap<String, (Money, usize)> = BTreeMap::new();
    for order in finalized(orders) {
        let entry = months.entry(month_of(order.date())).or_default();
        entry.0 += order.total();
        entry.1 += 1;
    }

    months
        .into_iter()
        .map(|(month, (revenue, orders))| MonthlySales {
            month,
            revenue,
            orders,
        })
        .collect()
}

/// Products holding more than `min_stock` units that sold fewer than
/// `max_sold`.
pub fn risk_inventory(
    products: &[Product],
    orders: &[Order],
    min_stock: i64,
    max_sold: i64,
) -> Vec<ProductSales> {
    sales_rows(products, orders)
        .into_iter()
        .filter(|r| r.stock > min_stock && r.quantity_sold < max_sold)
        .collect()
}

/// Scores every product by stock / (sold + 1), highest risk first.
pub fn smart_risk(products: &[Product], orders: &[Order]) -> Vec<RiskScore> {
    let mut rows: Vec<_> = sales_rows(products, orders)
        .into_iter()
        .map(|r| RiskScore {
            score: r.stock as f64 / (r.quantity_sold + 1) as f64,
            product_id: r.product_id,
            name: r.name,
            stock: r.stock,
            quantity_sold: r.quantity_sold,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.product_id.cmp(&b.product_id))
    });
    rows
}
