//! # Seed Data Generator
//!
//! Writes a small demonstration dataset into the data directory.
//!
//! ## Usage
//! ```bash
//! # Configured data directory (stockbook.toml / STOCKBOOK_DATA_DIR / ./data)
//! cargo run -p stockbook-store --bin seed
//!
//! # Explicit directory, replacing whatever is there
//! cargo run -p stockbook-store --bin seed -- --data-dir ./demo --force
//! ```
//!
//! ## Generated Data
//! - Five products with stock
//! - Two Regular customers and one Premium customer (10%)
//! - A restock expense
//! - One finalized order and one draft order
//! - One customer upgraded to Premium (5%)

use std::path::PathBuf;

use chrono::{Duration, Local};
use clap::Parser;
use stockbook_core::{Customer, Money, Product};
use stockbook_store::{DataStore, StoreConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "seed", about = "Write a demonstration Stockbook dataset")]
struct Args {
    /// Data directory; overrides the config file and environment
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Config file to read instead of the platform default
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Overwrite an existing dataset
    #[arg(long)]
    force: bool,
}

/// (id, name, price cents, cost cents, quantity)
const PRODUCTS: &[(u32, &str, i64, i64, i64)] = &[
    (1, "Laptop", 120_000, 90_000, 5),
    (2, "Mouse", 2_500, 1_000, 40),
    (3, "Keyboard", 4_500, 2_000, 25),
    (4, "Monitor", 30_000, 22_000, 8),
    (5, "USB Cable", 800, 200, 120),
];

/// Used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "info,stockbook=debug";

/// The filter alone decides verbosity; no extra level cap is applied.
fn log_filter(env: Option<&str>) -> EnvFilter {
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn init_tracing() {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(env.as_deref()))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let mut config = StoreConfig::load(args.config)?;
    if let Some(dir) = args.data_dir {
        config = config.with_data_dir(dir);
    }

    let existing = [
        config.products_path(),
        config.customers_path(),
        config.orders_path(),
        config.finance_path(),
    ]
    .into_iter()
    .any(|path| path.exists());
    if existing && !args.force {
        return Err(format!(
            "{} already holds a dataset; pass --force to overwrite it",
            config.data_dir().display()
        )
        .into());
    }

    info!(data_dir = ?config.data_dir(), "Seeding demonstration dataset");

    let today = Local::now().date_naive();
    let last_week = (today - Duration::days(7)).format("%Y-%m-%d").to_string();
    let today = today.format("%Y-%m-%d").to_string();

    let mut store = DataStore::new(config);

    for &(id, name, price, cost, quantity) in PRODUCTS {
        store.add_product(Product::new(
            id,
            name,
            Money::from_cents(price),
            Money::from_cents(cost),
            quantity,
        )?)?;
    }

    store.add_customer(Customer::regular(1, "Alice")?)?;
    store.add_customer(Customer::regular(2, "Bob")?)?;
    store.add_customer(Customer::premium(3, "Carol", 0.10)?)?;

    store.restock_product(2, 10, &last_week)?;

    store.create_order(1, 3, &today)?;
    store.add_item_to_order(1, 1, 2)?;
    let total = store.finalize_order(1)?;

    store.create_order(2, 1, &today)?;
    store.add_item_to_order(2, 2, 2)?;
    store.add_item_to_order(2, 5, 3)?;

    store.upgrade_customer(2, 0.05)?;

    store.save()?;

    info!(
        products = store.products().len(),
        customers = store.customers().len(),
        orders = store.orders().len(),
        revenue = %store.finance().total_revenue(),
        finalized_total = %total,
        "Seed complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_default_filter_stops_at_debug() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(Some("stockbook=loud")).max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_env_filter_is_respected() {
        assert_eq!(log_filter(Some("warn")).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(Some("trace")).max_level_hint(), Some(LevelFilter::TRACE));
    }
}
