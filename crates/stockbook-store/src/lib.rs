//! # stockbook-store: Persistence Layer for Stockbook
//!
//! Reads and writes the four data tables and holds one session's state.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Data Flow                              │
//! │                                                                         │
//! │  Caller (seed binary, front end)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockbook-store (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   DataStore   │    │     codec     │    │   resolver   │  │   │
//! │  │   │  (store.rs)   │───►│ products.rs   │    │              │  │   │
//! │  │   │               │    │ customers.rs  │───►│ OrderRow ──► │  │   │
//! │  │   │ load / save   │    │ orders.rs     │    │ Order        │  │   │
//! │  │   │ operations    │    │ finance.rs    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  data/products.txt  customers.txt  orders.txt  finance.txt     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Data directory configuration
//! - [`codec`] - One text table per collection
//! - [`resolver`] - Order references checked against loaded entities
//! - [`store`] - The session's collections and operations
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_store::{DataStore, StoreConfig};
//!
//! let mut store = DataStore::open(StoreConfig::load(None)?)?;
//! store.create_order(10, 3, "2024-03-01")?;
//! store.add_item_to_order(10, 1, 2)?;
//! store.finalize_order(10)?;
//! store.save()?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod codec;
pub mod config;
pub mod error;
pub mod resolver;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use store::DataStore;
