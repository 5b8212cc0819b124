//! # Error Types
//!
//! Domain-specific error types for stockbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockbook-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Field-level input validation failures          │
//! │                                                                         │
//! │  stockbook-store errors (separate crate)                               │
//! │  └── StoreError       - File read/write and malformed data             │
//! │                                                                         │
//! │  Every error classifies into one ErrorKind:                            │
//! │    InsufficientStock | InvalidInput | FileOperation                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// The three error kinds an interactive caller distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An operation would sell or reserve more than is on hand.
    InsufficientStock,
    /// Bad argument, illegal state transition, or malformed user data.
    InvalidInput,
    /// A data file is missing, unreadable, unwritable, or malformed.
    FileOperation,
}

// =============================================================================
// Core Error
// =============================================================================

/// Business rule errors raised by the entity model and the finalize engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Not enough stock to satisfy a request.
    ///
    /// ## When This Occurs
    /// - Adding more units to an order than the product has on hand
    /// - Merging a repeated line pushes the combined quantity over stock
    /// - A stock decrement would drive the quantity below zero
    /// - Finalize finds stock has dropped since the items were added
    #[error("Insufficient stock for product #{product_id} ({name}): available {available}, requested {requested}")]
    InsufficientStock {
        product_id: u32,
        name: String,
        available: i64,
        requested: i64,
    },

    /// The order is finalized and can no longer change.
    #[error("Order #{order_id} is already finalized")]
    OrderFinalized { order_id: u32 },

    /// Finalize was called on an order with no line items.
    #[error("Cannot finalize empty order #{order_id}")]
    EmptyOrder { order_id: u32 },

    /// Finalize was called without the order's customer record.
    #[error("Order #{order_id} has no customer record")]
    MissingCustomer { order_id: u32 },

    /// A customer's discount fell outside `[0, 1)`.
    #[error("Invalid discount {discount} for customer #{customer_id}")]
    InvalidDiscount { customer_id: u32, discount: f64 },

    #[error("Product not found: #{0}")]
    ProductNotFound(u32),

    #[error("Customer not found: #{0}")]
    CustomerNotFound(u32),

    #[error("Order not found: #{0}")]
    OrderNotFound(u32),

    /// An identifier is already taken in its collection.
    #[error("{entity} #{id} already exists")]
    DuplicateId { entity: &'static str, id: u32 },

    /// Upgrade requested for a customer who is already Premium.
    #[error("Customer #{0} is already premium")]
    AlreadyPremium(u32),

    /// A ledger amount was rejected.
    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount { amount: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            _ => ErrorKind::InvalidInput,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be below zero.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: String, max: String },

    /// Invalid format (unparseable number, forbidden character).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
