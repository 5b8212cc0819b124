//! # Store Error Types
//!
//! Error types for loading, saving and operating on the data store.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  io::Error / bad row / dangling id ──► StoreError (FileOperation)      │
//! │                                                                         │
//! │  CoreError (stock, finalize, validation) ──► StoreError::Core          │
//! │                                              (kind passed through)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller matches on kind(), reports, carries on                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::io;
use std::path::PathBuf;

use stockbook_core::{CoreError, ErrorKind, Money, OrderId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A data or config file could not be read.
    ///
    /// ## When This Occurs
    /// - The file does not exist (the store treats this as an empty table)
    /// - Permissions or other I/O failures
    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A data or config file could not be written.
    #[error("Cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A row could not be decoded.
    ///
    /// ## When This Occurs
    /// - Wrong field count
    /// - Unparseable number or flag
    /// - Unknown customer or transaction type
    /// - A field the entity rules reject (negative price, empty name)
    /// - Duplicate identifier within one file
    #[error("{file} line {line}: {reason}")]
    Malformed {
        file: &'static str,
        line: usize,
        reason: String,
    },

    /// An order row names a customer or product that was not loaded.
    #[error("Order #{order_id} references missing {entity} #{id}")]
    DanglingReference {
        order_id: OrderId,
        entity: &'static str,
        id: u32,
    },

    /// The finance totals row disagrees with its transactions.
    #[error("Recorded total {kind} {recorded} does not match transactions ({computed})")]
    TotalsMismatch {
        kind: &'static str,
        recorded: Money,
        computed: Money,
    },

    /// Configuration could not be parsed, serialized or validated.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A business rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    /// Builds a Malformed error.
    pub fn malformed(file: &'static str, line: usize, reason: impl Into<String>) -> Self {
        StoreError::Malformed {
            file,
            line,
            reason: reason.into(),
        }
    }

    /// Classifies this error. Everything except a passed-through business
    /// rule is a file operation failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Core(err) => err.kind(),
            _ => ErrorKind::FileOperation,
        }
    }

    /// Returns true if this is a read of a file that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::Config(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
