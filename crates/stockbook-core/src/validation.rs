//! # Validation Module
//!
//! Field validators shared by the entity setters and the store.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product::set_price ──┐                                                 │
//! │  Customer::regular  ──┼──► validators (THIS MODULE) ──► ValidationError │
//! │  Order::add_item    ──┘                                                 │
//! │                                                                         │
//! │  Every mutator validates, not only the constructors, so a value that   │
//! │  came out of a data file gets exactly the same checks as user input.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::validation::{validate_name, validate_positive_quantity};
//!
//! assert!(validate_name("name", "Laptop").is_ok());
//! assert!(validate_positive_quantity("quantity", 0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Characters that cannot appear inside a stored text field.
const FORBIDDEN_CHARS: &[char] = &[',', '\n', '\r'];

const LINE_BREAKS: &[char] = &['\n', '\r'];

// =============================================================================
// String Validators
// =============================================================================

/// Strips surrounding whitespace, which the data files do not keep.
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::normalize_text;
///
/// assert_eq!(normalize_text(" Mouse "), "Mouse");
/// assert_eq!(normalize_text("USB  Cable"), "USB  Cable");
/// ```
pub fn normalize_text(value: impl Into<String>) -> String {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// Validates a display name: non-empty after trimming, and storable.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    validate_text_field(field, name)
}

/// Validates free text that is written to a data file as one field.
///
/// The data files do no escaping, so the delimiter and line breaks are
/// rejected here rather than producing a file that cannot be read back.
pub fn validate_text_field(field: &str, value: &str) -> ValidationResult<()> {
    if let Some(c) = value.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("must not contain {:?}", c),
        });
    }

    Ok(())
}

/// Validates text stored as the last field of a row, where the delimiter is
/// allowed but a line break is not.
pub fn validate_single_line(field: &str, value: &str) -> ValidationResult<()> {
    if value.contains(LINE_BREAKS) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must fit on one line".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates that an identifier is positive.
pub fn validate_id(field: &str, id: u32) -> ValidationResult<()> {
    if id == 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates that a quantity is greater than zero.
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_positive_quantity;
///
/// assert!(validate_positive_quantity("quantity", 2).is_ok());
/// assert!(validate_positive_quantity("quantity", -1).is_err());
/// ```
pub fn validate_positive_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates that a stock quantity is not negative.
pub fn validate_stock_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates that an amount is not negative.
pub fn validate_non_negative_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a loyalty fraction: finite and in `[0, 1)`.
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_discount_fraction;
///
/// assert!(validate_discount_fraction("loyalty", 0.15).is_ok());
/// assert!(validate_discount_fraction("loyalty", 1.0).is_err());
/// assert!(validate_discount_fraction("loyalty", -0.1).is_err());
/// ```
pub fn validate_discount_fraction(field: &str, fraction: f64) -> ValidationResult<()> {
    if !fraction.is_finite() || !(0.0..1.0).contains(&fraction) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "0".to_string(),
            max: "1 (exclusive)".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Laptop").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", "Smith, John").is_err());
    }

    #[test]
    fn test_validate_text_field() {
        assert!(validate_text_field("date", "2024-03-01").is_ok());
        assert!(validate_text_field("date", "").is_ok());
        assert!(validate_text_field("date", "line\nbreak").is_err());
        assert!(validate_text_field("date", "1,2").is_err());
    }

    #[test]
    fn test_validate_single_line() {
        assert!(validate_single_line("description", "Restock, urgent").is_ok());
        assert!(validate_single_line("description", "two\r\nlines").is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("id", 1).is_ok());
        assert!(validate_id("id", 0).is_err());
    }

    #[test]
    fn test_validate_quantities() {
        assert!(validate_positive_quantity("quantity", 1).is_ok());
        assert!(validate_positive_quantity("quantity", 0).is_err());

        assert!(validate_stock_quantity("quantity", 0).is_ok());
        assert!(validate_stock_quantity("quantity", -1).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_non_negative_amount("price", Money::zero()).is_ok());
        assert!(validate_non_negative_amount("price", Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_discount_fraction() {
        assert!(validate_discount_fraction("loyalty", 0.0).is_ok());
        assert!(validate_discount_fraction("loyalty", 0.9999).is_ok());
        assert!(validate_discount_fraction("loyalty", 1.0).is_err());
        assert!(validate_discount_fraction("loyalty", f64::NAN).is_err());
    }
}
