//! # Money Module
//!
//! Provides the `Money` type for prices, costs, order totals and ledger
//! amounts, plus `DiscountRate` for customer discounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With doubles:                                                          │
//! │    1200 × 2 × 0.9 = 2159.9999999999995   ❌ not what the ledger wants   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Parts Per Billion                        │
//! │    240000 cents - (240000 × 100_000_000 / 10^9) = 216000 cents         │
//! │    = 2160.00 exactly; only the final discount is rounded to a cent     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::money::{DiscountRate, Money};
//!
//! let price = Money::from_cents(120_000); // 1200.00
//! let subtotal = price.multiply_quantity(2).unwrap();
//! let total = subtotal.apply_discount(DiscountRate::from_fraction(0.10));
//! assert_eq!(total.to_decimal_string(), "2160.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: profit can be negative even though prices cannot
/// - **Single field tuple struct**: zero-cost wrapper over i64
/// - **Text form**: `1200.00` in the data files, `$1200.00` for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let price = Money::from_cents(2550);
    /// assert_eq!(price.cents(), 2550);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole units and cents.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50. Saturates at the i64 range.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        let whole = major.saturating_mul(100);
        if major < 0 {
            Money(whole.saturating_sub(minor))
        } else {
            Money(whole.saturating_add(minor))
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let unit_cost = Money::from_cents(90_000);
    /// assert_eq!(unit_cost.multiply_quantity(3).unwrap().cents(), 270_000);
    /// assert!(unit_cost.multiply_quantity(i64::MAX).is_err());
    /// ```
    pub fn multiply_quantity(&self, qty: i64) -> CoreResult<Self> {
        self.0
            .checked_mul(qty)
            .map(Money)
            .ok_or_else(|| self.overflow(format!("× {}", qty)))
    }

    /// Adds, failing instead of wrapping past the i64 range.
    pub fn checked_add(&self, other: Money) -> CoreResult<Self> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| self.overflow(format!("+ {}", other.to_decimal_string())))
    }

    fn overflow(&self, operation: String) -> CoreError {
        CoreError::InvalidAmount {
            amount: format!("{} {}", self.to_decimal_string(), operation),
            reason: "result is too large".to_string(),
        }
    }

    /// Applies a customer discount, `self × (1 − rate)`.
    ///
    /// The rate keeps nine decimal places; the discount amount is rounded
    /// half-up to the cent once, at the end.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::{DiscountRate, Money};
    ///
    /// let subtotal = Money::from_cents(10000);
    /// assert_eq!(subtotal.apply_discount(DiscountRate::from_bps(1000)).cents(), 9000);
    /// ```
    pub fn apply_discount(&self, rate: DiscountRate) -> Money {
        let scale = DiscountRate::SCALE as i128;
        let discount_amount = (self.0 as i128 * rate.ppb() as i128 + scale / 2) / scale;
        Money::from_cents(self.0 - discount_amount as i64)
    }

    /// Formats the amount the way the data files store it: `1200.00`.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

/// Parses a plain decimal amount half-up to the cent, or `None` if the text
/// is not a plain decimal.
fn parse_decimal(s: &str) -> Option<Money> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let frac = frac.as_bytes();
    let digit = |i: usize| frac.get(i).map(|b| i64::from(b - b'0')).unwrap_or(0);

    let mut cents = whole.checked_mul(100)?.checked_add(digit(0) * 10 + digit(1))?;
    if digit(2) >= 5 {
        cents = cents.checked_add(1)?;
    }

    Some(Money(if negative { -cents } else { cents }))
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display form for invoices and reports: `$1200.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

/// Parses amounts as they appear in the data files.
///
/// Accepts `12`, `12.5`, `12.50` and `-3.20`. Exponent forms such as
/// `1e+06` are read as floating point and rounded to the nearest cent.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(money) = parse_decimal(s) {
            return Ok(money);
        }

        match s.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Money((value * 100.0).round() as i64)),
            _ => Err(ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: format!("'{}' is not a number", s),
            }),
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Saturates at the i64 range. Use [`Money::checked_add`] where overflow
/// must be reported.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// A customer discount in parts per billion (100_000_000 = 10%).
///
/// Customers carry their loyalty rate as a fraction (`0.12345`); it is
/// turned into a rate only once the finalize step has checked that it lies
/// in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscountRate(u64);

impl DiscountRate {
    /// Parts in a whole.
    pub const SCALE: u64 = 1_000_000_000;

    /// No discount.
    pub const NONE: DiscountRate = DiscountRate(0);

    /// A rate in basis points (1000 = 10%).
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps as u64 * 100_000)
    }

    /// Converts a fraction in `[0, 1)`, keeping nine decimal places. Values
    /// outside that range are clamped.
    pub fn from_fraction(fraction: f64) -> Self {
        let max = (Self::SCALE - 1) as f64;
        let ppb = (fraction * Self::SCALE as f64).round().clamp(0.0, max);
        DiscountRate(ppb as u64)
    }

    #[inline]
    pub const fn ppb(&self) -> u64 {
        self.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
