//! # Finance Ledger
//!
//! An append-only list of revenue and expense transactions with running
//! totals. The totals are only ever changed together with an appended
//! transaction, so `total_revenue` always equals the sum of the Revenue
//! entries and `total_expenses` the sum of the Expense entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{validate_single_line, validate_text_field};

/// Date recorded when a transaction is posted without one.
pub const UNKNOWN_DATE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Revenue,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Revenue => "Revenue",
            TransactionKind::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Revenue" => Ok(TransactionKind::Revenue),
            "Expense" => Ok(TransactionKind::Expense),
            other => Err(ValidationError::InvalidFormat {
                field: "transaction type".to_string(),
                reason: format!("unknown type '{}'", other),
            }),
        }
    }
}

/// One posted ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub amount: Money,
    pub date: String,
    pub description: String,
}

/// Revenue and expense ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finance {
    total_revenue: Money,
    total_expenses: Money,
    transactions: Vec<Transaction>,
}

impl Finance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts a Revenue entry.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::{Finance, Money};
    ///
    /// let mut ledger = Finance::new();
    /// ledger.record_revenue(Money::from_cents(216_000), "Order #1", "2024-03-01").unwrap();
    /// assert_eq!(ledger.total_revenue().cents(), 216_000);
    /// assert!(ledger.record_revenue(Money::from_cents(-1), "Bad", "").is_err());
    /// assert!(ledger.record_revenue(Money::zero(), "Nothing", "").is_err());
    /// ```
    pub fn record_revenue(&mut self, amount: Money, description: &str, date: &str) -> CoreResult<()> {
        self.record(TransactionKind::Revenue, amount, description, date)
    }

    /// Posts an Expense entry.
    pub fn record_expense(&mut self, amount: Money, description: &str, date: &str) -> CoreResult<()> {
        self.record(TransactionKind::Expense, amount, description, date)
    }

    /// Posts an entry of either kind. The amount must be positive. Date and
    /// description are trimmed, and an empty date is stored as `N/A`.
    pub fn record(
        &mut self,
        kind: TransactionKind,
        amount: Money,
        description: &str,
        date: &str,
    ) -> CoreResult<()> {
        Self::check_amount(amount)?;
        if amount.is_zero() {
            return Err(CoreError::InvalidAmount {
                amount: amount.to_decimal_string(),
                reason: "amount must be positive".to_string(),
            });
        }
        let date = date.trim();
        let description = description.trim();
        validate_text_field("transaction date", date)?;
        validate_single_line("transaction description", description)?;

        let date = if date.is_empty() { UNKNOWN_DATE } else { date };

        let total = match kind {
            TransactionKind::Revenue => &mut self.total_revenue,
            TransactionKind::Expense => &mut self.total_expenses,
        };
        *total = total.checked_add(amount)?;
        self.transactions.push(Transaction {
            kind,
            amount,
            date: date.to_string(),
            description: description.to_string(),
        });

        Ok(())
    }

    /// Checks an amount without posting it.
    pub fn check_amount(amount: Money) -> CoreResult<()> {
        if amount.is_negative() {
            return Err(CoreError::InvalidAmount {
                amount: amount.to_decimal_string(),
                reason: "amount cannot be negative".to_string(),
            });
        }
        Ok(())
    }

    pub fn total_revenue(&self) -> Money {
        self.total_revenue
    }

    pub fn total_expenses(&self) -> Money {
        self.total_expenses
    }

    /// Revenue minus expenses.
    pub fn profit(&self) -> Money {
        self.total_revenue - self.total_expenses
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Sums the posted entries of one kind.
    pub fn sum_of(&self, kind: TransactionKind) -> Money {
        self.transactions
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_match_transactions() {
        let mut ledger = Finance::new();
        ledger.record_revenue(Money::from_cents(1000), "Order #1", "2024-01-01").unwrap();
        ledger.record_expense(Money::from_cents(300), "Restock product #1", "").unwrap();
        ledger.record_revenue(Money::from_cents(550), "Order #2", "2024-01-02").unwrap();

        assert_eq!(ledger.total_revenue(), ledger.sum_of(TransactionKind::Revenue));
        assert_eq!(ledger.total_expenses(), ledger.sum_of(TransactionKind::Expense));
        assert_eq!(ledger.profit().cents(), 1250);
        assert_eq!(ledger.transactions().len(), 3);
    }

    #[test]
    fn test_empty_date_becomes_unknown() {
        let mut ledger = Finance::new();
        ledger.record_expense(Money::from_cents(100), "Supplies", "  ").unwrap();
        assert_eq!(ledger.transactions()[0].date, UNKNOWN_DATE);
    }

    #[test]
    fn test_negative_amount_leaves_ledger_untouched() {
        let mut ledger = Finance::new();
        assert!(ledger.record_expense(Money::from_cents(-100), "Refund", "").is_err());
        assert!(ledger.transactions().is_empty());
        assert!(ledger.total_expenses().is_zero());
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        let mut ledger = Finance::new();
        assert!(ledger.record_revenue(Money::zero(), "Order #1", "").is_err());
        assert!(ledger.transactions().is_empty());
        assert!(Finance::check_amount(Money::zero()).is_ok());
    }

    #[test]
    fn test_overflowing_total_leaves_ledger_untouched() {
        let mut ledger = Finance::new();
        ledger.record_revenue(Money::from_cents(i64::MAX), "Order #1", "").unwrap();
        assert!(ledger.record_revenue(Money::from_cents(1), "Order #2", "").is_err());
        assert_eq!(ledger.transactions().len(), 1);
        assert_eq!(ledger.total_revenue().cents(), i64::MAX);
    }

    #[test]
    fn test_date_and_description_are_trimmed() {
        let mut ledger = Finance::new();
        ledger.record_expense(Money::from_cents(100), "  Supplies ", " 2024-01-01 ").unwrap();
        assert_eq!(ledger.transactions()[0].description, "Supplies");
        assert_eq!(ledger.transactions()[0].date, "2024-01-01");
    }

    #[test]
    fn test_transaction_kind_parsing() {
        assert_eq!("Revenue".parse::<TransactionKind>().unwrap(), TransactionKind::Revenue);
        assert_eq!(" Expense ".parse::<TransactionKind>().unwrap(), TransactionKind::Expense);
        assert!("Refund".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_description_with_line_break_rejected() {
        let mut ledger = Finance::new();
        assert!(ledger.record_revenue(Money::from_cents(1), "a\nb", "").is_err());
        assert!(ledger.record_revenue(Money::from_cents(1), "Order #1, rush", "").is_ok());
    }
}
