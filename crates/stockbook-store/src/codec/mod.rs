//! # Serialization Codec
//!
//! Each collection maps to one comma-delimited text table.
//!
//! ## Table Layout
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────────────────┐
//! │ products     │ ID,Name,Price,Cost,Quantity                              │
//! │ customers    │ ID,Name,Type,LoyaltyPercentage,OrderIDs   (ids `;`)      │
//! │ orders       │ OrderID,CustomerID,Date,TotalAmount,Finalized,Items      │
//! │              │                                  (items `pid:qty;...`)   │
//! │ finance      │ TotalRevenue,TotalExpenses / totals row /                │
//! │              │ TransactionType,Amount,Date,Description / one per entry  │
//! └──────────────┴──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Load Contract
//! - The header row is optional: a first line without the table's
//!   characteristic token is read as data.
//! - Lines are trimmed and blank lines skipped.
//! - Any malformed row fails the whole table. There are no partial loads.
//!
//! ## Save Contract
//! A fresh file is written each time: canonical header, then one row per
//! entity in collection order. Text fields are not escaped; the entity
//! validators keep the delimiter out of them.
//!
//! Decoding and encoding work on strings; [`read_table`] and
//! [`write_table`] do the file I/O.

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use stockbook_core::{CoreError, Money};

use crate::error::{StoreError, StoreResult};

pub mod customers;
pub mod finance;
pub mod orders;
pub mod products;

pub const DELIMITER: char = ',';
pub const LIST_SEPARATOR: char = ';';
pub const PAIR_SEPARATOR: char = ':';

// =============================================================================
// File I/O
// =============================================================================

/// Reads a whole table file.
pub fn read_table(path: &Path) -> StoreResult<String> {
    std::fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a whole table file, replacing any previous contents.
pub fn write_table(path: &Path, contents: &str) -> StoreResult<()> {
    std::fs::write(path, contents).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

// =============================================================================
// Row Reading
// =============================================================================

/// One non-blank line of a table with its 1-based line number.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
    pub file: &'static str,
    pub number: usize,
    pub text: &'a str,
}

impl<'a> Line<'a> {
    /// Splits into trimmed fields.
    pub fn fields(&self) -> Vec<&'a str> {
        self.text.split(DELIMITER).map(str::trim).collect()
    }

    /// Splits into at most `n` trimmed fields; the last absorbs any
    /// further delimiters.
    pub fn fields_n(&self, n: usize) -> Vec<&'a str> {
        self.text.splitn(n, DELIMITER).map(str::trim).collect()
    }

    /// Returns true if one of the fields equals `token`.
    pub fn has_token(&self, token: &str) -> bool {
        self.fields().iter().any(|f| *f == token)
    }

    pub fn error(&self, reason: impl Into<String>) -> StoreError {
        StoreError::malformed(self.file, self.number, reason)
    }

    /// Wraps a rejected entity field as a malformed row.
    pub fn rejected(&self, err: CoreError) -> StoreError {
        self.error(err.to_string())
    }

    /// Checks the field count lies in `min..=max`.
    pub fn expect_fields(&self, fields: &[&str], min: usize, max: usize) -> StoreResult<()> {
        if fields.len() < min || fields.len() > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{} to {}", min, max)
            };
            return Err(self.error(format!(
                "expected {} fields, found {}",
                expected,
                fields.len()
            )));
        }
        Ok(())
    }

    pub fn parse<T>(&self, field: &str, value: &str) -> StoreResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        value
            .parse()
            .map_err(|e| self.error(format!("invalid {} '{}': {}", field, value, e)))
    }

    pub fn parse_money(&self, field: &str, value: &str) -> StoreResult<Money> {
        self.parse::<Money>(field, value)
    }
}

/// Returns the non-blank lines of a table, trimmed.
pub(crate) fn lines<'a>(file: &'static str, text: &'a str) -> impl Iterator<Item = Line<'a>> {
    text.lines()
        .enumerate()
        .map(move |(idx, raw)| Line {
            file,
            number: idx + 1,
            text: raw.trim(),
        })
        .filter(|line| !line.text.is_empty())
}

/// Returns the data lines of a single-section table, skipping the header if
/// the first line carries `token`.
pub(crate) fn data_lines<'a>(
    file: &'static str,
    text: &'a str,
    token: &str,
) -> impl Iterator<Item = Line<'a>> {
    let mut lines = lines(file, text).peekable();
    if lines.peek().is_some_and(|first| first.has_token(token)) {
        lines.next();
    }
    lines
}

/// Splits a `;`-joined list, ignoring empty entries.
pub(crate) fn list_entries(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}

/// Joins rows under a header, one per line, with a trailing newline.
pub(crate) fn render(header: &str, rows: impl IntoIterator<Item = String>) -> String {
    let mut out = String::from(header);
    out.push('\n');
    for row in rows {
        out.push_str(&row);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_skip_blank_and_trim() {
        let text = "  a,b  \n\n   \nc,d\r\n";
        let collected: Vec<_> = lines("t.txt", text).map(|l| (l.number, l.text)).collect();
        assert_eq!(collected, vec![(1, "a,b"), (4, "c,d")]);
    }

    #[test]
    fn test_header_detection_by_field() {
        let with_header = "ID,Name\n1,A\n";
        let rows: Vec<_> = data_lines("t.txt", with_header, "ID").map(|l| l.text).collect();
        assert_eq!(rows, vec!["1,A"]);

        let without = "1,IDEA\n2,B\n";
        let rows: Vec<_> = data_lines("t.txt", without, "ID").map(|l| l.text).collect();
        assert_eq!(rows, vec!["1,IDEA", "2,B"]);
    }

    #[test]
    fn test_fields_n_keeps_tail() {
        let line = Line {
            file: "t.txt",
            number: 1,
            text: "Revenue, 10.00 ,N/A,Order #1, rush",
        };
        assert_eq!(line.fields_n(4), vec!["Revenue", "10.00", "N/A", "Order #1, rush"]);
    }

    #[test]
    fn test_parse_errors_carry_location() {
        let line = Line {
            file: "products.txt",
            number: 7,
            text: "",
        };
        let err = line.parse::<u32>("id", "x1").unwrap_err();
        assert!(err.to_string().starts_with("products.txt line 7: invalid id 'x1'"));
    }

    #[test]
    fn test_list_entries() {
        let entries: Vec<_> = list_entries("1; 2;;3;").collect();
        assert_eq!(entries, vec!["1", "2", "3"]);
        assert_eq!(list_entries("").count(), 0);
    }
}
