//! Finance table.
//!
//! ```text
//! TotalRevenue,TotalExpenses
//! 2160.00,180.00
//! TransactionType,Amount,Date,Description
//! Expense,180.00,N/A,Restock product #2
//! Revenue,2160.00,2024-03-01,Order #1
//! ```
//!
//! Transactions are replayed through the ledger so the running totals are
//! rebuilt, then compared against the stored totals row. A file holding only
//! totals (no transaction section) becomes one opening entry per non-zero
//! total.

use stockbook_core::{Finance, Money, TransactionKind, UNKNOWN_DATE};

use super::{lines, render, Line};
use crate::config::FINANCE_FILE;
use crate::error::{StoreError, StoreResult};

pub const TOTALS_HEADER: &str = "TotalRevenue,TotalExpenses";
pub const TRANSACTIONS_HEADER: &str = "TransactionType,Amount,Date,Description";

/// Description given to entries synthesized from a totals-only file.
pub const OPENING_BALANCE: &str = "Opening balance";

fn decode_totals(line: &Line<'_>) -> StoreResult<(Money, Money)> {
    let fields = line.fields();
    line.expect_fields(&fields, 2, 2)?;
    Ok((
        line.parse_money("total revenue", fields[0])?,
        line.parse_money("total expenses", fields[1])?,
    ))
}

fn check_total(kind: TransactionKind, recorded: Money, computed: Money) -> StoreResult<()> {
    if recorded != computed {
        return Err(StoreError::TotalsMismatch {
            kind: match kind {
                TransactionKind::Revenue => "revenue",
                TransactionKind::Expense => "expenses",
            },
            recorded,
            computed,
        });
    }
    Ok(())
}

pub fn decode(text: &str) -> StoreResult<Finance> {
    let mut ledger = Finance::new();
    let mut lines = lines(FINANCE_FILE, text).peekable();

    if lines.peek().is_some_and(|l| l.has_token("TotalRevenue")) {
        lines.next();
    }
    let Some(totals_line) = lines.next() else {
        return Ok(ledger);
    };
    let (revenue, expenses) = decode_totals(&totals_line)?;

    if lines.peek().is_some_and(|l| l.has_token("TransactionType")) {
        lines.next();
    }

    let mut replayed = 0usize;
    for line in lines {
        let fields = line.fields_n(4);
        line.expect_fields(&fields, 4, 4)?;

        let kind: TransactionKind = line.parse("transaction type", fields[0])?;
        let amount = line.parse_money("amount", fields[1])?;
        ledger
            .record(kind, amount, fields[3], fields[2])
            .map_err(|e| line.rejected(e))?;
        replayed += 1;
    }

    if replayed > 0 {
        check_total(TransactionKind::Revenue, revenue, ledger.total_revenue())?;
        check_total(TransactionKind::Expense, expenses, ledger.total_expenses())?;
    } else {
        if !revenue.is_zero() {
            ledger
                .record_revenue(revenue, OPENING_BALANCE, UNKNOWN_DATE)
                .map_err(|e| totals_line.rejected(e))?;
        }
        if !expenses.is_zero() {
            ledger
                .record_expense(expenses, OPENING_BALANCE, UNKNOWN_DATE)
                .map_err(|e| totals_line.rejected(e))?;
        }
    }

    Ok(ledger)
}

pub fn encode(ledger: &Finance) -> String {
    let mut out = render(
        TOTALS_HEADER,
        [format!(
            "{},{}",
            ledger.total_revenue().to_decimal_string(),
            ledger.total_expenses().to_decimal_string()
        )],
    );
    out.push_str(&render(
        TRANSACTIONS_HEADER,
        ledger.transactions().iter().map(|t| {
            format!(
                "{},{},{},{}",
                t.kind,
                t.amount.to_decimal_string(),
                t.date,
                t.description
            )
        }),
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_core::ErrorKind;

    fn sample_ledger() -> Finance {
        let mut ledger = Finance::new();
        ledger
            .record_expense(Money::from_cents(18_000), "Restock product #2", "")
            .unwrap();
        ledger
            .record_revenue(Money::from_cents(216_000), "Order #1", "2024-03-01")
            .unwrap();
        ledger
    }

    #[test]
    fn test_encode() {
        assert_eq!(
            encode(&sample_ledger()),
            "TotalRevenue,TotalExpenses\n\
             2160.00,180.00\n\
             TransactionType,Amount,Date,Description\n\
             Expense,180.00,N/A,Restock product #2\n\
             Revenue,2160.00,2024-03-01,Order #1\n"
        );
    }

    #[test]
    fn test_decode_replays_transactions() {
        let ledger = decode(&encode(&sample_ledger())).unwrap();
        assert_eq!(ledger, sample_ledger());
    }

    #[test]
    fn test_description_keeps_commas() {
        let text = "TotalRevenue,TotalExpenses\n5,0\nTransactionType,Amount,Date,Description\nRevenue,5,N/A,Order #9, paid cash\n";
        let ledger = decode(text).unwrap();
        assert_eq!(ledger.transactions()[0].description, "Order #9, paid cash");
    }

    #[test]
    fn test_totals_only_file_gets_opening_entries() {
        let ledger = decode("TotalRevenue,TotalExpenses\n1500.50,200\n").unwrap();
        assert_eq!(ledger.total_revenue(), Money::from_cents(150_050));
        assert_eq!(ledger.total_expenses(), Money::from_cents(20_000));
        assert_eq!(ledger.transactions().len(), 2);
        assert_eq!(ledger.transactions()[0].description, OPENING_BALANCE);
    }

    #[test]
    fn test_empty_file_is_empty_ledger() {
        assert_eq!(decode("").unwrap(), Finance::new());
        assert_eq!(decode("TotalRevenue,TotalExpenses\n").unwrap(), Finance::new());
        assert_eq!(
            decode("TotalRevenue,TotalExpenses\n0,0\nTransactionType,Amount,Date,Description\n").unwrap(),
            Finance::new()
        );
    }

    #[test]
    fn test_totals_mismatch() {
        let text = "TotalRevenue,TotalExpenses\n100,0\nRevenue,50,N/A,Order #1\n";
        let err = decode(text).unwrap_err();
        assert!(matches!(err, StoreError::TotalsMismatch { .. }));
        assert_eq!(err.kind(), ErrorKind::FileOperation);
    }

    #[test]
    fn test_malformed_rows() {
        let cases = [
            "TotalRevenue,TotalExpenses\nabc,0\n",
            "TotalRevenue,TotalExpenses\n1,2,3\n",
            "TotalRevenue,TotalExpenses\n5,0\nRefund,5,N/A,x\n",
            "TotalRevenue,TotalExpenses\n5,0\nRevenue,5,N/A\n",
            "TotalRevenue,TotalExpenses\n0,0\nRevenue,-5,N/A,x\n",
            "TotalRevenue,TotalExpenses\n0,0\nRevenue,0,N/A,x\n",
        ];
        for text in cases {
            assert_eq!(decode(text).unwrap_err().kind(), ErrorKind::FileOperation, "{text}");
        }
    }
}
