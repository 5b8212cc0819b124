//! Orders table: `OrderID,CustomerID,Date,TotalAmount,Finalized,Items`.
//!
//! Decoding stops at [`OrderRow`]: identifiers are not looked up here. The
//! [`resolver`](crate::resolver) turns rows into orders once products and
//! customers are loaded.

use std::collections::HashSet;

use stockbook_core::{CustomerId, LineItem, Money, Order, OrderId};

use super::{data_lines, list_entries, render, Line, LIST_SEPARATOR, PAIR_SEPARATOR};
use crate::config::ORDERS_FILE;
use crate::error::StoreResult;

pub const HEADER: &str = "OrderID,CustomerID,Date,TotalAmount,Finalized,Items";
const TOKEN: &str = "OrderID";

/// An order as stored, with references still as identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    /// Line in the orders file, for error reporting.
    pub line: usize,
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub date: String,
    pub total: Money,
    pub finalized: bool,
    pub items: Vec<LineItem>,
}

fn parse_flag(line: &Line<'_>, value: &str) -> StoreResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(line.error(format!("invalid finalized flag '{}'", value))),
    }
}

fn parse_item(line: &Line<'_>, entry: &str) -> StoreResult<LineItem> {
    let parts: Vec<&str> = entry.split(PAIR_SEPARATOR).map(str::trim).collect();
    match parts.as_slice() {
        [product_id, quantity] => Ok(LineItem::new(
            line.parse("product id", product_id)?,
            line.parse("item quantity", quantity)?,
        )),
        _ => Err(line.error(format!("invalid item '{}', expected productId:quantity", entry))),
    }
}

pub fn decode(text: &str) -> StoreResult<Vec<OrderRow>> {
    let mut rows = Vec::new();
    let mut seen = HashSet::new();

    for line in data_lines(ORDERS_FILE, text, TOKEN) {
        let fields = line.fields();
        line.expect_fields(&fields, 5, 6)?;

        let order_id: OrderId = line.parse("order id", fields[0])?;
        let items = match fields.get(5) {
            Some(list) => list_entries(list)
                .map(|entry| parse_item(&line, entry))
                .collect::<StoreResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        if !seen.insert(order_id) {
            return Err(line.error(format!("duplicate order id {}", order_id)));
        }
        rows.push(OrderRow {
            line: line.number,
            order_id,
            customer_id: line.parse("customer id", fields[1])?,
            date: fields[2].to_string(),
            total: line.parse_money("total", fields[3])?,
            finalized: parse_flag(&line, fields[4])?,
            items,
        });
    }

    Ok(rows)
}

pub fn encode(orders: &[Order]) -> String {
    render(
        HEADER,
        orders.iter().map(|o| {
            let items = o
                .items()
                .iter()
                .map(|i| format!("{}{}{}", i.product_id, PAIR_SEPARATOR, i.quantity))
                .collect::<Vec<_>>()
                .join(&LIST_SEPARATOR.to_string());

            [
                o.id().to_string(),
                o.customer_id().to_string(),
                o.date().to_string(),
                o.total().to_decimal_string(),
                o.is_finalized().to_string(),
                items,
            ]
            .join(",")
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_core::{ErrorKind, Product};

    #[test]
    fn test_decode_rows() {
        let text = "OrderID,CustomerID,Date,TotalAmount,Finalized,Items\n\
                    1,3,2024-03-01,2160,true,1:2\n\
                    2,1,2024-03-02,0,No,\n\
                    3,1,2024-03-03,75.00,0\n\
                    4,2,2024-03-04,10,Yes,1:1;2:3\n";
        let rows = decode(text).unwrap();

        assert_eq!(rows.len(), 4);
        assert!(rows[0].finalized);
        assert_eq!(rows[0].total, Money::from_cents(216_000));
        assert_eq!(rows[0].items, vec![LineItem::new(1, 2)]);
        assert!(!rows[1].finalized);
        assert!(rows[1].items.is_empty());
        assert!(rows[2].items.is_empty());
        assert!(rows[3].finalized);
        assert_eq!(rows[3].items.len(), 2);
        assert_eq!(rows[3].line, 5);
    }

    #[test]
    fn test_encode() {
        let product = Product::new(1, "Mouse", Money::from_cents(2500), Money::from_cents(1000), 9).unwrap();
        let mut draft = Order::new(2, 1, "2024-03-02").unwrap();
        draft.add_item(&product, 2).unwrap();
        let done = Order::restore_finalized(
            1,
            3,
            "2024-03-01",
            vec![LineItem::new(1, 2), LineItem::new(4, 1)],
            Money::from_cents(216_000),
        )
        .unwrap();
        let empty = Order::new(3, 1, "").unwrap();

        assert_eq!(
            encode(&[done, draft, empty]),
            "OrderID,CustomerID,Date,TotalAmount,Finalized,Items\n\
             1,3,2024-03-01,2160.00,true,1:2;4:1\n\
             2,1,2024-03-02,0.00,false,1:2\n\
             3,1,,0.00,false,\n"
        );
    }

    #[test]
    fn test_malformed_rows() {
        let cases = [
            "1,3,2024-03-01,2160\n",
            "1,3,2024-03-01,2160,maybe,1:2\n",
            "1,3,2024-03-01,2160,true,1-2\n",
            "1,3,2024-03-01,2160,true,1:2:3\n",
            "1,3,2024-03-01,2160,true,a:2\n",
            "1,x,2024-03-01,2160,true,1:2\n",
            "1,3,d,1,true,1:2\n1,3,d,1,true,1:2\n",
        ];
        for text in cases {
            assert_eq!(decode(text).unwrap_err().kind(), ErrorKind::FileOperation, "{text}");
        }
    }
}
