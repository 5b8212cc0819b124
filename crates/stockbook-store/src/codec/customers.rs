//! Customers table: `ID,Name,Type,LoyaltyPercentage,OrderIDs`.
//!
//! The type column selects the variant. Regular rows carry `0` as loyalty.
//! The order history column is optional and `;`-joined.

use std::collections::HashSet;

use stockbook_core::{Customer, CustomerKind, OrderId};

use super::{data_lines, list_entries, render, LIST_SEPARATOR};
use crate::config::CUSTOMERS_FILE;
use crate::error::StoreResult;

pub const HEADER: &str = "ID,Name,Type,LoyaltyPercentage,OrderIDs";
const TOKEN: &str = "Type";

pub fn decode(text: &str) -> StoreResult<Vec<Customer>> {
    let mut customers = Vec::new();
    let mut seen = HashSet::new();

    for line in data_lines(CUSTOMERS_FILE, text, TOKEN) {
        let fields = line.fields();
        line.expect_fields(&fields, 4, 5)?;

        let id: u32 = line.parse("customer id", fields[0])?;
        let name = fields[1];
        let loyalty: f64 = line.parse("loyalty", fields[3])?;

        let customer = match fields[2].to_ascii_lowercase().as_str() {
            "regular" => Customer::regular(id, name),
            "premium" => Customer::premium(id, name, loyalty),
            other => return Err(line.error(format!("unknown customer type '{}'", other))),
        }
        .map_err(|e| line.rejected(e))?;

        let history = match fields.get(4) {
            Some(list) => list_entries(list)
                .map(|entry| line.parse::<OrderId>("order id", entry))
                .collect::<StoreResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        if !seen.insert(id) {
            return Err(line.error(format!("duplicate customer id {}", id)));
        }
        customers.push(customer.with_history(history));
    }

    Ok(customers)
}

pub fn encode(customers: &[Customer]) -> String {
    render(
        HEADER,
        customers.iter().map(|c| {
            let loyalty = match c.kind() {
                CustomerKind::Regular => "0".to_string(),
                CustomerKind::Premium { loyalty } => loyalty.to_string(),
            };
            let history = c
                .order_history()
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(&LIST_SEPARATOR.to_string());

            [
                c.id().to_string(),
                c.name().to_string(),
                c.kind().label().to_string(),
                loyalty,
                history,
            ]
            .join(",")
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_core::ErrorKind;

    #[test]
    fn test_decode_variants_and_history() {
        let text = "ID,Name,Type,LoyaltyPercentage,OrderIDs\n\
                    1,Alice,Regular,0,1;2\n\
                    2,Bob,Premium,0.15,\n\
                    3,Cara,Premium,0.05\n";
        let customers = decode(text).unwrap();

        assert_eq!(customers.len(), 3);
        assert!(!customers[0].is_premium());
        assert_eq!(customers[0].order_history(), &[1, 2]);
        assert_eq!(customers[1].discount(), 0.15);
        assert!(customers[1].order_history().is_empty());
        assert_eq!(customers[2].discount(), 0.05);
    }

    #[test]
    fn test_regular_ignores_loyalty_value() {
        let customers = decode("1,Alice,Regular,0.3\n").unwrap();
        assert_eq!(customers[0].discount(), 0.0);
    }

    #[test]
    fn test_encode() {
        let customers = vec![
            Customer::regular(1, "Alice").unwrap().with_history(vec![3, 4]),
            Customer::premium(2, "Bob", 0.15).unwrap(),
        ];
        assert_eq!(
            encode(&customers),
            "ID,Name,Type,LoyaltyPercentage,OrderIDs\n1,Alice,Regular,0,3;4\n2,Bob,Premium,0.15,\n"
        );
    }

    #[test]
    fn test_malformed_rows() {
        let cases = [
            "1,Alice,Regular\n",
            "1,Alice,Gold,0,\n",
            "1,Alice,Premium,lots,\n",
            "1,Alice,Regular,0,1;x\n",
            "1,Alice,Premium,-0.2,\n",
            "1,Alice,Regular,0,\n1,Again,Regular,0,\n",
            "0,Alice,Regular,0,\n",
        ];
        for text in cases {
            assert_eq!(decode(text).unwrap_err().kind(), ErrorKind::FileOperation, "{text}");
        }
    }
}
