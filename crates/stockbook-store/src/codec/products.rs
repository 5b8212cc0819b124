//! Products table: `ID,Name,Price,Cost,Quantity`.

use std::collections::HashSet;

use stockbook_core::Product;

use super::{data_lines, render};
use crate::config::PRODUCTS_FILE;
use crate::error::StoreResult;

pub const HEADER: &str = "ID,Name,Price,Cost,Quantity";
const TOKEN: &str = "ID";

pub fn decode(text: &str) -> StoreResult<Vec<Product>> {
    let mut products = Vec::new();
    let mut seen = HashSet::new();

    for line in data_lines(PRODUCTS_FILE, text, TOKEN) {
        let fields = line.fields();
        line.expect_fields(&fields, 5, 5)?;

        let id: u32 = line.parse("product id", fields[0])?;
        let price = line.parse_money("price", fields[2])?;
        let cost = line.parse_money("cost", fields[3])?;
        let quantity: i64 = line.parse("quantity", fields[4])?;

        let product =
            Product::new(id, fields[1], price, cost, quantity).map_err(|e| line.rejected(e))?;
        if !seen.insert(id) {
            return Err(line.error(format!("duplicate product id {}", id)));
        }
        products.push(product);
    }

    Ok(products)
}

pub fn encode(products: &[Product]) -> String {
    render(
        HEADER,
        products.iter().map(|p| {
            [
                p.id().to_string(),
                p.name().to_string(),
                p.price().to_decimal_string(),
                p.cost().to_decimal_string(),
                p.quantity().to_string(),
            ]
            .join(",")
        }),
    )
}
