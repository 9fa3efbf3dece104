//! Stock register aggregation: on-hand units summed per product code.

use std::collections::BTreeMap;

use crate::columns::StockColumns;
use crate::model::{RawTable, StockRecord};
use crate::normalize::parse_number;

/// Sum available quantity per code; the first non-empty description wins.
pub fn aggregate_stock(table: &RawTable, cols: &StockColumns) -> BTreeMap<String, StockRecord> {
    let mut by_code: BTreeMap<String, StockRecord> = BTreeMap::new();

    for row in &table.rows {
        let code = table.cell(row, cols.code).trim();
        if code.is_empty() {
            continue;
        }
        let qty = parse_number(cols.qty.map(|i| table.cell(row, i)).unwrap_or(""));
        let description = cols
            .description
            .map(|i| table.cell(row, i))
            .unwrap_or("")
            .to_string();

        let entry = by_code.entry(code.to_string()).or_insert_with(|| StockRecord {
            qty: 0.0,
            description: String::new(),
        });
        entry.qty += qty;
        if entry.description.is_empty() && !description.is_empty() {
            entry.description = description;
        }
    }

    by_code
}
