//! Sales register aggregation: fold raw rows into one record per product
//! code, with a month-aligned quantity series and trend inputs.

use std::collections::{BTreeMap, BTreeSet};

use crate::columns::SalesColumns;
use crate::model::{RawTable, SalesRecord};
use crate::monthkey::parse_month_year;
use crate::normalize::{extract_isbn, parse_number};

/// Per-code accumulator. Weighted sums use quantity as the weight, so a
/// record whose total quantity is zero ends with zero averages, not NaN.
#[derive(Default)]
struct Acc {
    description: String,
    qty: f64,
    revenue: f64,
    price_weighted: f64,
    list_weighted: f64,
    cost_weighted: f64,
    rows: usize,
    isbn: Option<String>,
    monthly: BTreeMap<String, f64>,
}

pub struct SalesAggregation {
    /// One record per distinct code, sorted by code.
    pub items: Vec<SalesRecord>,
    /// Global sorted set of detected month keys.
    pub months: Vec<String>,
}

/// Fold all sales rows. Rows with an empty code cell are skipped.
pub fn aggregate_sales(table: &RawTable, cols: &SalesColumns) -> SalesAggregation {
    let mut groups: BTreeMap<String, Acc> = BTreeMap::new();
    let mut month_set: BTreeSet<String> = BTreeSet::new();

    for row in &table.rows {
        let code = table.cell(row, cols.code).trim();
        if code.is_empty() {
            continue;
        }

        let opt = |c: Option<usize>| c.map(|i| table.cell(row, i)).unwrap_or("");
        let qty = parse_number(opt(cols.qty));
        let price = parse_number(opt(cols.avg_price));
        let list = parse_number(opt(cols.list_price));
        let cost = parse_number(opt(cols.cost));

        // Explicit revenue column, falling back to qty x price when the
        // column is missing or its cell parses to zero.
        let mut revenue = parse_number(opt(cols.revenue));
        if revenue == 0.0 {
            revenue = qty * price;
        }

        let month_key = cols.month.and_then(|i| parse_month_year(table.cell(row, i)));
        if let Some(ref key) = month_key {
            month_set.insert(key.clone());
        }

        // Identifier fallback chain: explicit column, then the code field,
        // then every column of the row in header order.
        let isbn = extract_isbn(opt(cols.identifier))
            .or_else(|| extract_isbn(code))
            .or_else(|| {
                (0..table.headers.len()).find_map(|i| extract_isbn(table.cell(row, i)))
            });

        let entry = groups.entry(code.to_string()).or_default();
        if entry.rows == 0 {
            entry.description = opt(cols.description).to_string();
        }
        entry.qty += qty;
        entry.revenue += revenue;
        entry.price_weighted += price * qty;
        entry.list_weighted += list * qty;
        entry.cost_weighted += cost * qty;
        entry.rows += 1;
        if entry.isbn.is_none() {
            entry.isbn = isbn;
        }
        if let Some(key) = month_key {
            *entry.monthly.entry(key).or_insert(0.0) += qty;
        }
    }

    let months: Vec<String> = month_set.into_iter().collect();
    // Velocity denominator: assume a year of data when no month column exists
    let n_months = if months.is_empty() { 12.0 } else { months.len() as f64 };

    // Half-period split for trend detection: last ceil(n/2) months vs the
    // first ceil(n/2), overlapping by one when n is odd.
    let half = (months.len() + 1) / 2;
    let first_half = &months[..half.min(months.len())];
    let second_half = &months[months.len().saturating_sub(half)..];

    let items = groups
        .into_iter()
        .map(|(code, acc)| {
            let series: Vec<f64> = months
                .iter()
                .map(|m| acc.monthly.get(m).copied().unwrap_or(0.0))
                .collect();

            let half_avg = |keys: &[String]| -> Option<f64> {
                if keys.is_empty() {
                    return None;
                }
                let sum: f64 = keys
                    .iter()
                    .map(|m| acc.monthly.get(m).copied().unwrap_or(0.0))
                    .sum();
                Some(sum / keys.len() as f64)
            };

            let (avg_price, list_price, cost) = if acc.qty > 0.0 {
                (
                    acc.price_weighted / acc.qty,
                    acc.list_weighted / acc.qty,
                    acc.cost_weighted / acc.qty,
                )
            } else {
                (0.0, 0.0, 0.0)
            };

            let margin_pct = if acc.price_weighted > 0.0 {
                (acc.price_weighted - acc.cost_weighted) / acc.price_weighted * 100.0
            } else {
                0.0
            };

            SalesRecord {
                code,
                description: acc.description,
                qty: acc.qty,
                revenue: acc.revenue,
                avg_price,
                list_price,
                cost,
                margin_pct,
                velocity: acc.qty / n_months,
                isbn: acc.isbn,
                series,
                qty_p1: half_avg(first_half),
                qty_p2: half_avg(second_half),
            }
        })
        .collect();

    SalesAggregation { items, months }
}
