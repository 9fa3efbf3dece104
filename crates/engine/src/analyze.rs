//! Pipeline entry point: resolve columns, filter to the trailing months,
//! aggregate, join, score, summarize. One synchronous unit of work per run;
//! re-running fully recomputes from the raw rows.

use std::collections::BTreeSet;

use crate::columns::{SalesColumns, StockColumns};
use crate::error::AnalyzeError;
use crate::model::{Analysis, AnalysisMeta, RawTable};
use crate::monthkey::parse_month_year;
use crate::sales::aggregate_sales;
use crate::score::score_items;
use crate::stock::aggregate_stock;
use crate::summary::compute_summary;

/// Run the full analysis. `months_back` of 0 means all detected months.
pub fn run(
    sales: &RawTable,
    stock: Option<&RawTable>,
    months_back: u32,
) -> Result<Analysis, AnalyzeError> {
    if sales.rows.is_empty() {
        return Err(AnalyzeError::NoSalesRows);
    }

    let cols = SalesColumns::resolve(&sales.headers);

    // Detect the global month set on the raw rows, before any filtering
    let raw_months: Vec<String> = match cols.month {
        Some(i) => sales
            .rows
            .iter()
            .filter_map(|row| parse_month_year(sales.cell(row, i)))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        None => Vec::new(),
    };
    let total_months = raw_months.len();

    // Trailing-months filter applies to raw rows; rows without a parsable
    // month key are dropped while the filter is active
    let filtered: RawTable;
    let table = if months_back > 0 && raw_months.len() > months_back as usize {
        let active: BTreeSet<&String> =
            raw_months[raw_months.len() - months_back as usize..].iter().collect();
        let month_col = cols.month.unwrap_or(0);
        filtered = RawTable::new(
            sales.headers.clone(),
            sales
                .rows
                .iter()
                .filter(|row| {
                    parse_month_year(sales.cell(row, month_col))
                        .is_some_and(|key| active.contains(&key))
                })
                .cloned()
                .collect(),
        );
        &filtered
    } else {
        sales
    };

    let aggregation = aggregate_sales(table, &cols);

    let stock_map = match stock {
        Some(t) => {
            let stock_cols = StockColumns::resolve(&t.headers);
            aggregate_stock(t, &stock_cols)
        }
        None => Default::default(),
    };

    let items = score_items(aggregation.items, &stock_map);
    let summary = compute_summary(&items);

    Ok(Analysis {
        meta: AnalysisMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            months_back,
        },
        months: aggregation.months,
        total_months,
        items,
        summary,
    })
}
