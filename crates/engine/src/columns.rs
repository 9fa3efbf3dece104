//! Header-to-field resolution over a closed set of known synonyms.
//!
//! Matching is substring containment on normalized text, checked in the
//! priority order of each synonym list. This is a best-effort heuristic,
//! not a schema validator: the mandatory code column falls back to a
//! positional default when nothing matches.

use crate::normalize::normalize_text;

/// Find the first header containing any pattern, patterns checked in order.
///
/// The first pattern with a match wins, so more specific synonyms must come
/// before the generic ones that would shadow them.
pub fn find_column(headers: &[String], patterns: &[&str]) -> Option<usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_text(h)).collect();
    for pattern in patterns {
        let needle = normalize_text(pattern);
        if let Some(i) = normalized.iter().position(|h| h.contains(&needle)) {
            return Some(i);
        }
    }
    None
}

// Synonym lists, in priority order.
const SALES_CODE: &[&str] = &["codigo", "code", "item", "sku"];
const SALES_DESC: &[&str] = &["codigo sbb", "descri", "produto", "product", "nome"];
const SALES_QTY: &[&str] = &[
    "soma de qtd", "quantidade", "qtd", "qty", "volume", "vendas", "unidades",
];
const SALES_AVG_PRICE: &[&str] = &[
    "media de valor", "valor unitario", "preco medio", "preco med", "avg price", "prc med",
];
const SALES_LIST_PRICE: &[&str] =
    &["preco de lista", "preco lista", "list price", "preco tabela"];
const SALES_COST: &[&str] = &["custo unitario", "custo", "cost", "cst med", "custo_med"];
const SALES_REVENUE: &[&str] = &["receita", "revenue", "faturamento", "valor total"];
const SALES_MONTH: &[&str] = &["mes/ano", "mes ano", "mesano", "periodo", "month"];
const SALES_IDENTIFIER: &[&str] = &[
    "ean", "isbn", "ean13", "isbn13", "gtin", "barcode", "cod barras",
    "3 n", "n de item", "no de item", "no item", "num item",
];

const STOCK_CODE: &[&str] = &["n item", "codigo", "code", "item", "sku"];
const STOCK_QTY: &[&str] = &[
    "quantidade disponivel", "disponivel", "estoque", "stock", "saldo",
];
const STOCK_DESC: &[&str] = &["descricao", "descri", "produto"];

/// Resolved field-to-column binding for the sales register.
#[derive(Debug, Clone)]
pub struct SalesColumns {
    pub code: usize,
    pub description: Option<usize>,
    pub qty: Option<usize>,
    pub avg_price: Option<usize>,
    pub list_price: Option<usize>,
    pub cost: Option<usize>,
    pub revenue: Option<usize>,
    pub month: Option<usize>,
    pub identifier: Option<usize>,
}

impl SalesColumns {
    /// Resolve once per file load. The code column falls back to column 0
    /// and the description to column 1 when no synonym matches.
    pub fn resolve(headers: &[String]) -> Self {
        Self {
            code: find_column(headers, SALES_CODE).unwrap_or(0),
            description: find_column(headers, SALES_DESC)
                .or(if headers.len() > 1 { Some(1) } else { None }),
            qty: find_column(headers, SALES_QTY),
            avg_price: find_column(headers, SALES_AVG_PRICE),
            list_price: find_column(headers, SALES_LIST_PRICE),
            cost: find_column(headers, SALES_COST),
            revenue: find_column(headers, SALES_REVENUE),
            month: find_column(headers, SALES_MONTH),
            identifier: find_column(headers, SALES_IDENTIFIER),
        }
    }
}

/// Resolved field-to-column binding for the stock register.
#[derive(Debug, Clone)]
pub struct StockColumns {
    pub code: usize,
    pub qty: Option<usize>,
    pub description: Option<usize>,
}

impl StockColumns {
    pub fn resolve(headers: &[String]) -> Self {
        Self {
            code: find_column(headers, STOCK_CODE).unwrap_or(0),
            qty: find_column(headers, STOCK_QTY),
            description: find_column(headers, STOCK_DESC),
        }
    }
}
