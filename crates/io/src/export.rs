// Scored-result CSV export

use std::io::Write;
use std::path::Path;

use ipo_engine::normalize::round1;
use ipo_engine::{ScoredItem, COVERAGE_SENTINEL};

const HEADERS: &[&str] = &[
    "Codigo",
    "ISBN",
    "Descricao",
    "IPO",
    "Faixa",
    "CategoriaPreco",
    "DescontoPct",
    "Tier",
    "Margem",
    "PrecoMedio",
    "PrecoLista",
    "Custo",
    "Quantidade",
    "Receita",
    "Estoque",
    "MesesEstoque",
    "Tendencia",
    "PrecoPromo",
    "MargemPromo",
];

/// Write scored items as a semicolon-delimited CSV, one row per item.
///
/// Output is UTF-8 with a BOM so that Excel opens the accented labels
/// correctly without an import wizard.
pub fn export_csv<W: Write>(items: &[ScoredItem], mut out: W) -> Result<(), String> {
    out.write_all("\u{feff}".as_bytes()).map_err(|e| e.to_string())?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(out);

    writer.write_record(HEADERS).map_err(|e| e.to_string())?;

    for item in items {
        let record = [
            item.code.clone(),
            item.isbn.clone().unwrap_or_default(),
            display_description(item).to_string(),
            num(item.scores.total),
            item.band.label().to_string(),
            item.price_tier.map(|t| t.label().to_string()).unwrap_or_default(),
            item.discount_pct.map(num).unwrap_or_default(),
            item.lifecycle.label().to_string(),
            num(round1(item.margin_pct)),
            num(round1(item.avg_price)),
            num(round1(item.list_price)),
            num(round1(item.cost)),
            num(item.qty),
            num(item.revenue.round()),
            item.stock.map(num).unwrap_or_default(),
            item.coverage_months.map(coverage).unwrap_or_default(),
            num(item.trend_pct),
            item.promo_price.map(num).unwrap_or_default(),
            item.promo_margin_pct.map(num).unwrap_or_default(),
        ];
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

pub fn export_csv_path(items: &[ScoredItem], path: &Path) -> Result<(), String> {
    let file = std::fs::File::create(path).map_err(|e| e.to_string())?;
    export_csv(items, file)
}

/// Stock-register descriptions tend to be cleaner than sales-register ones.
fn display_description(item: &ScoredItem) -> &str {
    if item.stock_description.is_empty() {
        &item.description
    } else {
        &item.stock_description
    }
}

fn num(n: f64) -> String {
    format!("{n}")
}

fn coverage(months: f64) -> String {
    if months >= 900.0 {
        format!("{COVERAGE_SENTINEL}")
    } else {
        format!("{}", months.round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipo_engine::{LifecycleTier, ScoreBand, Scores};

    fn item(code: &str) -> ScoredItem {
        ScoredItem {
            code: code.to_string(),
            description: "GUIA PRÁTICO".to_string(),
            stock_description: String::new(),
            isbn: Some("9788512345678".to_string()),
            qty: 20.0,
            revenue: 1000.4,
            avg_price: 50.0,
            list_price: 80.0,
            cost: 20.0,
            margin_pct: 60.0,
            velocity: 10.0,
            series: vec![10.0, 10.0],
            stock: Some(30.0),
            coverage_months: Some(3.0),
            scores: Scores {
                margin: 20.0,
                trend: 10.0,
                price: 12.5,
                contribution: 7.0,
                turnover: 20.0,
                total: 69.5,
            },
            price_tier: Some(ipo_engine::PriceTier::Mid),
            discount_pct: Some(37.5),
            lifecycle: LifecycleTier::Healthy,
            band: ScoreBand::Excellent,
            trend_pct: 0.0,
            promo_price: None,
            promo_margin_pct: None,
        }
    }

    fn export_to_string(items: &[ScoredItem]) -> String {
        let mut buf = Vec::new();
        export_csv(items, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_export_starts_with_bom_and_headers() {
        let content = export_to_string(&[item("101")]);
        assert!(content.starts_with('\u{feff}'));
        let first_line = content.trim_start_matches('\u{feff}').lines().next().unwrap();
        assert!(first_line.starts_with("Codigo;ISBN;Descricao;IPO;"));
    }

    #[test]
    fn test_export_row_values() {
        let content = export_to_string(&[item("101")]);
        let row = content.lines().nth(1).unwrap();
        let fields: Vec<&str> = row.split(';').collect();
        assert_eq!(fields[0], "101");
        assert_eq!(fields[1], "9788512345678");
        assert_eq!(fields[3], "69.5");
        assert_eq!(fields[4], "Excelente");
        assert_eq!(fields[5], "Intermediária");
        assert_eq!(fields[6], "37.5");
        assert_eq!(fields[13], "1000", "revenue is rounded to whole units");
        assert_eq!(fields[15], "3");
    }

    #[test]
    fn test_export_rounds_weighted_averages_to_one_decimal() {
        // Weighted averages carry float tails; the export shows one decimal
        let mut it = item("105");
        it.margin_pct = 100.0 / 3.0;
        it.avg_price = 9.9 + 0.1 + 24.0; // 34.00000000000001
        it.list_price = 19.8 / 3.0;
        it.cost = 0.1 + 0.2;

        let content = export_to_string(&[it]);
        let row = content.lines().nth(1).unwrap();
        let fields: Vec<&str> = row.split(';').collect();
        assert_eq!(fields[8], "33.3");
        assert_eq!(fields[9], "34");
        assert_eq!(fields[10], "6.6");
        assert_eq!(fields[11], "0.3");
    }

    #[test]
    fn test_export_absent_fields_are_empty() {
        let mut it = item("102");
        it.isbn = None;
        it.stock = None;
        it.coverage_months = None;
        it.price_tier = None;
        it.discount_pct = None;

        let content = export_to_string(&[it]);
        let row = content.lines().nth(1).unwrap();
        let fields: Vec<&str> = row.split(';').collect();
        assert_eq!(fields[1], "");
        assert_eq!(fields[5], "");
        assert_eq!(fields[6], "");
        assert_eq!(fields[14], "");
        assert_eq!(fields[15], "");
    }

    #[test]
    fn test_export_sentinel_coverage_renders_999() {
        let mut it = item("103");
        it.coverage_months = Some(ipo_engine::COVERAGE_SENTINEL);
        it.lifecycle = LifecycleTier::Clearance;

        let content = export_to_string(&[it]);
        let row = content.lines().nth(1).unwrap();
        let fields: Vec<&str> = row.split(';').collect();
        assert_eq!(fields[15], "999");
        assert_eq!(fields[7], "Liquidação");
    }

    #[test]
    fn test_export_prefers_stock_description() {
        let mut it = item("104");
        it.stock_description = "GUIA PRATICO ED 2".to_string();

        let content = export_to_string(&[it]);
        assert!(content.contains("GUIA PRATICO ED 2"));
        assert!(!content.contains("GUIA PRÁTICO"));
    }
}
