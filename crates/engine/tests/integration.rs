//! End-to-end pipeline tests over realistic register extracts.

use ipo_engine::model::{LifecycleTier, RawTable};
use ipo_engine::run;

fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable::new(
        headers.iter().map(|s| s.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect(),
    )
}

fn sales_fixture() -> RawTable {
    table(
        &["Código", "Descrição", "Qtd", "Preço Médio", "Preço Lista", "Custo", "Mes/Ano", "Receita"],
        &[
            &["A1", "Livro A", "10", "R$ 50,00", "R$ 100,00", "20", "12024", ""],
            &["A1", "Livro A", "10", "50", "100", "20", "22024", ""],
        ],
    )
}

#[test]
fn two_month_sales_without_stock() {
    let analysis = run(&sales_fixture(), None, 0).unwrap();

    assert_eq!(analysis.total_months, 2);
    assert_eq!(analysis.months, vec!["202401", "202402"]);
    assert_eq!(analysis.items.len(), 1);

    let it = &analysis.items[0];
    assert_eq!(it.code, "A1");
    assert_eq!(it.qty, 20.0);
    assert_eq!(it.avg_price, 50.0);
    assert_eq!(it.list_price, 100.0);
    assert_eq!(it.cost, 20.0);
    assert_eq!(it.margin_pct, 60.0);
    assert_eq!(it.series, vec![10.0, 10.0]);
    assert_eq!(it.trend_pct, 0.0);

    // No stock register: coverage unknown, tier defaults to healthy
    assert_eq!(it.stock, None);
    assert_eq!(it.coverage_months, None);
    assert_eq!(it.lifecycle, LifecycleTier::Healthy);
    assert_eq!(it.promo_price, None);

    let summary = analysis.summary.as_ref().unwrap();
    assert_eq!(summary.items, 1);
    assert_eq!(summary.items_with_stock, 0);
    assert_eq!(summary.total_revenue, 1000.0);
}

#[test]
fn stock_join_by_exact_code() {
    let stock = table(
        &["Nº Item", "Quantidade Disponível", "Descrição"],
        &[
            &["A1", "600", "Livro A (estoque)"],
            &["ZZ", "5", "Sem vendas"],
        ],
    );
    let analysis = run(&sales_fixture(), Some(&stock), 0).unwrap();

    let it = &analysis.items[0];
    assert_eq!(it.stock, Some(600.0));
    // velocity = 20 qty / 2 months = 10 -> 60 months of coverage
    assert_eq!(it.coverage_months, Some(60.0));
    assert_eq!(it.lifecycle, LifecycleTier::Aggressive);
    assert_eq!(it.stock_description, "Livro A (estoque)");
    // 60/1000 clamps to the 25% floor: 50 * 0.75
    assert_eq!(it.promo_price, Some(37.5));

    // Stock-only codes do not produce items
    assert_eq!(analysis.items.len(), 1);

    let summary = analysis.summary.as_ref().unwrap();
    assert_eq!(summary.items_with_stock, 1);
    assert_eq!(summary.stock_units, 600.0);
    assert_eq!(summary.tier_counts.aggressive, 1);
    // 600 units x cost 20
    assert_eq!(summary.locked_capital, 12000.0);
}

#[test]
fn score_invariant_holds_across_portfolio() {
    let sales = table(
        &["Código", "Descrição", "Qtd", "Preço Médio", "Preço Lista", "Custo", "Mes/Ano"],
        &[
            &["A1", "a", "10", "50", "100", "20", "12024"],
            &["B2", "b", "200", "9,90", "12,00", "8,50", "12024"],
            &["B2", "b", "150", "9,90", "12,00", "8,50", "22024"],
            &["C3", "c", "0", "0", "0", "0", "22024"],
            &["D4", "d", "3", "199,00", "390,00", "60,00", "22024"],
        ],
    );
    let stock = table(
        &["Nº Item", "Disponível"],
        &[&["A1", "2"], &["B2", "900"], &["C3", "80"]],
    );
    let analysis = run(&sales, Some(&stock), 0).unwrap();
    assert_eq!(analysis.items.len(), 4);

    for it in &analysis.items {
        let s = it.scores;
        for sub in [s.margin, s.trend, s.price, s.contribution, s.turnover] {
            assert!((0.0..=20.0).contains(&sub), "{}: {sub} out of range", it.code);
        }
        let sum = s.margin + s.trend + s.price + s.contribution + s.turnover;
        let drift = (s.total - ipo_engine::normalize::round1(sum)).abs();
        assert!(drift < 1e-9, "{}: total != sum of sub-scores", it.code);
        assert!((0.0..=100.0).contains(&s.total));
    }

    // C3 sold nothing but sits on 80 units: clearance
    let c3 = analysis.items.iter().find(|i| i.code == "C3").unwrap();
    assert_eq!(c3.lifecycle, LifecycleTier::Clearance);
}

#[test]
fn rerun_is_deterministic() {
    let stock = table(&["Nº Item", "Disponível"], &[&["A1", "600"]]);
    let a = run(&sales_fixture(), Some(&stock), 0).unwrap();
    let b = run(&sales_fixture(), Some(&stock), 0).unwrap();

    // Everything except the run timestamp must be byte-identical
    let items_a = serde_json::to_string(&a.items).unwrap();
    let items_b = serde_json::to_string(&b.items).unwrap();
    assert_eq!(items_a, items_b);
    let summary_a = serde_json::to_string(&a.summary).unwrap();
    let summary_b = serde_json::to_string(&b.summary).unwrap();
    assert_eq!(summary_a, summary_b);
    assert_eq!(a.months, b.months);
}
