//! Portfolio-level reductions over the scored set.

use crate::model::{LifecycleTier, RunSummary, ScoredItem, TierCounts};

/// Compute the run summary. Empty input yields `None`.
pub fn compute_summary(items: &[ScoredItem]) -> Option<RunSummary> {
    if items.is_empty() {
        return None;
    }

    let n = items.len() as f64;
    let total_revenue: f64 = items.iter().map(|i| i.revenue).sum();
    let avg_score = items.iter().map(|i| i.scores.total).sum::<f64>() / n;
    let avg_margin_pct = items.iter().map(|i| i.margin_pct).sum::<f64>() / n;

    let with_stock: Vec<&ScoredItem> = items.iter().filter(|i| i.stock.is_some()).collect();
    let mut tier_counts = TierCounts::default();
    let mut stock_units = 0.0;
    let mut locked_capital = 0.0;
    let mut promo_revenue_potential = 0.0;
    for item in &with_stock {
        tier_counts.bump(item.lifecycle);
        let units = item.stock.unwrap_or(0.0);
        stock_units += units;
        if item.lifecycle != LifecycleTier::Healthy {
            locked_capital += units * item.cost;
        }
        if let Some(pp) = item.promo_price {
            promo_revenue_potential += units * pp;
        }
    }

    let pct_revenue_above_45 = if total_revenue > 0.0 {
        items
            .iter()
            .filter(|i| i.scores.total >= 45.0)
            .map(|i| i.revenue)
            .sum::<f64>()
            / total_revenue
            * 100.0
    } else {
        0.0
    };

    Some(RunSummary {
        items: items.len(),
        items_with_stock: with_stock.len(),
        items_with_identifier: items.iter().filter(|i| i.isbn.is_some()).count(),
        total_revenue,
        avg_score,
        avg_margin_pct,
        stock_units,
        locked_capital,
        promo_revenue_potential,
        pct_revenue_above_45,
        tier_counts,
    })
}
