//! Reconciliation and scoring: join sales with stock by exact code, compute
//! months of coverage, the five-factor score, lifecycle tier, and the
//! promotional price policy.

use std::collections::BTreeMap;

use crate::model::{
    LifecycleTier, PriceTier, SalesRecord, ScoreBand, ScoredItem, Scores, StockRecord,
    COVERAGE_SENTINEL,
};
use crate::normalize::round1;

/// Classify by the discount percentage itself, independent of the tier's own
/// scoring thresholds.
pub fn detect_price_tier(discount_pct: f64) -> PriceTier {
    if discount_pct <= 15.0 {
        PriceTier::Economy
    } else if discount_pct <= 40.0 {
        PriceTier::Mid
    } else {
        PriceTier::Premium
    }
}

/// Months of stock at current velocity.
///
/// `COVERAGE_SENTINEL` when stock is positive and velocity is zero; `None`
/// when stock is unknown, or when both stock and velocity are zero (0/0 has
/// no meaning).
pub fn coverage_months(stock: Option<f64>, velocity: f64) -> Option<f64> {
    let stock = stock?;
    if velocity > 0.0 {
        Some(stock / velocity)
    } else if stock > 0.0 {
        Some(COVERAGE_SENTINEL)
    } else {
        None
    }
}

/// Lifecycle tier for an item with known stock. First match wins.
pub fn lifecycle_tier(stock: f64, coverage: Option<f64>, velocity: f64) -> LifecycleTier {
    if coverage.is_some_and(|c| c >= 900.0) || (stock > 50.0 && velocity == 0.0) {
        LifecycleTier::Clearance
    } else if coverage.is_some_and(|c| c > 36.0) {
        LifecycleTier::Aggressive
    } else if coverage.is_some_and(|c| c > 12.0) {
        LifecycleTier::Moderate
    } else {
        LifecycleTier::Healthy
    }
}

/// Suggested promotional price for a non-healthy tier.
pub fn promo_price(
    tier: LifecycleTier,
    cost: f64,
    avg_price: f64,
    coverage: Option<f64>,
) -> Option<f64> {
    let price = match tier {
        // Floor at a thin margin above cost, ceiling at 60% off
        LifecycleTier::Clearance => (cost * 1.05).max(avg_price * 0.4),
        // Deeper discount for worse coverage, bounded to 25-45% off
        LifecycleTier::Aggressive => {
            let c = coverage.unwrap_or(0.0);
            avg_price * (1.0 - (c / 1000.0).clamp(0.25, 0.45))
        }
        LifecycleTier::Moderate => avg_price * 0.85,
        LifecycleTier::Healthy => return None,
    };
    if price == 0.0 {
        None
    } else {
        Some(price)
    }
}

fn margin_factor(margin_pct: f64) -> f64 {
    margin_pct.clamp(0.0, 100.0) / 100.0 * 20.0
}

/// Neutral 10 unless both half-period averages are known and the first is
/// positive. A +50% shift centers a flat trend at the midpoint.
fn trend_factor(qty_p1: Option<f64>, qty_p2: Option<f64>) -> f64 {
    match (qty_p1, qty_p2) {
        (Some(p1), Some(p2)) if p1 > 0.0 => {
            let growth_pct = (p2 - p1) / p1 * 100.0;
            ((growth_pct + 50.0) / 100.0 * 20.0).clamp(0.0, 20.0)
        }
        _ => 10.0,
    }
}

/// Score a discount against a tier's own normal-ceiling/promo-floor band.
///
/// At or below the ceiling scores 20, at or above the floor scores 0,
/// linear in between.
pub fn price_band_score(discount_pct: f64, tier: PriceTier) -> f64 {
    let ceiling = tier.normal_ceiling();
    let floor = tier.promo_floor();
    if discount_pct <= ceiling {
        20.0
    } else if discount_pct >= floor {
        0.0
    } else {
        round1(20.0 * (1.0 - (discount_pct - ceiling) / (floor - ceiling)))
    }
}

/// Tier-aware price factor. Neutral 10 when either price is missing.
fn price_factor(list_price: f64, avg_price: f64) -> (f64, Option<PriceTier>, Option<f64>) {
    if list_price > 0.0 && avg_price > 0.0 {
        let discount_pct = (1.0 - avg_price / list_price) * 100.0;
        let tier = detect_price_tier(discount_pct);
        (
            price_band_score(discount_pct, tier),
            Some(tier),
            Some(round1(discount_pct)),
        )
    } else {
        (10.0, None, None)
    }
}

/// Logarithmic revenue-share factor so top sellers don't saturate the scale.
fn contribution_factor(revenue: f64, total_revenue: f64) -> f64 {
    let share_pct = if total_revenue > 0.0 {
        (revenue / total_revenue * 100.0).max(0.0)
    } else {
        0.0
    };
    ((1.0 + share_pct).ln() * 7.0).clamp(0.0, 20.0)
}

/// Inventory-turn factor: 20 at <=3 months of coverage, 0 at >=24, linear
/// between, neutral 10 when coverage is unknown.
fn turnover_factor(coverage: Option<f64>) -> f64 {
    match coverage {
        None => 10.0,
        Some(c) if c <= 3.0 => 20.0,
        Some(c) if c >= 24.0 => 0.0,
        Some(c) => 20.0 - (c - 3.0) / 21.0 * 20.0,
    }
}

fn trend_pct(qty_p1: Option<f64>, qty_p2: Option<f64>) -> f64 {
    match (qty_p1, qty_p2) {
        (Some(p1), Some(p2)) if p1 > 0.0 => round1((p2 - p1) / p1 * 100.0),
        (_, Some(p2)) if p2 > 0.0 => 100.0,
        _ => 0.0,
    }
}

/// Join each sales record with its stock position and score it.
///
/// Stock lookup is by exact code; an absent entry means unknown coverage,
/// not zero. Items keep the code-sorted order of the sales aggregation.
pub fn score_items(
    sales: Vec<SalesRecord>,
    stock: &BTreeMap<String, StockRecord>,
) -> Vec<ScoredItem> {
    let total_revenue: f64 = sales.iter().map(|s| s.revenue).sum();

    sales
        .into_iter()
        .map(|rec| {
            let stock_rec = stock.get(&rec.code);
            let on_hand = stock_rec.map(|s| s.qty);
            let stock_description = stock_rec
                .map(|s| s.description.clone())
                .unwrap_or_default();

            let coverage = coverage_months(on_hand, rec.velocity);

            let margin = round1(margin_factor(rec.margin_pct));
            let trend = round1(trend_factor(rec.qty_p1, rec.qty_p2));
            let (price_raw, price_tier, discount_pct) =
                price_factor(rec.list_price, rec.avg_price);
            let price = round1(price_raw);
            let contribution = round1(contribution_factor(rec.revenue, total_revenue));
            let turnover = round1(turnover_factor(coverage));
            let total = round1(margin + trend + price + contribution + turnover);

            // Unknown stock defaults to healthy: no evidence of overstock
            let lifecycle = match on_hand {
                Some(units) => lifecycle_tier(units, coverage, rec.velocity),
                None => LifecycleTier::Healthy,
            };

            let pp = promo_price(lifecycle, rec.cost, rec.avg_price, coverage);
            let promo_margin_pct = pp
                .filter(|p| *p > 0.0)
                .map(|p| round1((p - rec.cost) / p * 100.0));

            ScoredItem {
                trend_pct: trend_pct(rec.qty_p1, rec.qty_p2),
                code: rec.code,
                description: rec.description,
                stock_description,
                isbn: rec.isbn,
                qty: rec.qty,
                revenue: rec.revenue,
                avg_price: rec.avg_price,
                list_price: rec.list_price,
                cost: rec.cost,
                margin_pct: rec.margin_pct,
                velocity: rec.velocity,
                series: rec.series,
                stock: on_hand,
                coverage_months: coverage,
                scores: Scores {
                    margin,
                    trend,
                    price,
                    contribution,
                    turnover,
                    total,
                },
                price_tier,
                discount_pct,
                lifecycle,
                band: ScoreBand::for_score(total),
                promo_price: pp.map(round1),
                promo_margin_pct,
            }
        })
        .collect()
}
