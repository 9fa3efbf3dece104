use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A header-keyed table of string cells, one per input file.
///
/// Rows are positional; the column resolver maps semantic fields to indices
/// once per load. Cells hold raw text — all numeric interpretation goes
/// through the normalizer.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Cell text, empty when the row is short.
    pub fn cell<'a>(&self, row: &'a [String], col: usize) -> &'a str {
        row.get(col).map(String::as_str).unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// One product as seen by the sales register, folded over all its rows.
#[derive(Debug, Clone, Serialize)]
pub struct SalesRecord {
    pub code: String,
    pub description: String,
    /// Cumulative units sold.
    pub qty: f64,
    /// Cumulative revenue.
    pub revenue: f64,
    /// Quantity-weighted average unit price. Zero when total qty is zero.
    pub avg_price: f64,
    pub list_price: f64,
    pub cost: f64,
    /// Weighted margin percentage over the observed period.
    pub margin_pct: f64,
    /// Average units per month over the detected period.
    pub velocity: f64,
    /// 13-digit book identifier (978/979), when one could be found.
    pub isbn: Option<String>,
    /// Monthly quantities aligned index-for-index to the global month list.
    pub series: Vec<f64>,
    /// Average monthly quantity over the first half of the period.
    pub qty_p1: Option<f64>,
    /// Average monthly quantity over the second half of the period.
    pub qty_p2: Option<f64>,
}

/// One product as seen by the stock register.
#[derive(Debug, Clone, Serialize)]
pub struct StockRecord {
    pub qty: f64,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Coverage value used when stock exists but velocity is zero. Numeric so
/// that sorting by coverage still places these above every finite value.
pub const COVERAGE_SENTINEL: f64 = 999.0;

/// Static price-positioning band, classified by normal discount-off-list
/// depth. Makes discount scoring tier-relative rather than absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Economy,
    Mid,
    Premium,
}

impl PriceTier {
    /// Discount ceiling still considered normal pricing for this tier.
    pub fn normal_ceiling(&self) -> f64 {
        match self {
            Self::Economy => 15.0,
            Self::Mid => 40.0,
            Self::Premium => 58.0,
        }
    }

    /// Discount floor at which the product is effectively in promotion.
    pub fn promo_floor(&self) -> f64 {
        match self {
            Self::Economy => 20.0,
            Self::Mid => 45.0,
            Self::Premium => 65.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Economy => "Econômica",
            Self::Mid => "Intermediária",
            Self::Premium => "Premium",
        }
    }
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Inventory-health urgency, first match wins in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleTier {
    Clearance,
    Aggressive,
    Moderate,
    Healthy,
}

impl LifecycleTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Clearance => "Liquidação",
            Self::Aggressive => "Promo Agressiva",
            Self::Moderate => "Promo Moderada",
            Self::Healthy => "Saudável",
        }
    }
}

impl std::fmt::Display for LifecycleTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Display band for the total score, highest qualifying threshold wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Healthy,
    Attention,
    Critical,
    Unviable,
}

impl ScoreBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 60.0 {
            Self::Excellent
        } else if score >= 45.0 {
            Self::Healthy
        } else if score >= 30.0 {
            Self::Attention
        } else if score >= 15.0 {
            Self::Critical
        } else {
            Self::Unviable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excelente",
            Self::Healthy => "Saudável",
            Self::Attention => "Atenção",
            Self::Critical => "Crítico",
            Self::Unviable => "Inviável",
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The five sub-scores, each clamped to [0, 20] and rounded to one decimal.
/// `total` is their exact sum.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Scores {
    pub margin: f64,
    pub trend: f64,
    pub price: f64,
    pub contribution: f64,
    pub turnover: f64,
    pub total: f64,
}

/// A sales record joined with its stock position and fully scored.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredItem {
    pub code: String,
    pub description: String,
    /// Description carried by the stock register, preferred for display.
    pub stock_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    pub qty: f64,
    pub revenue: f64,
    pub avg_price: f64,
    pub list_price: f64,
    pub cost: f64,
    pub margin_pct: f64,
    pub velocity: f64,
    pub series: Vec<f64>,
    /// On-hand units; absent when no stock register was provided or the
    /// code never appears in it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<f64>,
    /// Months of coverage at current velocity; `COVERAGE_SENTINEL` when
    /// stock is positive and velocity is zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_months: Option<f64>,
    pub scores: Scores,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_tier: Option<PriceTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_pct: Option<f64>,
    pub lifecycle: LifecycleTier,
    pub band: ScoreBand,
    /// Second-half vs first-half quantity change, percent.
    pub trend_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_margin_pct: Option<f64>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

/// Item counts per lifecycle tier, over items with known stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, serde::Deserialize)]
pub struct TierCounts {
    pub clearance: usize,
    pub aggressive: usize,
    pub moderate: usize,
    pub healthy: usize,
}

impl TierCounts {
    pub fn bump(&mut self, tier: LifecycleTier) {
        match tier {
            LifecycleTier::Clearance => self.clearance += 1,
            LifecycleTier::Aggressive => self.aggressive += 1,
            LifecycleTier::Moderate => self.moderate += 1,
            LifecycleTier::Healthy => self.healthy += 1,
        }
    }
}

/// Portfolio-level aggregates for one analysis run.
#[derive(Debug, Clone, Serialize, serde::Deserialize)]
pub struct RunSummary {
    pub items: usize,
    pub items_with_stock: usize,
    pub items_with_identifier: usize,
    pub total_revenue: f64,
    /// Arithmetic mean of the total score across all items.
    pub avg_score: f64,
    pub avg_margin_pct: f64,
    pub stock_units: f64,
    /// Cost value of stock sitting in non-healthy tiers.
    pub locked_capital: f64,
    /// Stock units × promo price, where a promo price exists.
    pub promo_revenue_potential: f64,
    /// Share of revenue contributed by items scoring >= 45.
    pub pct_revenue_above_45: f64,
    pub tier_counts: TierCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMeta {
    pub engine_version: String,
    pub run_at: String,
    pub months_back: u32,
}

/// Complete result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub meta: AnalysisMeta,
    /// Sorted month keys that survived the trailing-months filter.
    pub months: Vec<String>,
    /// Distinct month keys detected in the raw file, before filtering.
    pub total_months: usize,
    pub items: Vec<ScoredItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
}
