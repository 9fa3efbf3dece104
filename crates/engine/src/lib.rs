//! `ipo-engine` — offer-performance scoring engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns scored items.
//! No CLI or IO dependencies.

pub mod analyze;
pub mod columns;
pub mod error;
pub mod model;
pub mod monthkey;
pub mod normalize;
pub mod sales;
pub mod score;
pub mod stock;
pub mod summary;

pub use analyze::run;
pub use error::AnalyzeError;
pub use model::{
    Analysis, LifecycleTier, PriceTier, RawTable, RunSummary, ScoreBand, ScoredItem, Scores,
    COVERAGE_SENTINEL,
};
