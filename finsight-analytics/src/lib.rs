//! Financial analytics over categorized transactions: burn rate,
//! opportunity cost projections, zombie subscription detection, spending
//! heatmaps, and the assembled analysis report.

pub mod burn_rate;
pub mod heatmap;
pub mod opportunity;
pub mod report;
pub mod zombie;

pub use burn_rate::{BurnRate, BurnStatus, compute_burn_rate};
pub use heatmap::{CategoryTotal, HeatmapDay, HeatmapMonth, category_breakdown, spend_heatmap};
pub use opportunity::{
    MarketDataProvider, OpportunityCost, OpportunityOptions, YahooMarketData,
    project_opportunity_cost,
};
pub use report::{AnalysisReport, AnalyzeOptions, ReportStore, analyze, persist_report};
pub use zombie::{ZombieSeverity, ZombieSubscription, detect_zombies};
