//! Report assembly: runs extraction, computes every metric and packs the
//! structured result handed to callers and to the persistence
//! collaborator.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use finsight_core::transaction::{CategorizedTransaction, RawCandidate};
use finsight_extract::{ExtractOptions, extract_transactions};

use crate::burn_rate::{BurnRate, BurnStatus, compute_burn_rate};
use crate::heatmap::{CategoryTotal, HeatmapMonth, category_breakdown, spend_heatmap};
use crate::opportunity::{
    MarketDataProvider, OpportunityCost, OpportunityOptions, project_opportunity_cost,
};
use crate::zombie::{ZombieSubscription, detect_zombies};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub monthly_income: f64,
    pub total_expense: f64,
    pub net_balance: f64,
    /// Savings rate clamped into `[0, 100]` for gauge widgets.
    pub gauge_value: f64,
    pub burn_rate: BurnRate,
    pub opportunity_cost: OpportunityCost,
    pub zombie_subscriptions: Vec<ZombieSubscription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charts {
    pub heatmap: Vec<HeatmapMonth>,
    pub category_breakdown: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub transaction_count: usize,
    pub category_count: usize,
    pub health_status: BurnStatus,
    pub top_category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub transactions: Vec<CategorizedTransaction>,
    pub metrics: Metrics,
    pub charts: Charts,
    pub summary: Summary,
    /// Winning parse strategy, for diagnostics.
    pub strategy: String,
    /// Set when the request was terminal (unreadable input); the report
    /// then carries zero transactions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub extract: ExtractOptions,
    /// Caller-supplied monthly income; estimated from spend when absent.
    pub monthly_income: Option<f64>,
    pub opportunity: OpportunityOptions,
}

/// Run the full pipeline: extract and categorize transactions from
/// `text` (merging `extra` pre-structured candidates), then compute the
/// analytics block.
pub async fn analyze<P: MarketDataProvider + Sync>(
    text: &str,
    extra: &[RawCandidate],
    provider: &P,
    opts: &AnalyzeOptions,
) -> Result<AnalysisReport> {
    let extraction = extract_transactions(text, extra, &opts.extract)?;
    let run_date = opts.extract.run_date;

    let transactions = extraction.transactions;
    let total_expense: f64 = transactions.iter().map(|t| t.amount()).sum();
    // Without a declared income, assume the statement reflects 80% of it.
    let monthly_income = opts
        .monthly_income
        .unwrap_or(total_expense / 0.8);

    let burn_rate = compute_burn_rate(monthly_income, total_expense);
    let gauge_value = burn_rate.savings_rate.clamp(0.0, 100.0);
    let opportunity_cost =
        project_opportunity_cost(provider, monthly_income, run_date, &opts.opportunity).await;
    let zombie_subscriptions = detect_zombies(&transactions);
    let heatmap = spend_heatmap(&transactions);
    let breakdown = category_breakdown(&transactions);

    let summary = Summary {
        transaction_count: transactions.len(),
        category_count: breakdown.len(),
        health_status: burn_rate.status,
        top_category: breakdown.first().map(|c| c.label.clone()),
    };

    Ok(AnalysisReport {
        metrics: Metrics {
            monthly_income,
            total_expense,
            net_balance: monthly_income - total_expense,
            gauge_value,
            burn_rate,
            opportunity_cost,
            zombie_subscriptions,
        },
        charts: Charts {
            heatmap,
            category_breakdown: breakdown,
        },
        summary,
        strategy: extraction.strategy.to_string(),
        failure: extraction.failure,
        transactions,
    })
}

/// Persistence collaborator. The engine is agnostic to how or whether
/// saving succeeds.
pub trait ReportStore {
    fn save(&self, report: &AnalysisReport) -> Result<()>;
}

/// Save through a store, reporting failure as non-critical: the computed
/// analysis is still returned to the caller.
pub fn persist_report(store: &dyn ReportStore, report: &AnalysisReport) {
    if let Err(err) = store.save(report) {
        eprintln!("warning: could not persist analysis report: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::NaiveDate;
    use std::time::Duration;

    struct NoData;

    impl MarketDataProvider for NoData {
        async fn price_at(&self, _symbol: &str, _date: NaiveDate) -> Result<Option<f64>> {
            Ok(None)
        }
    }

    fn opts() -> AnalyzeOptions {
        AnalyzeOptions {
            extract: ExtractOptions {
                run_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
                drift_tolerance: 0.10,
            },
            monthly_income: Some(30_000.0),
            opportunity: OpportunityOptions {
                request_timeout: Duration::from_millis(100),
                overall_deadline: Duration::from_millis(300),
                fallback_annual_return: 0.10,
            },
        }
    }

    const STATEMENT: &str = "\
Kart Limiti: 450.000,00 TL
Harcama Detayi
01/03/2025 MIGROS SANAL MARKET 2.500,00 TL
02/03/2025 STREAMINGCO UYELIK 149,00 TL
05/03/2025 TEKNOSA TAKSIT 3/6 2.000,00 TL (12.000,00 TL)
09/03/2025 STREAMINGCO UYELIK 149,00 TL
12/03/2025 YEMEKSEPETI SIPARIS 450,00 TL
";

    #[tokio::test]
    async fn test_end_to_end_report() {
        let report = analyze(STATEMENT, &[], &NoData, &opts()).await.unwrap();
        assert!(report.failure.is_none());
        assert_eq!(report.summary.transaction_count, 5);
        assert_eq!(report.metrics.monthly_income, 30_000.0);

        // The installment row is reconciled to its monthly figure.
        let teknosa = report
            .transactions
            .iter()
            .find(|t| t.description().contains("TEKNOSA"))
            .unwrap();
        assert!(teknosa.transaction.is_installment);
        assert_eq!(teknosa.transaction.installment_total, Some(6));
        assert_eq!(teknosa.transaction.total_amount, Some(12_000.0));
        assert_eq!(teknosa.amount(), 2_000.0);

        // The limit line never became a transaction.
        assert!(report.transactions.iter().all(|t| t.amount() < 200_000.0));

        // Streaming twice at the same amount: flagged as a zombie.
        assert_eq!(report.metrics.zombie_subscriptions.len(), 1);
        assert_eq!(report.metrics.zombie_subscriptions[0].annual_waste, 1_788.0);

        assert!(report.summary.top_category.is_some());
        assert!(!report.charts.heatmap.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_text_reports_failure() {
        let report = analyze("   ", &[], &NoData, &opts()).await.unwrap();
        assert_eq!(report.summary.transaction_count, 0);
        assert!(report.failure.is_some());
        assert_eq!(report.metrics.total_expense, 0.0);
    }

    #[tokio::test]
    async fn test_store_failure_is_non_critical() {
        struct FailingStore;
        impl ReportStore for FailingStore {
            fn save(&self, _report: &AnalysisReport) -> Result<()> {
                Err(anyhow!("disk full"))
            }
        }
        let report = analyze(STATEMENT, &[], &NoData, &opts()).await.unwrap();
        // Must not panic or alter the report.
        persist_report(&FailingStore, &report);
        assert_eq!(report.summary.transaction_count, 5);
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let report = analyze(STATEMENT, &[], &NoData, &opts()).await.unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["metrics"]["burn_rate"]["burn_day"].is_number());
        assert!(json["charts"]["category_breakdown"].is_array());
        assert_eq!(json["summary"]["transaction_count"], 5);
    }
}
