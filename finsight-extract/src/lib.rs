//! finsight-extract: reconstructs a structured transaction ledger from
//! unstructured statement text.
//!
//! Pipeline: locate the transaction section, run five competing parse
//! strategies over it, score and select one winner, deduplicate, enrich
//! installment rows against the raw text, normalize descriptions and
//! categorize. Every stage is a pure function of its input; nothing is
//! shared across analysis runs.

pub mod enrich;
pub mod installment;
pub mod normalize;
pub mod section;
pub mod strategies;
pub mod tokens;

use anyhow::Result;
use chrono::{Local, NaiveDate};

use finsight_core::transaction::{CategorizedTransaction, RawCandidate};
use finsight_core::category::categorize;

pub use installment::{InstallmentInfo, InstallmentPatterns};
pub use strategies::{ParseStrategy, STRATEGIES, StrategyOutcome};

/// Per-run extraction parameters.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// The analysis run's current date; placeholder for undated rows and
    /// reference point for strategy scoring.
    pub run_date: NaiveDate,
    /// Accepted relative gap between a parsed monthly amount and
    /// `total / count` before the parsed figure is overwritten.
    pub drift_tolerance: f64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            run_date: Local::now().date_naive(),
            drift_tolerance: 0.10,
        }
    }
}

/// Result of one extraction run.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub transactions: Vec<CategorizedTransaction>,
    /// Name of the winning strategy ("none" when nothing could run).
    pub strategy: &'static str,
    /// Terminal failure reason for this request, when the input was
    /// unusable. Never retried.
    pub failure: Option<String>,
}

/// Extract, reconcile and categorize transactions from raw statement
/// text. `extra` carries caller-supplied, already-structured candidates
/// merged with the winning strategy's output before deduplication.
pub fn extract_transactions(
    text: &str,
    extra: &[RawCandidate],
    opts: &ExtractOptions,
) -> Result<Extraction> {
    if let Some(reason) = unreadable_reason(text) {
        return Ok(Extraction {
            transactions: Vec::new(),
            strategy: "none",
            failure: Some(reason),
        });
    }

    let offset = section::locate_transaction_section(text)?;
    let region = &text[offset..];

    let mut outcome = strategies::select_best(region, opts.run_date);
    outcome.candidates.extend(extra.iter().cloned());
    let candidates = strategies::dedupe(outcome.candidates);

    // Enrichment re-scans the full raw text, not just the located
    // region: the line carrying an installment total may sit anywhere.
    let enriched = enrich::enrich_candidates(&candidates, text, opts.drift_tolerance)?;

    let transactions = enriched
        .into_iter()
        .map(|t| {
            let category = categorize(&t.description);
            CategorizedTransaction {
                transaction: t,
                category,
            }
        })
        .collect();

    Ok(Extraction {
        transactions,
        strategy: outcome.strategy,
        failure: None,
    })
}

/// Terminal-condition check for unusable input: empty text, or text so
/// dominated by replacement characters that the upstream PDF decode
/// clearly failed.
fn unreadable_reason(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return Some("statement text is empty".to_string());
    }
    let total = text.chars().count();
    let garbled = text.chars().filter(|c| *c == '\u{FFFD}').count();
    if garbled * 5 > total {
        return Some("statement text is unreadable (garbled extraction)".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_terminal() {
        let out = extract_transactions("   \n ", &[], &ExtractOptions::default()).unwrap();
        assert!(out.transactions.is_empty());
        assert_eq!(out.failure.as_deref(), Some("statement text is empty"));
    }

    #[test]
    fn test_garbled_text_is_terminal() {
        let garbled = "\u{FFFD}\u{FFFD}\u{FFFD}\u{FFFD}ab";
        let out = extract_transactions(garbled, &[], &ExtractOptions::default()).unwrap();
        assert!(out.failure.is_some());
    }

    #[test]
    fn test_extra_candidates_merge_and_dedupe() {
        let opts = ExtractOptions {
            run_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            drift_tolerance: 0.10,
        };
        let text = "Islem Tarihi Aciklama Tutar\n01/03/2025 MIGROS SANAL MARKET 250,00 TL\n";
        let extra = vec![
            RawCandidate {
                date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                description: "MIGROS SANAL MARKET".to_string(),
                amount: 250.0,
                currency: "TRY".to_string(),
                secondary_amount: None,
            },
            RawCandidate {
                date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
                description: "ECZANE YILDIZ".to_string(),
                amount: 75.0,
                currency: "TRY".to_string(),
                secondary_amount: None,
            },
        ];
        let out = extract_transactions(text, &extra, &opts).unwrap();
        // The duplicate extracted/extra MIGROS row collapses to one.
        assert_eq!(out.transactions.len(), 2);
        assert!(
            out.transactions
                .iter()
                .any(|t| t.description() == "ECZANE YILDIZ")
        );
    }

    #[test]
    fn test_amount_bounds_hold_for_accepted_candidates() {
        let opts = ExtractOptions {
            run_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            drift_tolerance: 0.10,
        };
        let text = "\
Harcama Detayi
01/03/2025 KART LIMITI ARTISI 450.000,00 TL
02/03/2025 MIGROS SANAL MARKET 250,00 TL
03/03/2025 IADE MAGAZA -120,00 TL
";
        let out = extract_transactions(text, &[], &opts).unwrap();
        assert!(!out.transactions.is_empty());
        for t in &out.transactions {
            assert!(t.amount() > 0.0 && t.amount() < 200_000.0);
        }
    }
}
