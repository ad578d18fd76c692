//! Transaction records at each pipeline stage.
//!
//! Each stage produces a new record type rather than mutating the previous
//! stage's output, so every stage stays independently testable:
//! `RawCandidate` (strategy output) -> `EnrichedTransaction` (installment
//! reconciliation + normalized description) -> `CategorizedTransaction`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Upper bound for a plausible single transaction amount. Figures at or
/// above this are almost always card limits or statement balances.
pub const MAX_AMOUNT: f64 = 200_000.0;

/// Maximum visible description length; longer spans are clamped.
pub const MAX_DESCRIPTION_LEN: usize = 80;

/// Minimum description length for a candidate to survive deduplication.
pub const MIN_DESCRIPTION_LEN: usize = 2;

/// A transaction candidate produced by a single parse strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub date: NaiveDate,
    /// Unnormalized description span, clamped to 80 chars.
    pub description: String,
    /// The strategy's best single-amount guess. Positive = spend.
    pub amount: f64,
    pub currency: String,
    /// A second amount found near an installment-flagged row, candidate
    /// for the total purchase price. Only the proximity strategy sets it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_amount: Option<f64>,
}

impl RawCandidate {
    /// True when the amount sits inside the plausible transaction range.
    pub fn amount_in_range(&self) -> bool {
        self.amount > 0.0 && self.amount < MAX_AMOUNT
    }
}

/// A candidate after installment reconciliation and description cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    pub date: NaiveDate,
    /// Description with installment notation stripped.
    pub description: String,
    /// Monthly charge for installments, full charge otherwise.
    pub amount: f64,
    pub currency: String,
    pub is_installment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installment_current: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installment_total: Option<u32>,
    /// Full purchase price when recoverable for an installment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    /// Description exactly as the winning strategy produced it.
    pub original_description: String,
}

impl EnrichedTransaction {
    /// Plain (non-installment) transaction carrying the candidate through.
    pub fn plain(c: &RawCandidate, normalized_description: String) -> Self {
        Self {
            date: c.date,
            description: normalized_description,
            amount: c.amount,
            currency: c.currency.clone(),
            is_installment: false,
            installment_current: None,
            installment_total: None,
            total_amount: None,
            original_description: c.description.clone(),
        }
    }
}

/// Final record handed to the analytics pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedTransaction {
    #[serde(flatten)]
    pub transaction: EnrichedTransaction,
    pub category: Category,
}

impl CategorizedTransaction {
    pub fn amount(&self) -> f64 {
        self.transaction.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.transaction.date
    }

    pub fn description(&self) -> &str {
        &self.transaction.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(amount: f64) -> RawCandidate {
        RawCandidate {
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            description: "MIGROS SANAL MARKET".to_string(),
            amount,
            currency: "TRY".to_string(),
            secondary_amount: None,
        }
    }

    #[test]
    fn test_amount_range() {
        assert!(candidate(149.90).amount_in_range());
        assert!(!candidate(0.0).amount_in_range());
        assert!(!candidate(-35.0).amount_in_range());
        assert!(!candidate(200_000.0).amount_in_range());
        assert!(candidate(199_999.99).amount_in_range());
    }

    #[test]
    fn test_plain_enrichment_copies_fields() {
        let c = candidate(149.90);
        let e = EnrichedTransaction::plain(&c, "MIGROS SANAL MARKET".to_string());
        assert!(!e.is_installment);
        assert_eq!(e.amount, 149.90);
        assert_eq!(e.original_description, c.description);
        assert_eq!(e.total_amount, None);
    }

    #[test]
    fn test_categorized_serializes_flat() {
        let c = candidate(42.0);
        let e = EnrichedTransaction::plain(&c, c.description.clone());
        let t = CategorizedTransaction {
            transaction: e,
            category: Category::Groceries,
        };
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["category"], "groceries");
        assert_eq!(json["amount"], 42.0);
    }
}
