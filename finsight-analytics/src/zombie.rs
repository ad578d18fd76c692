//! Zombie-subscription detection: small fixed charges that recur across
//! the statement, typically unnoticed subscriptions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use finsight_core::transaction::CategorizedTransaction;

/// A recurring charge only counts as a zombie below this amount; larger
/// repeats are rent-sized obligations the user knows about.
const MAX_ZOMBIE_AMOUNT: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZombieSeverity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZombieSubscription {
    /// Representative description (first occurrence).
    pub name: String,
    pub amount: f64,
    pub occurrences: usize,
    /// `amount * 12`: what a year of not cancelling costs.
    pub annual_waste: f64,
    pub severity: ZombieSeverity,
}

/// Group transactions by (digit/punctuation-stripped description prefix,
/// amount) and flag groups recurring at least twice at a small amount.
pub fn detect_zombies(transactions: &[CategorizedTransaction]) -> Vec<ZombieSubscription> {
    let mut groups: HashMap<(String, i64), (String, usize, f64)> = HashMap::new();
    for t in transactions {
        let amount = t.amount();
        if amount <= 0.0 || amount > MAX_ZOMBIE_AMOUNT {
            continue;
        }
        let key = (normalized_key(t.description()), (amount * 100.0).round() as i64);
        let entry = groups
            .entry(key)
            .or_insert_with(|| (t.description().to_string(), 0, amount));
        entry.1 += 1;
    }

    let mut out: Vec<ZombieSubscription> = groups
        .into_values()
        .filter(|(_, count, _)| *count >= 2)
        .map(|(name, occurrences, amount)| {
            let annual_waste = amount * 12.0;
            let severity = if annual_waste > 2000.0 {
                ZombieSeverity::High
            } else if annual_waste > 500.0 {
                ZombieSeverity::Medium
            } else {
                ZombieSeverity::Low
            };
            ZombieSubscription {
                name,
                amount,
                occurrences,
                annual_waste,
                severity,
            }
        })
        .collect();
    // HashMap iteration order is arbitrary; fix the output order.
    out.sort_by(|a, b| {
        b.annual_waste
            .partial_cmp(&a.annual_waste)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    out
}

/// Lowercased description with digits and punctuation stripped, clipped
/// to a 12-char prefix: "SPOTIFY *9F2K" and "SPOTIFY *881A" group
/// together.
fn normalized_key(description: &str) -> String {
    description
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(12)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use finsight_core::category::Category;
    use finsight_core::transaction::{EnrichedTransaction, RawCandidate};

    fn txn(desc: &str, amount: f64, day: u32) -> CategorizedTransaction {
        let c = RawCandidate {
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            description: desc.to_string(),
            amount,
            currency: "TRY".to_string(),
            secondary_amount: None,
        };
        CategorizedTransaction {
            transaction: EnrichedTransaction::plain(&c, desc.to_string()),
            category: Category::Subscriptions,
        }
    }

    #[test]
    fn test_streaming_service_flagged_medium() {
        let txns = vec![
            txn("STREAMINGCO", 149.0, 1),
            txn("STREAMINGCO", 149.0, 8),
            txn("STREAMINGCO", 149.0, 15),
        ];
        let zombies = detect_zombies(&txns);
        assert_eq!(zombies.len(), 1);
        let z = &zombies[0];
        assert_eq!(z.occurrences, 3);
        assert_eq!(z.annual_waste, 1788.0);
        assert_eq!(z.severity, ZombieSeverity::Medium);
    }

    #[test]
    fn test_reference_codes_group_together() {
        let txns = vec![
            txn("SPOTIFY *9F2K", 59.99, 2),
            txn("SPOTIFY *881A", 59.99, 9),
        ];
        let zombies = detect_zombies(&txns);
        assert_eq!(zombies.len(), 1);
        assert_eq!(zombies[0].occurrences, 2);
        assert_eq!(zombies[0].severity, ZombieSeverity::Medium);
    }

    #[test]
    fn test_single_charge_not_recurring() {
        let zombies = detect_zombies(&[txn("NETFLIX", 99.0, 3)]);
        assert!(zombies.is_empty());
    }

    #[test]
    fn test_large_repeats_ignored() {
        let txns = vec![txn("KIRA ODEMESI", 15_000.0, 1), txn("KIRA ODEMESI", 15_000.0, 28)];
        assert!(detect_zombies(&txns).is_empty());
    }

    #[test]
    fn test_severity_bands() {
        // 170 * 12 = 2040 > 2000 -> high
        let high = detect_zombies(&[txn("GYM CLUB", 170.0, 1), txn("GYM CLUB", 170.0, 15)]);
        assert_eq!(high[0].severity, ZombieSeverity::High);
        // 40 * 12 = 480 <= 500 -> low
        let low = detect_zombies(&[txn("ICLOUD", 40.0, 1), txn("ICLOUD", 40.0, 15)]);
        assert_eq!(low[0].severity, ZombieSeverity::Low);
    }
}
