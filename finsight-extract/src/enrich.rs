//! Installment enrichment: second-pass reconciliation of monthly versus
//! total amounts.
//!
//! A single-pass parser cannot always tell which printed figure is the
//! monthly charge and which is the total purchase price. For every
//! installment-flagged candidate this pass either trusts the proximity
//! strategy's captured secondary amount or re-scans the full raw text for
//! the candidate's source line and reads the amounts printed there.

use anyhow::Result;
use regex::Regex;

use finsight_core::transaction::{EnrichedTransaction, RawCandidate};

use crate::installment::{InstallmentInfo, InstallmentPatterns};
use crate::normalize::normalize_description;
use crate::tokens::scan_amounts;

/// Fragments shorter than this are too common to identify a line.
const MIN_FRAGMENT_LEN: usize = 3;

/// A matching line must share at least this many fragments with the
/// candidate's description.
const MIN_FRAGMENT_HITS: usize = 3;

/// Reconcile installment amounts and normalize descriptions.
///
/// `drift_tolerance` is the accepted relative gap between the parsed
/// monthly amount and `total / count` before the parsed figure is
/// overwritten; printed monthly figures occasionally round differently
/// than the division.
pub fn enrich_candidates(
    candidates: &[RawCandidate],
    raw_text: &str,
    drift_tolerance: f64,
) -> Result<Vec<EnrichedTransaction>> {
    let patterns = InstallmentPatterns::new()?;
    let fraction_re = Regex::new(r"(\d{1,2})\s*/\s*(\d{1,2})")?;

    let mut out = Vec::with_capacity(candidates.len());
    for c in candidates {
        let normalized = normalize_description(&patterns, &c.description);
        let Some(info) = patterns.detect(&c.description) else {
            out.push(EnrichedTransaction::plain(c, normalized));
            continue;
        };
        out.push(enrich_installment(
            c,
            info,
            normalized,
            raw_text,
            &fraction_re,
            drift_tolerance,
        )?);
    }
    Ok(out)
}

fn enrich_installment(
    c: &RawCandidate,
    info: InstallmentInfo,
    normalized: String,
    raw_text: &str,
    fraction_re: &Regex,
    drift_tolerance: f64,
) -> Result<EnrichedTransaction> {
    let mut amount = c.amount;
    let mut total_amount: Option<f64> = None;
    let mut total_count = info.total;

    if let Some(secondary) = c.secondary_amount {
        // The proximity strategy already captured a probable total.
        total_amount = Some(secondary);
    } else if let Some(line) = find_source_line(raw_text, &c.description) {
        let amounts: Vec<f64> = scan_amounts(line)?
            .iter()
            .map(|a| a.value)
            .filter(|v| *v > 0.0)
            .collect();
        if amounts.len() >= 2 {
            amount = amounts.iter().cloned().fold(f64::INFINITY, f64::min);
            total_amount = Some(amounts.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
        } else if amounts.len() == 1 && total_count.is_some() {
            total_amount = Some(amounts[0]);
        }
        if total_count.is_none() {
            // Recover the total from an X/Y on the matched line whose X
            // is the already-known current index.
            for caps in fraction_re.captures_iter(line) {
                let x: u32 = caps[1].parse().unwrap_or(0);
                let y: u32 = caps[2].parse().unwrap_or(0);
                if x == info.current && (2..=60).contains(&y) && y >= x {
                    total_count = Some(y);
                    break;
                }
            }
        }
    }

    // Keep the parsed monthly amount only while it stays within the
    // drift tolerance of total / count.
    if let (Some(total), Some(count)) = (total_amount, total_count) {
        if count > 1 {
            let expected = total / count as f64;
            if expected > 0.0 && ((amount - expected).abs() / expected) > drift_tolerance {
                amount = expected;
            }
        }
    }

    Ok(EnrichedTransaction {
        date: c.date,
        description: normalized,
        amount,
        currency: c.currency.clone(),
        is_installment: true,
        installment_current: Some(info.current),
        installment_total: total_count,
        total_amount,
        original_description: c.description.clone(),
    })
}

/// Find the first raw line sharing at least three distinctive keyword
/// fragments with `description`. Candidates whose descriptions carry
/// fewer than three usable fragments cannot be re-matched.
fn find_source_line<'t>(raw_text: &'t str, description: &str) -> Option<&'t str> {
    let fragments: Vec<String> = description
        .split_whitespace()
        .filter(|w| w.chars().filter(|c| c.is_alphanumeric()).count() >= MIN_FRAGMENT_LEN)
        .map(|w| w.to_lowercase())
        .collect();
    if fragments.len() < MIN_FRAGMENT_HITS {
        return None;
    }
    raw_text.lines().find(|line| {
        let lower = line.to_lowercase();
        fragments.iter().filter(|f| lower.contains(f.as_str())).count() >= MIN_FRAGMENT_HITS
    })
}
