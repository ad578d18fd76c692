//! Competing parse strategies plus the arbitration policy that picks a
//! winner.
//!
//! Every strategy is a pure function of the input region; all five run
//! unconditionally and the scorer selects one output. The registry order
//! below is a documented contract: score ties resolve to the earliest
//! entry, so the most precise strategies are declared first.

mod amount_only;
mod exact;
mod line_based;
mod proximity;

pub use amount_only::AmountOnly;
pub use exact::ExactFormat;
pub use line_based::{LineLoose, LineStrict};
pub use proximity::Proximity;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::collections::HashSet;

use finsight_core::transaction::{MAX_DESCRIPTION_LEN, MIN_DESCRIPTION_LEN, RawCandidate};

use crate::normalize::collapse_whitespace;

/// One competing extraction heuristic.
pub trait ParseStrategy: Sync {
    fn name(&self) -> &'static str;

    /// Scan the located region and produce candidates. `run_date` is the
    /// analysis run's current date, used as a placeholder when no date
    /// token is recoverable.
    fn parse(&self, text: &str, run_date: NaiveDate) -> Result<Vec<RawCandidate>>;
}

/// Fixed evaluation order. Ties in scoring resolve to the earliest entry;
/// do not reorder.
pub static STRATEGIES: &[&(dyn ParseStrategy)] = &[
    &ExactFormat,
    &Proximity,
    &LineStrict,
    &LineLoose,
    &AmountOnly,
];

/// Candidate-count score with a 1000-point bonus when any candidate date
/// differs from the run date. A strategy that silently fell back to
/// "today" for every row must never beat one that recovered even a single
/// real date.
pub fn score_candidates(candidates: &[RawCandidate], run_date: NaiveDate) -> usize {
    let mut score = candidates.len();
    if candidates.iter().any(|c| c.date != run_date) {
        score += 1000;
    }
    score
}

/// Output of strategy arbitration.
#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    pub strategy: &'static str,
    pub score: usize,
    pub candidates: Vec<RawCandidate>,
}

/// Run every registered strategy on `text` and pick the highest-scoring
/// output. A strategy returning an error scores zero and is excluded;
/// the remaining strategies still compete and one is always selected.
pub fn select_best(text: &str, run_date: NaiveDate) -> StrategyOutcome {
    let mut best: Option<StrategyOutcome> = None;
    for strategy in STRATEGIES {
        let candidates = match strategy.parse(text, run_date) {
            Ok(c) => c,
            Err(_) => continue,
        };
        let score = score_candidates(&candidates, run_date);
        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(StrategyOutcome {
                strategy: strategy.name(),
                score,
                candidates,
            });
        }
    }
    best.unwrap_or(StrategyOutcome {
        strategy: "none",
        score: 0,
        candidates: Vec::new(),
    })
}

/// Collapse duplicate candidates. Key = (first 20 chars of description,
/// amount in cents, date); first occurrence wins. Also drops non-positive
/// amounts and descriptions shorter than 2 chars. Idempotent.
pub fn dedupe(candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
    let mut seen: HashSet<(String, i64, NaiveDate)> = HashSet::new();
    let mut out = Vec::with_capacity(candidates.len());
    for c in candidates {
        if c.amount <= 0.0 {
            continue;
        }
        if c.description.chars().count() < MIN_DESCRIPTION_LEN {
            continue;
        }
        let key = (
            c.description.chars().take(20).collect(),
            (c.amount * 100.0).round() as i64,
            c.date,
        );
        if seen.insert(key) {
            out.push(c);
        }
    }
    out
}

/// Turn a raw description span into a candidate description: drop embedded
/// date tokens, decorative glyphs and separator runs, collapse whitespace
/// and clamp to 80 chars. Returns `None` when fewer than 2 chars survive.
///
/// Only dates with an explicit year are stripped; a bare `3/6` must
/// survive so installment detection can still see it.
pub(crate) fn clean_description(span: &str) -> Result<Option<String>> {
    let dated = Regex::new(r"\b\d{1,2}[./]\d{1,2}[./]\d{2,4}\b")?;
    let mut kept = String::with_capacity(span.len());
    let mut pos = 0;
    for m in dated.find_iter(span) {
        if m.start() > pos {
            kept.push_str(&span[pos..m.start()]);
        }
        kept.push(' ');
        pos = m.end().max(pos);
    }
    kept.push_str(&span[pos..]);

    let kept: String = kept
        .chars()
        .map(|c| if matches!(c, '|' | '*' | '#' | '•' | '\t') { ' ' } else { c })
        .collect();
    let cleaned = collapse_whitespace(kept.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '-' | ':' | '.' | ',' | ';')
    }));
    let clamped: String = cleaned.chars().take(MAX_DESCRIPTION_LEN).collect();
    if clamped.chars().count() < MIN_DESCRIPTION_LEN {
        Ok(None)
    } else {
        Ok(Some(clamped))
    }
}

/// Fallback year for cleaning helpers derived from the run date.
pub(crate) fn year_of(run_date: NaiveDate) -> i32 {
    run_date.year()
}
