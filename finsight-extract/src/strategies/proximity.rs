//! Proximity strategy: the general-purpose fallback for layouts where
//! line structure is lost. Dates and amounts are located independently
//! across the whole region and associated by minimal character distance.

use anyhow::Result;
use chrono::NaiveDate;

use finsight_core::transaction::RawCandidate;

use super::{ParseStrategy, clean_description, year_of};
use crate::installment::InstallmentPatterns;
use crate::section::is_skip_line;
use crate::tokens::{AmountToken, DateMode, detect_currency, scan_amounts, scan_dates};

/// Amounts farther than this many bytes after a date are not considered
/// for that date.
const WINDOW: usize = 400;

pub struct Proximity;

impl ParseStrategy for Proximity {
    fn name(&self) -> &'static str {
        "proximity"
    }

    fn parse(&self, text: &str, run_date: NaiveDate) -> Result<Vec<RawCandidate>> {
        let patterns = InstallmentPatterns::new()?;
        let dates = scan_dates(text, DateMode::Loose, year_of(run_date))?;
        // Parenthesized figures are installment-total annotations, never
        // standalone transaction amounts; keep them out of the pool so
        // they cannot be double-counted as separate rows.
        let pool: Vec<AmountToken> = scan_amounts(text)?
            .into_iter()
            .filter(|a| !a.in_parens && a.value > 0.0)
            .collect();
        let mut consumed = vec![false; pool.len()];

        let mut out = Vec::new();
        for date in &dates {
            // Unconsumed amounts strictly after this date, nearest first.
            let mut nearby: Vec<usize> = (0..pool.len())
                .filter(|&i| {
                    !consumed[i]
                        && pool[i].start > date.end
                        && pool[i].start - date.end <= WINDOW
                })
                .collect();
            nearby.sort_by_key(|&i| pool[i].start - date.end);
            let Some(&nearest) = nearby.first() else {
                continue;
            };

            let span = &text[date.end..pool[nearest].start];
            consumed[nearest] = true;
            if is_skip_line(span) {
                continue;
            }
            let Some(description) = clean_description(span)? else {
                continue;
            };

            let (amount, secondary_amount) =
                if patterns.detect(&description).is_some() && nearby.len() >= 2 {
                    // Smallest nearby figure is the monthly charge, the
                    // largest is the probable total purchase price.
                    let (mut lo, mut hi) = (nearest, nearest);
                    for &i in &nearby {
                        if pool[i].value < pool[lo].value {
                            lo = i;
                        }
                        if pool[i].value > pool[hi].value {
                            hi = i;
                        }
                    }
                    consumed[lo] = true;
                    consumed[hi] = true;
                    (pool[lo].value, Some(pool[hi].value))
                } else {
                    (pool[nearest].value, None)
                };

            let tail: String = text[pool[nearest].end..].chars().take(8).collect();
            out.push(RawCandidate {
                date: date.date,
                description,
                amount,
                currency: detect_currency(&tail).to_string(),
                secondary_amount,
            });
        }
        Ok(out)
    }
}
