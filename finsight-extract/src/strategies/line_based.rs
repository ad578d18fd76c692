//! Line-based strategies: one transaction per physical line, in strict
//! (4-digit year required) and loose (2-digit or implied current year)
//! variants sharing the same row logic.

use anyhow::Result;
use chrono::NaiveDate;

use finsight_core::transaction::RawCandidate;

use super::{ParseStrategy, clean_description, year_of};
use crate::installment::InstallmentPatterns;
use crate::section::is_skip_line;
use crate::tokens::{DateMode, detect_currency, scan_amounts, scan_dates};

pub struct LineStrict;
pub struct LineLoose;

impl ParseStrategy for LineStrict {
    fn name(&self) -> &'static str {
        "line-strict"
    }

    fn parse(&self, text: &str, run_date: NaiveDate) -> Result<Vec<RawCandidate>> {
        parse_lines(text, DateMode::StrictYear, run_date)
    }
}

impl ParseStrategy for LineLoose {
    fn name(&self) -> &'static str {
        "line-loose"
    }

    fn parse(&self, text: &str, run_date: NaiveDate) -> Result<Vec<RawCandidate>> {
        parse_lines(text, DateMode::Loose, run_date)
    }
}

fn parse_lines(text: &str, mode: DateMode, run_date: NaiveDate) -> Result<Vec<RawCandidate>> {
    let patterns = InstallmentPatterns::new()?;
    let mut out = Vec::new();

    for line in text.lines() {
        if is_skip_line(line) {
            continue;
        }
        let dates = scan_dates(line, mode, year_of(run_date))?;
        let Some(date) = dates.first() else {
            continue;
        };
        // Amounts overlapping or preceding the date token are unusable;
        // a year-less `14.02` date would otherwise double as an amount.
        let amounts: Vec<_> = scan_amounts(line)?
            .into_iter()
            .filter(|a| a.start >= date.end)
            .collect();
        let Some(first_amount) = amounts.first() else {
            continue;
        };

        // Description sits between the date and the first amount; any
        // later date on the line (post date etc.) gets stripped.
        let span = &line[date.end..first_amount.start];
        let Some(description) = clean_description(span)? else {
            continue;
        };

        let positive: Vec<f64> = amounts
            .iter()
            .map(|a| a.value)
            .filter(|v| *v > 0.0)
            .collect();
        let (amount, secondary_amount) =
            if patterns.detect(&description).is_some() && positive.len() >= 2 {
                let lo = positive.iter().cloned().fold(f64::INFINITY, f64::min);
                let hi = positive.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                (lo, Some(hi))
            } else {
                // Statements conventionally print the settled amount last.
                (amounts[amounts.len() - 1].value, None)
            };

        out.push(RawCandidate {
            date: date.date,
            description,
            amount,
            currency: detect_currency(line).to_string(),
            secondary_amount,
        });
    }
    Ok(out)
}
