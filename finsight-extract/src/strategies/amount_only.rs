//! Amount-only fallback: used when no date token is recoverable anywhere.
//! Every candidate is stamped with the run's current date; the scorer's
//! date-validity bonus keeps this strategy from winning whenever any
//! other strategy found a real date.

use anyhow::Result;
use chrono::NaiveDate;

use finsight_core::transaction::RawCandidate;

use super::{ParseStrategy, clean_description};
use crate::section::is_skip_line;
use crate::tokens::{detect_currency, scan_amounts};

pub struct AmountOnly;

impl ParseStrategy for AmountOnly {
    fn name(&self) -> &'static str {
        "amount-only"
    }

    fn parse(&self, text: &str, run_date: NaiveDate) -> Result<Vec<RawCandidate>> {
        let mut out = Vec::new();
        let mut prev_line: &str = "";

        for line in text.lines() {
            if is_skip_line(line) {
                prev_line = line;
                continue;
            }
            let amounts = scan_amounts(line)?;
            let Some(amount) = amounts.last() else {
                prev_line = line;
                continue;
            };

            // Description: text before the amount on this line, or the
            // previous physical line when that is empty.
            let description = match clean_description(&line[..amount.start])? {
                Some(d) => Some(d),
                None => clean_description(prev_line)?,
            };
            prev_line = line;
            let Some(description) = description else {
                continue;
            };

            out.push(RawCandidate {
                date: run_date,
                description,
                amount: amount.value,
                currency: detect_currency(line).to_string(),
                secondary_amount: None,
            });
        }
        Ok(out)
    }
}
