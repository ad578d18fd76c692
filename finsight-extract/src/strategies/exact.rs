//! Exact-format strategy: the tightly-anchored layout a majority of card
//! statements use once PDF columns collapse into plain text:
//!
//!   DD/MM/YYYY <description> <amount> <currency marker>
//!
//! Most precise when it applies, hence first in the registry.

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;

use finsight_core::transaction::{MAX_AMOUNT, RawCandidate};

use super::{ParseStrategy, clean_description};
use crate::section::is_skip_line;
use crate::tokens::{parse_amount_str, resolve_date};

pub struct ExactFormat;

impl ParseStrategy for ExactFormat {
    fn name(&self) -> &'static str {
        "exact-format"
    }

    fn parse(&self, text: &str, _run_date: NaiveDate) -> Result<Vec<RawCandidate>> {
        let row_re = Regex::new(concat!(
            r"^\s*(?P<d>\d{1,2})[./](?P<m>\d{1,2})[./](?P<y>\d{4})\s+",
            r"(?P<desc>.+?)\s+",
            r"(?P<sign>[-+])?\s*(?P<amt>\d[\d.,]*[.,]\d{2})\s*",
            r"(?P<ccy>TL|TRY|USD|EUR|GBP|₺|\$|€|£)\s*$",
        ))?;

        let mut out = Vec::new();
        for line in text.lines() {
            if is_skip_line(line) {
                continue;
            }
            let caps = match row_re.captures(line) {
                Some(c) => c,
                None => continue,
            };
            let date = match resolve_date(
                caps["d"].parse().unwrap_or(0),
                caps["m"].parse().unwrap_or(0),
                caps["y"].parse().unwrap_or(0),
            ) {
                Some(d) => d,
                None => continue,
            };
            let mut amount = match parse_amount_str(&caps["amt"]) {
                Some(a) => a,
                None => continue,
            };
            if caps.name("sign").map(|s| s.as_str()) == Some("-") {
                amount = -amount;
            }
            if amount == 0.0 || amount.abs() >= MAX_AMOUNT {
                continue;
            }
            // Decorative glyphs trail some description columns.
            let desc_span = caps["desc"]
                .trim_end_matches(['*', '#', '.', '-', '•', ' ']);
            let description = match clean_description(desc_span)? {
                Some(d) => d,
                None => continue,
            };
            out.push(RawCandidate {
                date,
                description,
                amount,
                currency: currency_code(&caps["ccy"]),
                secondary_amount: None,
            });
        }
        Ok(out)
    }
}

fn currency_code(marker: &str) -> String {
    match marker {
        "TL" | "₺" => "TRY".to_string(),
        "$" => "USD".to_string(),
        "€" => "EUR".to_string(),
        "£" => "GBP".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_parses_anchored_rows() {
        let text = "\
01/03/2025 MIGROS SANAL MARKET 250,00 TL
05/03/2025 STARBUCKS KANYON ** 85,50 TL
07/03/2025 IADE MAGAZA -120,00 TL
";
        let out = ExactFormat.parse(text, run_date()).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].amount, 250.0);
        assert_eq!(out[0].currency, "TRY");
        assert_eq!(out[1].description, "STARBUCKS KANYON");
        assert_eq!(out[2].amount, -120.0);
    }

    #[test]
    fn test_rejects_skip_lines_and_loose_rows() {
        let text = "\
01/03/2025 Kart Limiti 45.000,00 TL
01.03.25 SHORT YEAR ROW 30,00 TL
some text without structure
";
        let out = ExactFormat.parse(text, run_date()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_repairs_malformed_day() {
        let text = "31/02/2025 SUBAT HATALI SATIR 99,90 TL\n";
        let out = ExactFormat.parse(text, run_date()).unwrap();
        assert_eq!(out[0].date, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }
}
