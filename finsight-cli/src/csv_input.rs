//! Parse structured transaction CSV exports into raw candidates.
//!
//! Expected columns: Date,Description,Amount and optionally Currency.
//! Rows before the header and rows that fail to parse are skipped.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;

use finsight_core::transaction::RawCandidate;
use finsight_extract::tokens::parse_amount_str;

fn parse_row_date(s: &str) -> Option<NaiveDate> {
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

pub fn parse_transactions_csv(path: impl AsRef<Path>) -> Result<Vec<RawCandidate>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;

    let mut candidates = Vec::new();
    let mut header_found = false;

    for result in rdr.records() {
        let record = result?;
        if !header_found {
            if record
                .get(0)
                .is_some_and(|c| c.trim().eq_ignore_ascii_case("date"))
            {
                header_found = true;
            }
            continue;
        }

        let (Some(date_s), Some(desc), Some(amount_s)) =
            (record.get(0), record.get(1), record.get(2))
        else {
            continue;
        };
        let Some(date) = parse_row_date(date_s.trim()) else {
            continue;
        };
        // Bank exports use separator-formatted amounts; plain decimals
        // like "100" come from hand-edited files.
        let amount_s = amount_s.trim();
        let Some(amount) = parse_amount_str(amount_s).or_else(|| amount_s.parse().ok()) else {
            continue;
        };

        let currency = record
            .get(3)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .unwrap_or("TRY")
            .to_uppercase();

        candidates.push(RawCandidate {
            date,
            description: desc.trim().to_string(),
            amount,
            currency,
            secondary_amount: None,
        });
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parses_rows_after_header() {
        let path = write_temp(
            "finsight_csv_basic.csv",
            "exported by bank,,\nDate,Description,Amount,Currency\n\
             2025-03-01,MIGROS MARKET,\"2.500,00\",TL\n\
             02/03/2025,SPOTIFY,\"59,99\",\n",
        );
        let rows = parse_transactions_csv(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, 2500.0);
        assert_eq!(rows[0].currency, "TL");
        assert_eq!(rows[1].currency, "TRY");
        assert_eq!(
            rows[1].date,
            NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()
        );
    }

    #[test]
    fn test_skips_unparseable_rows() {
        let path = write_temp(
            "finsight_csv_bad_rows.csv",
            "Date,Description,Amount\n\
             not-a-date,SOMETHING,100\n\
             2025-03-05,OKAY,\"100,00\"\n",
        );
        let rows = parse_transactions_csv(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "OKAY");
    }
}
