//! Date and amount token scanners shared by the parse strategies.
//!
//! Both scanners report byte offsets into the scanned region so the
//! proximity strategy can associate tokens by distance.

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;

use finsight_core::transaction::MAX_AMOUNT;

/// How tolerant date recognition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateMode {
    /// Require a 4-digit year.
    StrictYear,
    /// Also accept 2-digit years and year-less day/month (current year).
    Loose,
}

/// A date-shaped token with its location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateToken {
    pub start: usize,
    pub end: usize,
    pub date: NaiveDate,
}

/// A decimal-amount-shaped token with its location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountToken {
    pub start: usize,
    pub end: usize,
    /// Signed value; refunds/payments carry a leading minus.
    pub value: f64,
    /// Token is enclosed in parentheses (installment-total annotation).
    pub in_parens: bool,
}

/// Last day of the given month, accounting for leap years.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Build a real calendar date from possibly-malformed statement fields.
/// The day is clamped into the month's actual range (statements print
/// things like 31 February); an out-of-range month is rejected.
pub fn resolve_date(day: u32, month: u32, year: i32) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) || day == 0 {
        return None;
    }
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Scan `text` for date-shaped tokens.
///
/// `fallback_year` fills in 2-digit and missing years (loose mode only).
pub fn scan_dates(text: &str, mode: DateMode, fallback_year: i32) -> Result<Vec<DateToken>> {
    let re = match mode {
        DateMode::StrictYear => Regex::new(r"\b(\d{1,2})[./](\d{1,2})[./](\d{4})\b")?,
        DateMode::Loose => Regex::new(r"\b(\d{1,2})[./](\d{1,2})(?:[./](\d{2,4}))?\b")?,
    };

    let mut out = Vec::new();
    for caps in re.captures_iter(text) {
        let m = caps.get(0).unwrap();
        let day: u32 = match caps[1].parse() {
            Ok(d) => d,
            Err(_) => continue,
        };
        let month: u32 = match caps[2].parse() {
            Ok(m) => m,
            Err(_) => continue,
        };
        let year = match caps.get(3) {
            Some(y) => {
                let y: i32 = y.as_str().parse().unwrap_or(fallback_year);
                if y < 100 { 2000 + y } else { y }
            }
            None => fallback_year,
        };
        if let Some(date) = resolve_date(day, month, year) {
            out.push(DateToken {
                start: m.start(),
                end: m.end(),
                date,
            });
        }
    }
    Ok(out)
}

/// Parse one amount string in either `1.234,56` or `1,234.56` shape.
/// The last separator is taken as the decimal point.
pub fn parse_amount_str(s: &str) -> Option<f64> {
    let s = s.trim();
    let (sign, body) = match s.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, s.strip_prefix('+').unwrap_or(s)),
    };
    let last_sep = body.rfind(['.', ','])?;
    let (int_part, frac_part) = body.split_at(last_sep);
    let frac_part = &frac_part[1..];
    let int_digits: String = int_part.chars().filter(|c| c.is_ascii_digit()).collect();
    if int_digits.is_empty() || frac_part.chars().any(|c| !c.is_ascii_digit()) {
        return None;
    }
    let value: f64 = format!("{int_digits}.{frac_part}").parse().ok()?;
    Some(sign * value)
}

/// Scan `text` for decimal amounts with two fraction digits.
///
/// Values outside `(0, MAX_AMOUNT)` by absolute value are dropped here:
/// anything that large is a limit or balance, not a transaction. Tokens
/// that are themselves date-shaped (e.g. `01.03.25`) are dropped too.
pub fn scan_amounts(text: &str) -> Result<Vec<AmountToken>> {
    let re = Regex::new(r"[-+]?\d[\d.,]*[.,]\d{2}\b")?;
    let date_shaped = Regex::new(r"^[-+]?\d{1,2}[./]\d{1,2}[./]\d{2,4}$")?;

    let bytes = text.as_bytes();
    let mut out = Vec::new();
    for m in re.find_iter(text) {
        if date_shaped.is_match(m.as_str()) {
            continue;
        }
        let value = match parse_amount_str(m.as_str()) {
            Some(v) => v,
            None => continue,
        };
        if value == 0.0 || value.abs() >= MAX_AMOUNT {
            continue;
        }
        out.push(AmountToken {
            start: m.start(),
            end: m.end(),
            value,
            in_parens: enclosed_in_parens(bytes, m.start(), m.end()),
        });
    }
    Ok(out)
}

fn enclosed_in_parens(bytes: &[u8], start: usize, end: usize) -> bool {
    let before = bytes[..start]
        .iter()
        .rev()
        .find(|b| !b.is_ascii_whitespace());
    let after = bytes[end..].iter().find(|b| !b.is_ascii_whitespace());
    before == Some(&b'(') && after == Some(&b')')
}

/// Currency marker found in `s`, defaulting to TRY.
pub fn detect_currency(s: &str) -> &'static str {
    let upper = s.to_uppercase();
    if upper.contains("USD") || s.contains('$') {
        "USD"
    } else if upper.contains("EUR") || s.contains('€') {
        "EUR"
    } else if upper.contains("GBP") || s.contains('£') {
        "GBP"
    } else {
        "TRY"
    }
}
