//! Installment-notation detection.
//!
//! Turkish card statements write a purchase billed in N monthly charges as
//! `AÇIKLAMA 3/6`, `3.TAKSIT`, `TAKSIT 3/6`, `(3/6)` and several other
//! spellings; English layouts use `INSTALLMENT 3/6`. Rules are ordered
//! most-specific first: later rules are looser and carry more
//! false-positive risk, so earlier rules always get first refusal.

use anyhow::Result;
use regex::{Captures, Regex};

/// Indices recovered from installment notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallmentInfo {
    pub current: u32,
    /// Total number of installments, when the notation carries one.
    pub total: Option<u32>,
}

/// Compiled pattern set, built once per analysis run.
pub struct InstallmentPatterns {
    bracketed: Regex,
    labeled: Regex,
    ordinal_abbrev: Regex,
    trailing_total: Regex,
    bare_fraction: Regex,
    ordinal_word: Regex,
}

impl InstallmentPatterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // 1. Fraction in brackets or parentheses: [3/6], (3/6)
            bracketed: Regex::new(r"[\[(]\s*(\d{1,2})\s*/\s*(\d{1,2})\s*[\])]")?,
            // 2. Fraction labeled with the installment word: TAKSIT 3/6
            labeled: Regex::new(r"(?i)\b(?:taksit|taksidi|installment)\s*:?\s*(\d{1,2})\s*/\s*(\d{1,2})")?,
            // 3. Ordinal + abbreviation: 3.TKS, 3 TAKS, 3.TKST, 3.INST
            ordinal_abbrev: Regex::new(r"(?i)\b(\d{1,2})\s*\.?\s*(?:tksit|tkst|taks|tks|inst)\b")?,
            // total printed separately after an ordinal+abbrev: "/ 6"
            trailing_total: Regex::new(r"/\s*(\d{1,2})\b")?,
            // 4. Bare whitespace-surrounded fraction: " 3/6 "
            bare_fraction: Regex::new(r"(?:^|\s)(\d{1,2})\s*/\s*(\d{1,2})(?:\s|$)")?,
            // 5. Ordinal with the bare word, no total: 3.TAKSIT / TAKSIT 3
            ordinal_word: Regex::new(
                r"(?i)\b(\d{1,2})\s*\.?\s*(?:taksit|installment)\b|\b(?:taksit|installment)\s*(?:no)?\s*\.?\s*:?\s*(\d{1,2})\b",
            )?,
        })
    }

    /// First matching rule wins; a rule whose numbers fail validation
    /// falls through to the next one.
    pub fn detect(&self, text: &str) -> Option<InstallmentInfo> {
        if let Some(caps) = self.bracketed.captures(text) {
            if let Some(info) = fraction_info(&caps) {
                return Some(info);
            }
        }
        if let Some(caps) = self.labeled.captures(text) {
            if let Some(info) = fraction_info(&caps) {
                return Some(info);
            }
        }
        if let Some(caps) = self.ordinal_abbrev.captures(text) {
            let current: u32 = caps[1].parse().ok()?;
            if (1..=60).contains(&current) {
                // The total, when printed at all, appears elsewhere in the
                // same text as a trailing fraction.
                let rest = &text[caps.get(0).map(|m| m.end()).unwrap_or(0)..];
                let total = self
                    .trailing_total
                    .captures(rest)
                    .and_then(|c| c[1].parse::<u32>().ok())
                    .filter(|t| valid_total(current, *t));
                return Some(InstallmentInfo { current, total });
            }
        }
        if let Some(caps) = self.bare_fraction.captures(text) {
            // Looser than the rules above: only accept fractions that look
            // like real installment counters, not dates or reference codes.
            if let Some(info) = fraction_info(&caps) {
                return Some(info);
            }
        }
        if let Some(caps) = self.ordinal_word.captures(text) {
            let current: u32 = caps
                .get(1)
                .or_else(|| caps.get(2))?
                .as_str()
                .parse()
                .ok()?;
            if (1..=60).contains(&current) {
                return Some(InstallmentInfo { current, total: None });
            }
        }
        None
    }

    /// Strip every qualifying installment notation occurrence, leaving
    /// non-qualifying numeric text alone.
    pub fn strip(&self, text: &str) -> String {
        let mut out = text.to_string();
        for re in [&self.bracketed, &self.labeled, &self.bare_fraction] {
            out = re
                .replace_all(&out, |caps: &Captures| {
                    if fraction_info(caps).is_some() {
                        " ".to_string()
                    } else {
                        caps[0].to_string()
                    }
                })
                .into_owned();
        }
        for re in [&self.ordinal_abbrev, &self.ordinal_word] {
            out = re
                .replace_all(&out, |caps: &Captures| {
                    let n = caps
                        .get(1)
                        .or_else(|| caps.get(2))
                        .and_then(|m| m.as_str().parse::<u32>().ok());
                    match n {
                        Some(n) if (1..=60).contains(&n) => " ".to_string(),
                        _ => caps[0].to_string(),
                    }
                })
                .into_owned();
        }
        out
    }
}

fn valid_total(current: u32, total: u32) -> bool {
    (2..=60).contains(&total) && total >= current
}

fn fraction_info(caps: &Captures) -> Option<InstallmentInfo> {
    let current: u32 = caps[1].parse().ok()?;
    let total: u32 = caps[2].parse().ok()?;
    if current >= 1 && valid_total(current, total) {
        Some(InstallmentInfo {
            current,
            total: Some(total),
        })
    } else {
        None
    }
}
