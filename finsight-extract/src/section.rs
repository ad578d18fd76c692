//! Section locator and skip-phrase filter.
//!
//! Statements open with limit/balance boilerplate whose numbers look like
//! transactions. The locator jumps past the header of the transaction
//! table; the skip filter rejects the boilerplate lines that strategies
//! still encounter inside the located region.

use anyhow::Result;
use regex::Regex;

/// Section-header phrases marking where genuine transaction rows begin.
/// Turkish statements first, English layouts after.
static SECTION_HEADERS: &[&str] = &[
    "işlem tarihi",
    "islem tarihi",
    "harcama detayı",
    "harcama detayi",
    "hesap hareketleri",
    "dönem içi işlemler",
    "donem ici islemler",
    "transaction date",
    "transaction details",
    "spending details",
];

/// Phrases identifying non-transaction lines (limits, balances, headers).
/// Matched case-insensitively as substrings of a candidate line.
static SKIP_PHRASES: &[&str] = &[
    "kart limiti",
    "kullanılabilir limit",
    "kullanilabilir limit",
    "toplam limit",
    "asgari ödeme",
    "asgari odeme",
    "ekstre borcu",
    "dönem borcu",
    "donem borcu",
    "toplam borç",
    "toplam borc",
    "kalan borç",
    "kalan borc",
    "önceki ekstre",
    "onceki ekstre",
    "devreden bakiye",
    "bakiye",
    "faiz oranı",
    "faiz orani",
    "son ödeme tarihi",
    "son odeme tarihi",
    "hesap özeti",
    "hesap ozeti",
    "sayfa",
    "credit limit",
    "available limit",
    "available credit",
    "minimum payment",
    "previous balance",
    "new balance",
    "statement balance",
    "total due",
    "payment due date",
    "interest rate",
    "page ",
];

/// Find the byte offset immediately after the earliest section header in
/// `text`, or 0 when no header is present (whole document is the region).
///
/// Matching is done with a case-insensitive regex rather than by
/// lowercasing the haystack: Turkish dotted capitals expand under
/// `to_lowercase`, which would shift every offset after them.
pub fn locate_transaction_section(text: &str) -> Result<usize> {
    let pattern = SECTION_HEADERS
        .iter()
        .map(|p| phrase_pattern(p))
        .collect::<Vec<_>>()
        .join("|");
    let re = Regex::new(&format!("(?i){pattern}"))?;
    Ok(re.find(text).map(|m| m.end()).unwrap_or(0))
}

/// Turn a header phrase into a regex fragment. `(?i)` only performs
/// simple case folding, under which the Turkish dotted/dotless capitals
/// never meet their ASCII counterparts, so the i family gets an explicit
/// character class.
fn phrase_pattern(phrase: &str) -> String {
    let mut out = String::with_capacity(phrase.len() * 2);
    for c in phrase.chars() {
        match c {
            'i' | 'ı' => out.push_str("[iİı]"),
            _ => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out
}

/// Shared predicate every strategy applies before accepting a line.
pub fn is_skip_line(line: &str) -> bool {
    // `İ` lowercases to `i` plus a combining dot that would break
    // substring matching; drop the combining mark.
    let lower: String = line
        .to_lowercase()
        .chars()
        .filter(|c| *c != '\u{0307}')
        .collect();
    SKIP_PHRASES.iter().any(|p| lower.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locates_turkish_header() {
        let text = "Kart Limiti: 45.000,00 TL\nİşlem Tarihi Açıklama Tutar\n01/03/2025 MIGROS 250,00 TL\n";
        let off = locate_transaction_section(text).unwrap();
        assert!(off > 0);
        assert!(text[off..].contains("01/03/2025"));
        // The limit line stays outside the located region.
        assert!(!text[off..].contains("45.000,00"));
    }

    #[test]
    fn test_no_header_returns_zero() {
        assert_eq!(locate_transaction_section("random text with no table").unwrap(), 0);
    }

    #[test]
    fn test_earliest_header_wins() {
        let text = "Spending Details\n...\nTransaction Date\n";
        let off = locate_transaction_section(text).unwrap();
        assert_eq!(off, "Spending Details".len());
    }

    #[test]
    fn test_skip_lines() {
        assert!(is_skip_line("Kullanılabilir Limit: 12.500,00 TL"));
        assert!(is_skip_line("ASGARI ODEME TUTARI 1.200,00"));
        assert!(is_skip_line("ASGARİ ÖDEME TUTARI 1.200,00"));
        assert!(is_skip_line("Previous Balance 840.00"));
        assert!(!is_skip_line("01/03/2025 MIGROS SANAL MARKET 250,00 TL"));
    }
}
