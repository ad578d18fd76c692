//! Description normalization: remove installment notation from the
//! visible description, then tidy whitespace.

use crate::installment::InstallmentPatterns;

/// Strip every installment notation occurrence (not just the first),
/// collapse repeated whitespace and trim. Input without notation comes
/// back unchanged apart from whitespace collapsing.
pub fn normalize_description(patterns: &InstallmentPatterns, description: &str) -> String {
    collapse_whitespace(&patterns.strip(description))
}

/// Collapse internal whitespace runs to single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
