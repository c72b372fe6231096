//! Title normalization and fuzzy matching for citation lookups.

use std::sync::LazyLock;

use regex::Regex;
use similar::TextDiff;

static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid non-alnum regex"));

/// Lowercase, replace every non-alphanumeric run with one space, trim.
pub fn normalize_title(text: &str) -> String {
    let lowered = text.to_lowercase();
    NON_ALNUM_RE
        .replace_all(&lowered, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity of two titles in `[0, 1]` after normalization.
///
/// Identical titles score 1.0 and one containing the other scores 0.95.
/// Anything else gets the character diff ratio of the normalized forms.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_title(a);
    let b = normalize_title(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 0.95;
    }
    matching_ratio(&a, &b)
}

/// `2 * M / T` over characters, where `M` is the number of characters the
/// two strings share in a minimal diff and `T` is their combined length.
/// Two empty strings score 1.0.
pub fn matching_ratio(a: &str, b: &str) -> f64 {
    f64::from(TextDiff::from_chars(a, b).ratio())
}
