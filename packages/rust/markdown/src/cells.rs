//! Table-cell helpers: link extraction, title normalization, row splitting.
//!
//! Each helper is a pure `&str -> T` function with no knowledge of sections.

use std::sync::LazyLock;

use regex::Regex;

/// Start of a markdown inline link target: `(http://` or `(https://`.
static LINK_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(https?://").expect("link start regex"));

/// A complete link target anchored at a link start. No whitespace or parens
/// may appear before the closing paren.
static LINK_TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\((https?://[^\s()]+)\)").expect("link target regex")
});

/// Matches `**bold**` spans (non-greedy).
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(.*?)\*\*").expect("bold regex")
});

/// Return the first absolute URL wrapped in `(...)` inside a cell.
///
/// Only the first link of a cell is returned. A first target that is never
/// closed yields `None` rather than a partial URL or a later link.
pub fn extract_link(cell: &str) -> Option<String> {
    let start = LINK_START_RE.find(cell)?.start();
    LINK_TARGET_RE
        .captures(&cell[start..])
        .map(|caps| caps[1].to_string())
}

/// Turn a raw title cell into a display string.
///
/// Unwraps `**bold**`, drops square brackets (link targets live in their own
/// cells, so any `[text]` here is decoration), and collapses whitespace.
pub fn clean_title(raw: &str) -> String {
    let unbolded = BOLD_RE.replace_all(raw, "$1");
    let unbracketed: String = unbolded.chars().filter(|c| *c != '[' && *c != ']').collect();
    unbracketed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a `| a | b | c |` row into trimmed cells.
///
/// Leading and trailing delimiters are dropped, so the row above yields three
/// cells. Empty interior cells are kept.
pub(crate) fn split_row(row: &str) -> Vec<&str> {
    row.trim()
        .trim_matches('|')
        .split('|')
        .map(str::trim)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_link_from_markdown_link() {
        assert_eq!(
            extract_link("[pdf](http://a.x)"),
            Some("http://a.x".to_string())
        );
        assert_eq!(
            extract_link("[code](https://github.com/safe-graph/DGFraud)"),
            Some("https://github.com/safe-graph/DGFraud".to_string())
        );
    }

    #[test]
    fn extract_link_returns_first_of_many() {
        let cell = "[pdf](https://arxiv.org/abs/2101.00001) [slides](https://example.com/s.pdf)";
        assert_eq!(
            extract_link(cell),
            Some("https://arxiv.org/abs/2101.00001".to_string())
        );
    }

    #[test]
    fn extract_link_absent_cases() {
        assert_eq!(extract_link(""), None);
        assert_eq!(extract_link("N/A"), None);
        // Relative targets are not absolute URLs
        assert_eq!(extract_link("[code](./code)"), None);
        // Unbalanced parens never yield a partial match
        assert_eq!(extract_link("[pdf](http://a.x"), None);
        assert_eq!(extract_link("[pdf](http://a.x [code](http://b.y)"), None);
        assert_eq!(extract_link("[pdf](http://a.x(1)"), None);
    }

    #[test]
    fn clean_title_unwraps_bold() {
        assert_eq!(clean_title("**GraphBERT** for Fraud"), "GraphBERT for Fraud");
        assert_eq!(clean_title("**A** and **B**"), "A and B");
    }

    #[test]
    fn clean_title_strips_brackets_and_spaces() {
        assert_eq!(
            clean_title("[Spatio-Temporal   Fraud]  Detection "),
            "Spatio-Temporal Fraud Detection"
        );
    }

    #[test]
    fn clean_title_keeps_unpaired_markers() {
        assert_eq!(clean_title("**Open bold"), "**Open bold");
    }

    #[test]
    fn split_row_trims_outer_delimiters() {
        let cells = split_row("| 2021 | Title | KDD | [pdf](http://a.x) | |");
        assert_eq!(cells, vec!["2021", "Title", "KDD", "[pdf](http://a.x)", ""]);
    }

    #[test]
    fn split_row_without_outer_pipes() {
        let cells = split_row("2020 | T | V");
        assert_eq!(cells, vec!["2020", "T", "V"]);
    }
}
