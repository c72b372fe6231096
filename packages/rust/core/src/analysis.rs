//! Frequency reducers over the parsed paper collection.
//!
//! Every function here is pure and tolerates empty input: an empty slice
//! yields an empty histogram or a zero-valued [`CodeAvailability`].

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use paperdash_shared::{
    CategoryCount, CodeAvailability, LabelCount, PaperEntry, TopicCount, VenueCount, YearCount,
};

use crate::taxonomy::RuleTable;

/// Title words too generic for this corpus to say anything about a paper.
pub const STOPWORDS: &[&str] = &[
    "for",
    "and",
    "with",
    "graph",
    "graphs",
    "network",
    "networks",
    "detection",
    "fraud",
    "anomaly",
    "anomalies",
    "gnn",
    "gnns",
    "based",
    "learning",
    "via",
    "using",
    "model",
    "models",
    "analysis",
    "graph-based",
    "graphical",
    "data",
    "system",
    "systems",
    "neural",
    "deep",
    "towards",
    "benchmark",
    "benchmarking",
    "study",
    "dataset",
    "framework",
    "approach",
];

/// Alphabetic-or-hyphen runs of at least three characters.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z][a-z\-]{2,}").expect("valid token regex"));

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

// ---------------------------------------------------------------------------
// Insertion-ordered counter
// ---------------------------------------------------------------------------

/// Counts keys while remembering the order each key was first seen.
///
/// [`OrderedCounter::most_common`] sorts stably, so equal counts keep that
/// first-encounter order.
#[derive(Debug, Default)]
struct OrderedCounter {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl OrderedCounter {
    fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    fn most_common(mut self, top_k: usize) -> Vec<(String, usize)> {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries.truncate(top_k);
        self.entries
    }
}

// ---------------------------------------------------------------------------
// Histograms
// ---------------------------------------------------------------------------

/// Papers per year, ascending. Papers without a year are left out.
pub fn counts_by_year(papers: &[PaperEntry]) -> Vec<YearCount> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for year in papers.iter().filter_map(|p| p.year) {
        *counts.entry(year).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// Papers per non-empty category, ascending by name.
pub fn counts_by_category(papers: &[PaperEntry]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for paper in papers.iter().filter(|p| !p.category.is_empty()) {
        *counts.entry(paper.category.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect()
}

/// The `top_k` most frequent non-empty venues.
pub fn counts_by_venue(papers: &[PaperEntry], top_k: usize) -> Vec<VenueCount> {
    let mut counter = OrderedCounter::default();
    for paper in papers.iter().filter(|p| !p.venue.is_empty()) {
        counter.add(&paper.venue);
    }
    counter
        .most_common(top_k)
        .into_iter()
        .map(|(venue, count)| VenueCount { venue, count })
        .collect()
}

/// Lowercased title tokens with stopwords removed.
pub fn title_tokens(title: &str) -> Vec<String> {
    let lowered = title.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !is_stopword(token))
        .map(str::to_string)
        .collect()
}

/// The `top_k` most frequent topic words across all titles.
pub fn word_frequencies(papers: &[PaperEntry], top_k: usize) -> Vec<TopicCount> {
    let mut counter = OrderedCounter::default();
    for paper in papers {
        for token in title_tokens(&paper.title) {
            counter.add(&token);
        }
    }
    counter
        .most_common(top_k)
        .into_iter()
        .map(|(topic, count)| TopicCount { topic, count })
        .collect()
}

/// Share of papers that link a code repository.
pub fn code_availability(papers: &[PaperEntry]) -> CodeAvailability {
    let total = papers.len();
    let with_code = papers.iter().filter(|p| p.has_code()).count();
    let percentage = if total == 0 {
        0.0
    } else {
        let raw = with_code as f64 / total as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    };
    CodeAvailability {
        with_code,
        total,
        percentage,
    }
}

/// Label histogram for one taxonomy, descending by count then ascending by
/// label. Only labels that occur are listed.
///
/// For multi-label tables a paper adds one to every label it carries, so the
/// counts may sum to more than the number of papers.
pub fn taxonomy_counts(papers: &[PaperEntry], table: &RuleTable) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for paper in papers {
        for label in table.classify(paper) {
            *counts.entry(label).or_default() += 1;
        }
    }
    let mut histogram: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();
    histogram.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    histogram
}

/// The `top_k` most mentioned datasets.
///
/// Ties keep the table's rule order: a dataset declared earlier in the rule
/// file ranks ahead of a later one with the same count.
pub fn dataset_counts(papers: &[PaperEntry], table: &RuleTable, top_k: usize) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for paper in papers {
        for label in table.classify(paper) {
            *counts.entry(label).or_default() += 1;
        }
    }
    let mut histogram: Vec<LabelCount> = table
        .labels()
        .filter_map(|label| {
            counts.get(label).map(|&count| LabelCount {
                label: label.to_string(),
                count,
            })
        })
        .collect();
    histogram.sort_by(|a, b| b.count.cmp(&a.count));
    histogram.truncate(top_k);
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Taxonomies;

    fn paper(year: Option<i32>, title: &str, venue: &str, category: &str, code: bool) -> PaperEntry {
        PaperEntry {
            year,
            title: title.into(),
            venue: venue.into(),
            paper_url: None,
            code_url: code.then(|| "https://github.com/a/b".to_string()),
            category: category.into(),
            subcategory: None,
        }
    }

    #[test]
    fn year_histogram_ascending_and_skips_missing() {
        let papers = vec![
            paper(Some(2022), "A", "", "X", false),
            paper(Some(2020), "B", "", "X", false),
            paper(None, "C", "", "X", false),
            paper(Some(2022), "D", "", "X", false),
        ];
        assert_eq!(
            counts_by_year(&papers),
            vec![
                YearCount { year: 2020, count: 1 },
                YearCount { year: 2022, count: 2 },
            ]
        );
    }

    #[test]
    fn category_histogram_sorted_by_name() {
        let papers = vec![
            paper(None, "A", "", "Node-level", false),
            paper(None, "B", "", "Graph-level", false),
            paper(None, "C", "", "Node-level", false),
        ];
        let counted = counts_by_category(&papers);
        let cats: Vec<(&str, usize)> = counted
            .iter()
            .map(|c| (c.category.as_str(), c.count))
            .collect();
        assert_eq!(cats, vec![("Graph-level", 1), ("Node-level", 2)]);
    }

    #[test]
    fn venue_histogram_truncates_and_keeps_first_seen_ties() {
        let papers = vec![
            paper(None, "A", "WWW", "X", false),
            paper(None, "B", "KDD", "X", false),
            paper(None, "C", "KDD", "X", false),
            paper(None, "D", "", "X", false),
            paper(None, "E", "CIKM", "X", false),
            paper(None, "F", "AAAI", "X", false),
        ];
        let venues: Vec<String> = counts_by_venue(&papers, 3)
            .into_iter()
            .map(|v| format!("{}={}", v.venue, v.count))
            .collect();
        assert_eq!(venues, vec!["KDD=2", "WWW=1", "CIKM=1"]);
    }

    #[test]
    fn topic_tokens_drop_stopwords_and_short_runs() {
        assert_eq!(
            title_tokens("GraphBERT for Fraud Detection on Graph-based Data, v2"),
            vec!["graphbert"]
        );
        assert_eq!(
            title_tokens("Self-supervised Camouflage"),
            vec!["self-supervised", "camouflage"]
        );
    }

    #[test]
    fn word_frequencies_count_across_titles() {
        let papers = vec![
            paper(None, "Spectral Filtering for Fraud", "", "X", false),
            paper(None, "Spectral Camouflage", "", "X", false),
            paper(None, "Camouflage Spectral", "", "X", false),
        ];
        let topics = word_frequencies(&papers, 2);
        assert_eq!(
            topics,
            vec![
                TopicCount { topic: "spectral".into(), count: 3 },
                TopicCount { topic: "camouflage".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn code_availability_rounds_to_two_decimals() {
        let papers = vec![
            paper(None, "A", "", "X", true),
            paper(None, "B", "", "X", false),
            paper(None, "C", "", "X", false),
        ];
        let ca = code_availability(&papers);
        assert_eq!(ca.with_code, 1);
        assert_eq!(ca.total, 3);
        assert_eq!(ca.percentage, 33.33);
    }

    #[test]
    fn code_availability_empty_is_zero() {
        let ca = code_availability(&[]);
        assert_eq!(ca, CodeAvailability { with_code: 0, total: 0, percentage: 0.0 });
    }

    #[test]
    fn taxonomy_histogram_ties_break_by_label() {
        let t = Taxonomies::builtin().expect("builtin");
        let papers = vec![
            paper(None, "Bitcoin Laundering", "", "X", false),
            paper(None, "Credit Card Fraud", "", "X", false),
            paper(None, "Plain", "", "X", false),
        ];
        let domains: Vec<(String, usize)> = taxonomy_counts(&papers, &t.domain)
            .into_iter()
            .map(|c| (c.label, c.count))
            .collect();
        assert_eq!(
            domains,
            vec![
                ("Cryptocurrency".to_string(), 1),
                ("Financial".to_string(), 1),
                ("General".to_string(), 1),
            ]
        );
    }

    #[test]
    fn single_label_histograms_sum_to_paper_count() {
        let t = Taxonomies::builtin().expect("builtin");
        let papers = vec![
            paper(None, "A", "arXiv", "X", false),
            paper(None, "B", "KDD Workshop", "X", false),
            paper(None, "C", "KDD", "X", false),
            paper(None, "D", "", "X", false),
        ];
        let strata = taxonomy_counts(&papers, &t.venue_stratum);
        assert_eq!(strata.iter().map(|c| c.count).sum::<usize>(), papers.len());
    }

    #[test]
    fn multi_label_histogram_may_exceed_paper_count() {
        let t = Taxonomies::builtin().expect("builtin");
        let papers = vec![paper(
            None,
            "Contrastive Transformer with Attention",
            "",
            "X",
            false,
        )];
        let methods = taxonomy_counts(&papers, &t.method);
        assert_eq!(methods.iter().map(|c| c.count).sum::<usize>(), 3);
    }

    #[test]
    fn dataset_ties_follow_rule_order() {
        let t = Taxonomies::builtin().expect("builtin");
        // DGraph is seen first, but Ethereum is declared first in the rule table
        let papers = vec![
            paper(None, "DGraph Study", "", "X", false),
            paper(None, "Ethereum Study", "", "X", false),
            paper(None, "YelpChi and Amazon", "", "X", false),
            paper(None, "Amazon Reviews", "", "X", false),
        ];
        let labels: Vec<String> = dataset_counts(&papers, &t.dataset, 3)
            .into_iter()
            .map(|c| format!("{}={}", c.label, c.count))
            .collect();
        assert_eq!(labels, vec!["Amazon=2", "YelpChi=1", "Ethereum=1"]);
    }

    #[test]
    fn dataset_scenario_tags_both_mentions() {
        let t = Taxonomies::builtin().expect("builtin");
        let papers = vec![paper(
            Some(2023),
            "Anomaly Detection on Ethereum using DGraph",
            "KDD",
            "Graph-level Models",
            true,
        )];
        let labels: Vec<String> = dataset_counts(&papers, &t.dataset, 10)
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, vec!["Ethereum", "DGraph"]);
    }
}
