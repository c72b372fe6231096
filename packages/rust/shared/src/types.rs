//! Core domain types: parsed catalogue records and the stats bundle.
//!
//! Everything here is plain data. Records are built once per run by the
//! markdown parser and never mutated afterwards; the stats bundle is built
//! once by the analysis layer and only extended additively by enrichment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Parsed records
// ---------------------------------------------------------------------------

/// One catalogued paper (a single table row of the source list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperEntry {
    /// Publication year; `None` when the year cell is not an integer.
    pub year: Option<i32>,
    /// Normalized display title (never empty).
    pub title: String,
    /// Free-text venue, may be empty.
    pub venue: String,
    /// First absolute URL found in the paper cell.
    pub paper_url: Option<String>,
    /// First absolute URL found in the code cell.
    pub code_url: Option<String>,
    /// Enclosing `## ` section at flush time.
    pub category: String,
    /// Enclosing `### ` section, cleared on every `## ` heading.
    pub subcategory: Option<String>,
}

impl PaperEntry {
    /// Whether a code link was found for this paper.
    pub fn has_code(&self) -> bool {
        self.code_url.is_some()
    }
}

/// A bare link (survey, dataset, toolbox) listed in a resource-only section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub title: String,
    pub url: String,
    pub category: String,
}

/// Output of parsing one document: papers and resources in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub papers: Vec<PaperEntry>,
    pub resources: Vec<ResourceLink>,
}

// ---------------------------------------------------------------------------
// Aggregate views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueCount {
    pub venue: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

/// One bucket of a taxonomy histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Share of papers that link a code repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeAvailability {
    pub with_code: usize,
    pub total: usize,
    /// `100 * with_code / total` rounded to two decimals, `0.0` when `total == 0`.
    pub percentage: f64,
}

// ---------------------------------------------------------------------------
// Enrichment views
// ---------------------------------------------------------------------------

/// Metadata for one GitHub repository referenced by a code link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetadata {
    /// `owner/repo`.
    pub full_name: String,
    pub url: String,
    pub stars: u64,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Bytes of source per language, as reported by GitHub.
    #[serde(default)]
    pub languages: BTreeMap<String, u64>,
}

/// Compact repository row for the "top repos" view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub full_name: String,
    pub stars: u64,
    pub url: String,
    pub language: Option<String>,
}

impl From<&RepoMetadata> for RepoSummary {
    fn from(repo: &RepoMetadata) -> Self {
        Self {
            full_name: repo.full_name.clone(),
            stars: repo.stars,
            url: repo.url.clone(),
            language: repo.language.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageBytes {
    pub language: String,
    pub bytes: u64,
}

/// A paper with a citation count resolved from OpenAlex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitedPaper {
    pub title: String,
    pub citation_count: u64,
    pub year: Option<i32>,
    pub venue: Option<String>,
    pub paper_url: Option<String>,
    pub openalex_url: Option<String>,
}

/// Fields contributed by the enrichment layer. Merged into [`StatsBundle`]
/// without touching the core aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentStats {
    #[serde(default)]
    pub language_counts: Vec<LanguageBytes>,
    #[serde(default)]
    pub code_repos: Vec<RepoMetadata>,
    #[serde(default)]
    pub top_repos: Vec<RepoSummary>,
    #[serde(default)]
    pub top_cited: Vec<CitedPaper>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_note: Option<String>,
}

// ---------------------------------------------------------------------------
// StatsBundle
// ---------------------------------------------------------------------------

/// All aggregate views for one run, consumed by the rendering layer.
///
/// `method_counts` and `dataset_counts` are multi-label: one paper may add to
/// several buckets, so their sums can exceed `paper_count`. `domain_counts`
/// and `venue_strata` are single-label and always sum to `paper_count`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsBundle {
    pub paper_count: usize,
    pub resource_count: usize,
    pub year_counts: Vec<YearCount>,
    pub category_counts: Vec<CategoryCount>,
    pub venue_counts: Vec<VenueCount>,
    pub topics: Vec<TopicCount>,
    pub code_availability: CodeAvailability,
    pub method_counts: Vec<LabelCount>,
    pub domain_counts: Vec<LabelCount>,
    pub venue_strata: Vec<LabelCount>,
    pub dataset_counts: Vec<LabelCount>,
    pub insights: Vec<String>,
    #[serde(flatten)]
    pub enrichment: EnrichmentStats,
}
