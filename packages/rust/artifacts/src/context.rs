//! The data handed to the dashboard: papers, stats and resources for one run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use paperdash_shared::{PaperEntry, ParseResult, ResourceLink, StatsBundle};

/// A paper as the dashboard sees it, with `has_code` precomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperView {
    #[serde(flatten)]
    pub paper: PaperEntry,
    pub has_code: bool,
}

impl From<&PaperEntry> for PaperView {
    fn from(paper: &PaperEntry) -> Self {
        Self {
            paper: paper.clone(),
            has_code: paper.has_code(),
        }
    }
}

/// Everything written to `data.json` and injected into the HTML template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardContext {
    pub generated_at: DateTime<Utc>,
    pub run_id: Uuid,
    /// SHA-256 of the source document this run was built from.
    pub source_sha256: String,
    pub papers: Vec<PaperView>,
    pub stats: StatsBundle,
    pub resources: Vec<ResourceLink>,
}

impl DashboardContext {
    pub fn new(parsed: &ParseResult, stats: StatsBundle, source_sha256: impl Into<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            run_id: Uuid::now_v7(),
            source_sha256: source_sha256.into(),
            papers: parsed.papers.iter().map(PaperView::from).collect(),
            stats,
            resources: parsed.resources.clone(),
        }
    }
}
