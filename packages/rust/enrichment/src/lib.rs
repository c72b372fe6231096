//! Read-only enrichment from public web APIs.
//!
//! - [`github`]: repository metadata and language breakdowns for papers that
//!   link their code on GitHub.
//! - [`citations`]: citation counts from OpenAlex, matched by DOI or title.
//!
//! Nothing here mutates a [`PaperEntry`](paperdash_shared::PaperEntry).
//! Network failures are logged and come back as missing data, so a flaky
//! API never aborts a build.

pub mod citations;
pub mod github;
pub mod titles;

pub use citations::{
    CITATION_SOURCE, CitationOptions, CitationReport, NO_DATA_NOTE, OpenAlexClient, dedupe_entries,
    extract_arxiv_id, extract_doi,
};
pub use github::{
    GithubClient, aggregate_languages, extract_repo_full_name, top_repos, unique_github_repos,
};
pub use titles::{normalize_title, title_similarity};

/// User-Agent sent with every enrichment request.
pub(crate) const USER_AGENT: &str = concat!("paperdash/", env!("CARGO_PKG_VERSION"));
