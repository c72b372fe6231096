//! Citation counts from OpenAlex.
//!
//! Papers whose link carries a DOI are looked up with a `doi:` filter. The
//! rest go through a title search, where the best-scoring candidate is kept
//! if it is similar enough. Results are deduplicated by normalized title and
//! the most cited are returned.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use paperdash_shared::{CitedPaper, PaperDashError, PaperEntry, Result};

use crate::USER_AGENT;
use crate::titles::{normalize_title, title_similarity};

/// Label recorded as `citation_source` when any lookup succeeded.
pub const CITATION_SOURCE: &str = "OpenAlex";

/// Note recorded when no lookup returned a count.
pub const NO_DATA_NOTE: &str = "No citation data returned from OpenAlex.";

/// Minimum similarity for a title-search candidate to be accepted.
pub const MIN_TITLE_SCORE: f64 = 0.6;

/// Bonus added to a candidate's score when its publication year matches.
const YEAR_MATCH_BONUS: f64 = 0.05;

/// Candidates requested per title search.
const SEARCH_PAGE_SIZE: &str = "5";

const SELECT_FIELDS: &str = "id,doi,display_name,cited_by_count,publication_year,primary_location";

/// DOI prefix arXiv registers its preprints under.
const ARXIV_DOI_PREFIX: &str = "10.48550/arxiv.";

static DOI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)10\.\d{4,9}/[^\s?#]+").expect("valid DOI regex"));

static ARXIV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)arxiv\.org/(?:abs|pdf)/([^?#]+)").expect("valid arXiv regex")
});

static ARXIV_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v\d+$").expect("valid arXiv version regex"));

// ---------------------------------------------------------------------------
// Identifier extraction
// ---------------------------------------------------------------------------

/// First DOI in a URL, without trailing punctuation.
pub fn extract_doi(url: &str) -> Option<String> {
    let doi = DOI_RE.find(url)?.as_str();
    Some(doi.trim_end_matches([')', '.', ',', ';']).to_string())
}

/// arXiv identifier from an `arxiv.org/abs/...` or `arxiv.org/pdf/...` URL,
/// without a `.pdf` suffix or version.
pub fn extract_arxiv_id(url: &str) -> Option<String> {
    let raw = ARXIV_RE.captures(url)?.get(1)?.as_str();
    let decoded = urlencoding::decode(raw)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    let trimmed = decoded.trim().replace(".pdf", "");
    let id = ARXIV_VERSION_RE.replace(&trimmed, "").into_owned();
    (!id.is_empty()).then_some(id)
}

/// OpenAlex `filter` value for a paper URL carrying a DOI.
pub fn doi_filter(url: &str) -> Option<String> {
    extract_doi(url).map(|doi| format!("doi:{}", doi.to_lowercase()))
}

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WorksPage {
    #[serde(default)]
    results: Vec<Work>,
}

#[derive(Debug, Clone, Deserialize)]
struct Work {
    id: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    cited_by_count: Option<u64>,
    publication_year: Option<i32>,
    primary_location: Option<Location>,
}

#[derive(Debug, Clone, Deserialize)]
struct Location {
    landing_page_url: Option<String>,
    source: Option<Source>,
}

#[derive(Debug, Clone, Deserialize)]
struct Source {
    display_name: Option<String>,
}

impl Work {
    fn venue(&self) -> Option<String> {
        self.primary_location
            .as_ref()?
            .source
            .as_ref()?
            .display_name
            .clone()
    }

    fn landing_url(&self) -> Option<String> {
        self.primary_location
            .as_ref()
            .and_then(|loc| loc.landing_page_url.clone())
            .or_else(|| self.id.clone())
    }
}

/// Combine a listed paper with the work OpenAlex matched it to.
///
/// The listing's own fields win; OpenAlex only fills gaps.
fn cited_paper(paper: &PaperEntry, work: &Work) -> Option<CitedPaper> {
    let citation_count = work.cited_by_count?;
    Some(CitedPaper {
        title: paper.title.clone(),
        citation_count,
        year: paper.year.or(work.publication_year),
        venue: Some(paper.venue.clone())
            .filter(|v| !v.is_empty())
            .or_else(|| work.venue()),
        paper_url: paper.paper_url.clone().or_else(|| work.landing_url()),
        openalex_url: work.id.clone(),
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Tuning for [`OpenAlexClient::fetch_top_cited`].
#[derive(Debug, Clone)]
pub struct CitationOptions {
    /// Number of papers returned.
    pub top_k: usize,
    /// Only the first `limit` papers are looked up.
    pub limit: Option<usize>,
    /// Requests in flight at once.
    pub concurrency: usize,
}

impl Default for CitationOptions {
    fn default() -> Self {
        Self {
            top_k: 10,
            limit: None,
            concurrency: 4,
        }
    }
}

/// Outcome of a citation run. Failures are reported here, never as errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitationReport {
    pub entries: Vec<CitedPaper>,
    pub note: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone)]
enum Lookup {
    Doi(String),
    Title { arxiv_id: Option<String> },
}

#[derive(Debug, Clone)]
pub struct OpenAlexClient {
    client: Client,
    works_url: String,
    email: Option<String>,
}

impl OpenAlexClient {
    pub fn new(works_url: &str, email: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PaperDashError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            works_url: works_url.trim_end_matches('/').to_string(),
            email,
        })
    }

    async fn query_works(&self, params: &[(&str, &str)]) -> Result<Vec<Work>> {
        let mut request = self
            .client
            .get(&self.works_url)
            .query(&[("select", SELECT_FIELDS)])
            .query(params);
        if let Some(email) = &self.email {
            request = request.query(&[("mailto", email.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PaperDashError::Network(format!("OpenAlex request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(PaperDashError::Network(format!(
                "OpenAlex returned HTTP {status}: {snippet}"
            )));
        }

        let page = response
            .json::<WorksPage>()
            .await
            .map_err(|e| PaperDashError::parse(format!("OpenAlex returned invalid JSON: {e}")))?;
        Ok(page.results)
    }

    /// First work matching an OpenAlex filter expression.
    async fn fetch_by_filter(&self, filter: &str) -> Option<Work> {
        match self.query_works(&[("filter", filter), ("per-page", "1")]).await {
            Ok(works) => works.into_iter().next(),
            Err(e) => {
                warn!(%filter, error = %e, "OpenAlex filter lookup failed");
                None
            }
        }
    }

    /// Best title-search candidate scoring at least [`MIN_TITLE_SCORE`].
    async fn search_by_title(&self, title: &str, year: Option<i32>) -> Option<Work> {
        let candidates = match self
            .query_works(&[("search", title), ("per-page", SEARCH_PAGE_SIZE)])
            .await
        {
            Ok(works) => works,
            Err(e) => {
                warn!(%title, error = %e, "OpenAlex title search failed");
                return None;
            }
        };

        let mut best: Option<(f64, Work)> = None;
        for candidate in candidates {
            let mut score =
                title_similarity(title, candidate.display_name.as_deref().unwrap_or_default());
            if year.is_some() && candidate.publication_year == year {
                score += YEAR_MATCH_BONUS;
            }
            if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
                best = Some((score, candidate));
            }
        }

        match best {
            Some((score, work)) if score >= MIN_TITLE_SCORE => Some(work),
            Some((score, _)) => {
                debug!(%title, score, "no title candidate above threshold");
                None
            }
            None => None,
        }
    }

    async fn lookup(&self, paper: &PaperEntry, lookup: &Lookup) -> Option<CitedPaper> {
        let work = match lookup {
            Lookup::Doi(filter) => self.fetch_by_filter(filter).await,
            Lookup::Title { arxiv_id } => match self.search_by_title(&paper.title, paper.year).await {
                Some(work) => Some(work),
                None => match arxiv_id {
                    Some(id) => {
                        let filter = format!("doi:{ARXIV_DOI_PREFIX}{}", id.to_lowercase());
                        self.fetch_by_filter(&filter).await
                    }
                    None => None,
                },
            },
        }?;
        cited_paper(paper, &work)
    }

    /// Citation counts for `papers`, most cited first.
    ///
    /// DOI lookups run before title searches. Every failure is logged and
    /// skipped; when nothing comes back the report carries a note instead.
    #[instrument(skip_all, fields(papers = papers.len(), top_k = opts.top_k))]
    pub async fn fetch_top_cited(&self, papers: &[PaperEntry], opts: &CitationOptions) -> CitationReport {
        let selected = &papers[..opts.limit.unwrap_or(papers.len()).min(papers.len())];

        let mut by_doi = Vec::new();
        let mut by_title = Vec::new();
        for paper in selected {
            let url = paper.paper_url.as_deref().unwrap_or_default();
            match doi_filter(url) {
                Some(filter) => by_doi.push((paper.clone(), Lookup::Doi(filter))),
                None => by_title.push((
                    paper.clone(),
                    Lookup::Title {
                        arxiv_id: extract_arxiv_id(url),
                    },
                )),
            }
        }
        info!(doi = by_doi.len(), title = by_title.len(), "looking up citations");

        let semaphore = Arc::new(Semaphore::new(opts.concurrency.max(1)));
        let mut handles = Vec::with_capacity(selected.len());
        for (paper, lookup) in by_doi.into_iter().chain(by_title) {
            let client = self.clone();
            let sem = semaphore.clone();
            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.ok()?;
                client.lookup(&paper, &lookup).await
            }));
        }

        let mut found = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Some(entry)) => found.push(entry),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "citation lookup task failed"),
            }
        }

        if found.is_empty() {
            return CitationReport {
                entries: Vec::new(),
                note: Some(NO_DATA_NOTE.to_string()),
                source: None,
            };
        }

        let entries = dedupe_entries(found, opts.top_k);
        info!(entries = entries.len(), "citation lookup complete");
        CitationReport {
            entries,
            note: None,
            source: Some(CITATION_SOURCE.to_string()),
        }
    }
}

/// Most cited first, one entry per normalized title, at most `top_k`.
///
/// Equal counts keep their input order.
pub fn dedupe_entries(mut entries: Vec<CitedPaper>, top_k: usize) -> Vec<CitedPaper> {
    entries.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
    let mut seen = std::collections::HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(normalize_title(&entry.title)))
        .take(top_k)
        .collect()
}
