//! GitHub repository metadata for papers that link their code.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};
use url::Url;

use paperdash_shared::{LanguageBytes, PaperDashError, RepoMetadata, RepoSummary, Result};

use crate::USER_AGENT;

// ---------------------------------------------------------------------------
// URL helpers
// ---------------------------------------------------------------------------

/// `owner/repo` for a github.com URL, with any `.git` suffix removed.
///
/// Returns `None` for other hosts and for URLs without two path segments.
pub fn extract_repo_full_name(url: &str) -> Option<String> {
    if !url.contains("github.com") {
        return None;
    }
    let parsed = Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    Some(format!("{owner}/{repo}"))
}

/// Distinct `owner/repo` names in first-seen order.
pub fn unique_github_repos<'a>(urls: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter_map(extract_repo_full_name)
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// API client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RepoResponse {
    html_url: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
}

/// Read-only client for the repository endpoints.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(api_base: &str, token: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PaperDashError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// GET `{api_base}/{path}`. A 404 is `Ok(None)`; other failures are errors.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}/{path}", self.api_base);
        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PaperDashError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PaperDashError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .json::<T>()
            .await
            .map_err(|e| PaperDashError::parse(format!("{url}: invalid JSON: {e}")))?;
        Ok(Some(body))
    }

    /// Metadata and language breakdown for one repository.
    ///
    /// Missing repositories and request failures both give `None`; failures
    /// are logged.
    #[instrument(skip(self))]
    pub async fn fetch_repo_metadata(&self, full_name: &str) -> Option<RepoMetadata> {
        match self.try_fetch_repo_metadata(full_name).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!(repo = %full_name, error = %e, "skipping repository");
                None
            }
        }
    }

    async fn try_fetch_repo_metadata(&self, full_name: &str) -> Result<Option<RepoMetadata>> {
        let Some(repo) = self
            .get_json::<RepoResponse>(&format!("repos/{full_name}"))
            .await?
        else {
            debug!(repo = %full_name, "repository not found");
            return Ok(None);
        };

        let languages = self
            .get_json::<BTreeMap<String, u64>>(&format!("repos/{full_name}/languages"))
            .await?
            .unwrap_or_default();

        Ok(Some(RepoMetadata {
            full_name: full_name.to_string(),
            url: repo
                .html_url
                .unwrap_or_else(|| format!("https://github.com/{full_name}")),
            stars: repo.stargazers_count,
            language: repo.language,
            topics: repo.topics,
            languages,
        }))
    }

    /// Fetch many repositories with at most `concurrency` requests in flight.
    ///
    /// Results keep the order of `names`; repositories that could not be
    /// fetched are left out.
    #[instrument(skip_all, fields(repos = names.len(), concurrency = concurrency))]
    pub async fn fetch_all_metadata(&self, names: &[String], concurrency: usize) -> Vec<RepoMetadata> {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut handles = Vec::with_capacity(names.len());

        for name in names {
            let client = self.clone();
            let sem = semaphore.clone();
            let name = name.clone();
            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.ok()?;
                client.fetch_repo_metadata(&name).await
            }));
        }

        let mut repos = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Some(meta)) => repos.push(meta),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "repository fetch task failed"),
            }
        }

        info!(fetched = repos.len(), requested = names.len(), "fetched repository metadata");
        repos
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Total bytes per language across repositories, largest first.
///
/// A repository with no language breakdown adds 1 to its primary language.
/// Ties keep first-seen order.
pub fn aggregate_languages(repos: &[RepoMetadata]) -> Vec<LanguageBytes> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<LanguageBytes> = Vec::new();
    let mut add = |language: &str, bytes: u64| match index.get(language) {
        Some(&slot) => totals[slot].bytes += bytes,
        None => {
            index.insert(language.to_string(), totals.len());
            totals.push(LanguageBytes {
                language: language.to_string(),
                bytes,
            });
        }
    };

    for repo in repos {
        if !repo.languages.is_empty() {
            for (language, bytes) in &repo.languages {
                add(language, *bytes);
            }
        } else if let Some(language) = &repo.language {
            add(language, 1);
        }
    }

    totals.sort_by(|a, b| b.bytes.cmp(&a.bytes));
    totals
}

/// The `n` most starred repositories.
pub fn top_repos(repos: &[RepoMetadata], n: usize) -> Vec<RepoSummary> {
    let mut summaries: Vec<RepoSummary> = repos.iter().map(RepoSummary::from).collect();
    summaries.sort_by(|a, b| b.stars.cmp(&a.stars));
    summaries.truncate(n);
    summaries
}
