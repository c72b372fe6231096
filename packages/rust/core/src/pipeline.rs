//! End-to-end `build` pipeline: sync → load → parse → stats → enrich → write.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};
use uuid::Uuid;

use paperdash_artifacts::DashboardContext;
use paperdash_enrichment::{CitationOptions, GithubClient, OpenAlexClient};
use paperdash_shared::{
    AnalysisOptions, AppConfig, EnrichmentStats, PaperEntry, Result, resolve_github_token,
    resolve_openalex_email,
};

use crate::stats::build_stats;
use crate::taxonomy::Taxonomies;

/// `citation_note` when citations were not requested.
pub const CITATIONS_SKIPPED_NOTE: &str = "Citation fetch skipped (run without --skip-citations).";

/// Settings for the enrichment phase.
#[derive(Debug, Clone)]
pub struct EnrichmentOptions {
    /// Skip GitHub lookups for linked code.
    pub skip_code_fetch: bool,
    /// Skip OpenAlex citation lookups.
    pub skip_citations: bool,
    pub github_api_base: String,
    pub github_token: Option<String>,
    pub github_timeout_secs: u64,
    pub openalex_api_base: String,
    pub openalex_email: Option<String>,
    pub openalex_timeout_secs: u64,
    /// Requests in flight per API.
    pub concurrency: usize,
    pub citations_top_k: usize,
    pub citations_limit: Option<usize>,
    pub top_repos: usize,
}

impl From<&AppConfig> for EnrichmentOptions {
    fn from(config: &AppConfig) -> Self {
        let e = &config.enrichment;
        Self {
            skip_code_fetch: false,
            skip_citations: false,
            github_api_base: e.github_api_base.clone(),
            github_token: resolve_github_token(config),
            github_timeout_secs: e.github_timeout_secs,
            openalex_api_base: e.openalex_api_base.clone(),
            openalex_email: resolve_openalex_email(config),
            openalex_timeout_secs: e.openalex_timeout_secs,
            concurrency: e.concurrency,
            citations_top_k: e.citations_top_k,
            citations_limit: e.citations_limit,
            top_repos: e.top_repos,
        }
    }
}

/// Configuration for [`build_dashboard`].
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Git repository holding the list.
    pub repo_url: String,
    /// Local checkout of `repo_url`.
    pub repo_dir: PathBuf,
    /// Document path inside the checkout.
    pub readme: String,
    /// Use the checkout as-is instead of cloning or pulling.
    pub skip_sync: bool,
    pub output_dir: PathBuf,
    pub template: PathBuf,
    /// Write `data.json` only.
    pub json_only: bool,
    pub analysis: AnalysisOptions,
    /// Rule file replacing the built-in taxonomies.
    pub taxonomy_file: Option<PathBuf>,
    pub enrichment: EnrichmentOptions,
}

impl From<&AppConfig> for BuildConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            repo_url: config.source.repo_url.clone(),
            repo_dir: PathBuf::from(&config.source.repo_dir),
            readme: config.source.readme.clone(),
            skip_sync: false,
            output_dir: PathBuf::from(&config.output.output_dir),
            template: PathBuf::from(&config.output.template),
            json_only: false,
            analysis: AnalysisOptions::from(config),
            taxonomy_file: config.analysis.taxonomy_file.as_ref().map(PathBuf::from),
            enrichment: EnrichmentOptions::from(config),
        }
    }
}

/// Result of a finished build.
#[derive(Debug)]
pub struct BuildResult {
    pub run_id: Uuid,
    pub data_path: PathBuf,
    /// `None` for JSON-only builds.
    pub html_path: Option<PathBuf>,
    pub paper_count: usize,
    pub resource_count: usize,
    pub source_sha256: String,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &BuildResult) {}
}

/// The taxonomies to classify with: the rule file if given, else the built-in set.
pub fn load_taxonomies(path: Option<&Path>) -> Result<Taxonomies> {
    match path {
        Some(path) => Taxonomies::load(path),
        None => Taxonomies::builtin(),
    }
}

/// Run the full build.
///
/// 1. Sync the list repository (unless `skip_sync`)
/// 2. Load and fingerprint the document
/// 3. Parse it into papers and resources
/// 4. Classify and aggregate into a stats bundle
/// 5. Enrich with GitHub and OpenAlex data
/// 6. Write `data.json` and, unless `json_only`, `index.html`
#[instrument(skip_all, fields(repo_dir = %config.repo_dir.display(), output_dir = %config.output_dir.display()))]
pub async fn build_dashboard(
    config: &BuildConfig,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();

    // --- Phase 1: Sync ---
    if config.skip_sync {
        info!("skipping repository sync");
    } else {
        progress.phase("Syncing paper list repository");
        paperdash_source::sync_repo(&config.repo_url, &config.repo_dir).await?;
    }

    // --- Phase 2: Load ---
    progress.phase("Loading paper list");
    let text = paperdash_source::load_readme(&config.repo_dir, &config.readme)?;
    let digest = paperdash_source::source_digest(&text);

    // --- Phase 3: Parse ---
    progress.phase("Parsing paper list");
    let parsed = paperdash_markdown::parse_readme(&text);

    // --- Phase 4: Stats ---
    progress.phase("Computing statistics");
    let taxonomies = load_taxonomies(config.taxonomy_file.as_deref())?;
    let mut stats = build_stats(&parsed, &taxonomies, &config.analysis);

    // --- Phase 5: Enrichment ---
    stats.enrichment = enrich(&parsed.papers, &config.enrichment, progress).await?;

    // --- Phase 6: Artifacts ---
    progress.phase("Writing dashboard");
    let ctx = DashboardContext::new(&parsed, stats, digest);
    let data_path = paperdash_artifacts::write_data_json(&config.output_dir, &ctx)?;
    let html_path = if config.json_only {
        None
    } else {
        Some(paperdash_artifacts::render_dashboard(
            &config.template,
            &config.output_dir,
            &ctx,
        )?)
    };

    let result = BuildResult {
        run_id: ctx.run_id,
        data_path,
        html_path,
        paper_count: parsed.papers.len(),
        resource_count: parsed.resources.len(),
        source_sha256: ctx.source_sha256.clone(),
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        run_id = %result.run_id,
        papers = result.paper_count,
        resources = result.resource_count,
        elapsed_ms = result.elapsed.as_millis(),
        "build complete"
    );

    Ok(result)
}

/// Collect the enrichment fields for `papers`.
///
/// Only client construction can fail; lookup failures end up as missing
/// repositories or a `citation_note`.
#[instrument(skip_all, fields(papers = papers.len()))]
pub async fn enrich(
    papers: &[PaperEntry],
    opts: &EnrichmentOptions,
    progress: &dyn ProgressReporter,
) -> Result<EnrichmentStats> {
    let mut enrichment = EnrichmentStats::default();

    if opts.skip_code_fetch {
        info!("skipping code repository lookups");
    } else {
        let names = paperdash_enrichment::unique_github_repos(
            papers.iter().filter_map(|p| p.code_url.as_deref()),
        );
        if !names.is_empty() {
            progress.phase(&format!("Fetching {} code repositories", names.len()));
            if opts.github_token.is_none() {
                warn!("no GitHub token set, requests are subject to anonymous rate limits");
            }
            let client = GithubClient::new(
                &opts.github_api_base,
                opts.github_token.clone(),
                opts.github_timeout_secs,
            )?;
            enrichment.code_repos = client.fetch_all_metadata(&names, opts.concurrency).await;
        }
        enrichment.language_counts = paperdash_enrichment::aggregate_languages(&enrichment.code_repos);
        enrichment.top_repos = paperdash_enrichment::top_repos(&enrichment.code_repos, opts.top_repos);
    }

    if opts.skip_citations {
        enrichment.citation_note = Some(CITATIONS_SKIPPED_NOTE.to_string());
    } else {
        progress.phase("Fetching citation counts");
        let client = OpenAlexClient::new(
            &opts.openalex_api_base,
            opts.openalex_email.clone(),
            opts.openalex_timeout_secs,
        )?;
        let citation_opts = CitationOptions {
            top_k: opts.citations_top_k,
            limit: opts.citations_limit,
            concurrency: opts.concurrency,
        };
        let report = client.fetch_top_cited(papers, &citation_opts).await;
        enrichment.top_cited = report.entries;
        enrichment.citation_note = report.note;
        enrichment.citation_source = report.source;
    }

    Ok(enrichment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FIXTURE: &str = include_str!("../../../../fixtures/markdown/paper-list.md");

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("paperdash-{tag}-{}", Uuid::now_v7()))
    }

    fn offline_config(root: &Path) -> BuildConfig {
        let repo_dir = root.join("repo");
        std::fs::create_dir_all(&repo_dir).unwrap();
        std::fs::write(repo_dir.join("README.md"), FIXTURE).unwrap();

        let mut config = BuildConfig::from(&AppConfig::default());
        config.repo_dir = repo_dir;
        config.skip_sync = true;
        config.output_dir = root.join("site");
        config.template = root.join("missing-template.html");
        config.enrichment.skip_code_fetch = true;
        config.enrichment.skip_citations = true;
        config
    }

    #[tokio::test]
    async fn offline_build_writes_both_files() {
        let root = scratch_dir("build");
        let config = offline_config(&root);

        let result = build_dashboard(&config, &SilentProgress).await.unwrap();
        assert_eq!(result.paper_count, 6);
        assert_eq!(result.resource_count, 4);
        assert_eq!(result.source_sha256, paperdash_source::source_digest(FIXTURE));

        let data: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&result.data_path).unwrap()).unwrap();
        assert_eq!(data["stats"]["paper_count"], 6);
        assert_eq!(data["stats"]["citation_note"], CITATIONS_SKIPPED_NOTE);
        assert_eq!(data["stats"]["top_cited"], serde_json::json!([]));
        assert_eq!(data["papers"][0]["has_code"], true);

        let html = std::fs::read_to_string(result.html_path.unwrap()).unwrap();
        assert!(html.contains("Anomaly Detection on Ethereum using DGraph"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn json_only_skips_html() {
        let root = scratch_dir("json-only");
        let mut config = offline_config(&root);
        config.json_only = true;

        let result = build_dashboard(&config, &SilentProgress).await.unwrap();
        assert!(result.html_path.is_none());
        assert!(!config.output_dir.join("index.html").exists());
        assert!(result.data_path.exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn missing_document_is_an_error() {
        let root = scratch_dir("missing-doc");
        let mut config = offline_config(&root);
        config.readme = "NOT_HERE.md".into();

        let err = build_dashboard(&config, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, paperdash_shared::PaperDashError::Io { .. }));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn bad_taxonomy_file_is_a_config_error() {
        let root = scratch_dir("bad-taxonomy");
        let mut config = offline_config(&root);
        let rules = root.join("rules.toml");
        std::fs::write(&rules, "[method]\nmode = \"sometimes\"\n").unwrap();
        config.taxonomy_file = Some(rules);

        let err = build_dashboard(&config, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, paperdash_shared::PaperDashError::Config { .. }));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn enrichment_merges_without_touching_papers() {
        let github = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/YingtongDou/CARE-GNN"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "html_url": "https://github.com/YingtongDou/CARE-GNN",
                "stargazers_count": 250,
                "language": "Python"
            })))
            .mount(&github)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/YingtongDou/CARE-GNN/languages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Python": 900})))
            .mount(&github)
            .await;
        // Every other repository is missing
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&github)
            .await;

        let openalex = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("filter", "doi:10.1145/3340531.3411903"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"id": "https://openalex.org/W1", "display_name": "CARE-GNN", "cited_by_count": 480}]
            })))
            .mount(&openalex)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
            .mount(&openalex)
            .await;

        let parsed = paperdash_markdown::parse_readme(FIXTURE);
        let before = parsed.papers.clone();

        let mut opts = EnrichmentOptions::from(&AppConfig::default());
        opts.github_api_base = github.uri();
        opts.github_token = None;
        opts.openalex_api_base = openalex.uri();
        opts.openalex_email = None;

        let enrichment = enrich(&parsed.papers, &opts, &SilentProgress).await.unwrap();

        assert_eq!(enrichment.code_repos.len(), 1);
        assert_eq!(enrichment.top_repos[0].full_name, "YingtongDou/CARE-GNN");
        assert_eq!(enrichment.language_counts[0].language, "Python");
        assert_eq!(enrichment.language_counts[0].bytes, 900);
        assert_eq!(enrichment.top_cited.len(), 1);
        assert_eq!(enrichment.top_cited[0].citation_count, 480);
        assert_eq!(enrichment.citation_source.as_deref(), Some("OpenAlex"));
        assert_eq!(parsed.papers, before);
    }
}
