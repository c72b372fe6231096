//! Application configuration for paperdash.
//!
//! User config lives at `~/.paperdash/paperdash.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PaperDashError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "paperdash.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".paperdash";

// ---------------------------------------------------------------------------
// Config structs (matching paperdash.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the curated list comes from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Where the dashboard is written.
    #[serde(default)]
    pub output: OutputConfig,

    /// Aggregation limits and taxonomy overrides.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// GitHub / OpenAlex lookups.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Git repository holding the curated paper list.
    #[serde(default = "default_repo_url")]
    pub repo_url: String,

    /// Local checkout directory.
    #[serde(default = "default_repo_dir")]
    pub repo_dir: String,

    /// Markdown file inside the checkout.
    #[serde(default = "default_readme")]
    pub readme: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repo_url: default_repo_url(),
            repo_dir: default_repo_dir(),
            readme: default_readme(),
        }
    }
}

fn default_repo_url() -> String {
    "https://github.com/safe-graph/graph-fraud-detection-papers".into()
}
fn default_repo_dir() -> String {
    "data/papers_repo".into()
}
fn default_readme() -> String {
    "README.md".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `data.json` and `index.html`.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Handlebars template reading `{{{papers_json}}}` and friends.
    #[serde(default = "default_template")]
    pub template: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            template: default_template(),
        }
    }
}

fn default_output_dir() -> String {
    "site".into()
}
fn default_template() -> String {
    "templates/index.html".into()
}

/// `[analysis]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of venues kept in the venue histogram.
    #[serde(default = "default_venue_top_k")]
    pub venue_top_k: usize,

    /// Number of topic words kept.
    #[serde(default = "default_topic_top_k")]
    pub topic_top_k: usize,

    /// Number of dataset labels kept.
    #[serde(default = "default_dataset_top_k")]
    pub dataset_top_k: usize,

    /// Optional operator-edited taxonomy file replacing the built-in rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy_file: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            venue_top_k: default_venue_top_k(),
            topic_top_k: default_topic_top_k(),
            dataset_top_k: default_dataset_top_k(),
            taxonomy_file: None,
        }
    }
}

fn default_venue_top_k() -> usize {
    15
}
fn default_topic_top_k() -> usize {
    20
}
fn default_dataset_top_k() -> usize {
    10
}

/// `[enrichment]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// GitHub REST API root.
    #[serde(default = "default_github_api_base")]
    pub github_api_base: String,

    /// Env vars checked in order for a GitHub token (never store the token itself).
    #[serde(default = "default_github_token_envs")]
    pub github_token_envs: Vec<String>,

    /// OpenAlex works endpoint.
    #[serde(default = "default_openalex_api_base")]
    pub openalex_api_base: String,

    /// Env var holding the OpenAlex polite-pool email.
    #[serde(default = "default_openalex_email_env")]
    pub openalex_email_env: String,

    /// Timeout for GitHub requests in seconds.
    #[serde(default = "default_github_timeout")]
    pub github_timeout_secs: u64,

    /// Timeout for OpenAlex requests in seconds.
    #[serde(default = "default_openalex_timeout")]
    pub openalex_timeout_secs: u64,

    /// Maximum concurrent GitHub requests.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Number of most-cited papers kept.
    #[serde(default = "default_citations_top_k")]
    pub citations_top_k: usize,

    /// Cap on papers queried for citations (all when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations_limit: Option<usize>,

    /// Number of repositories in the "top repos" view.
    #[serde(default = "default_top_repos")]
    pub top_repos: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            github_api_base: default_github_api_base(),
            github_token_envs: default_github_token_envs(),
            openalex_api_base: default_openalex_api_base(),
            openalex_email_env: default_openalex_email_env(),
            github_timeout_secs: default_github_timeout(),
            openalex_timeout_secs: default_openalex_timeout(),
            concurrency: default_concurrency(),
            citations_top_k: default_citations_top_k(),
            citations_limit: None,
            top_repos: default_top_repos(),
        }
    }
}

fn default_github_api_base() -> String {
    "https://api.github.com".into()
}
fn default_github_token_envs() -> Vec<String> {
    vec!["GITHUB_TOKEN".into(), "GH_TOKEN".into()]
}
fn default_openalex_api_base() -> String {
    "https://api.openalex.org/works".into()
}
fn default_openalex_email_env() -> String {
    "OPENALEX_EMAIL".into()
}
fn default_github_timeout() -> u64 {
    10
}
fn default_openalex_timeout() -> u64 {
    30
}
fn default_concurrency() -> usize {
    4
}
fn default_citations_top_k() -> usize {
    10
}
fn default_top_repos() -> usize {
    10
}

// ---------------------------------------------------------------------------
// Analysis options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime aggregation limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub venue_top_k: usize,
    pub topic_top_k: usize,
    pub dataset_top_k: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for AnalysisOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            venue_top_k: config.analysis.venue_top_k,
            topic_top_k: config.analysis.topic_top_k,
            dataset_top_k: config.analysis.dataset_top_k,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.paperdash/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PaperDashError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.paperdash/paperdash.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PaperDashError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        PaperDashError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PaperDashError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PaperDashError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PaperDashError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// First non-empty GitHub token among the configured env vars.
pub fn resolve_github_token(config: &AppConfig) -> Option<String> {
    config
        .enrichment
        .github_token_envs
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|val| !val.is_empty())
}

/// OpenAlex contact email, if the configured env var is set.
pub fn resolve_openalex_email(config: &AppConfig) -> Option<String> {
    std::env::var(&config.enrichment.openalex_email_env)
        .ok()
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("repo_url"));
        assert!(toml_str.contains("GITHUB_TOKEN"));
        assert!(!toml_str.contains("taxonomy_file"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.analysis.venue_top_k, 15);
        assert_eq!(parsed.analysis.topic_top_k, 20);
        assert_eq!(parsed.enrichment.openalex_email_env, "OPENALEX_EMAIL");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[source]
repo_dir = "/tmp/papers"

[analysis]
topic_top_k = 5
taxonomy_file = "rules/taxonomy.toml"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.source.repo_dir, "/tmp/papers");
        assert_eq!(config.source.readme, "README.md");
        assert_eq!(config.analysis.topic_top_k, 5);
        assert_eq!(config.analysis.venue_top_k, 15);
        assert_eq!(
            config.analysis.taxonomy_file.as_deref(),
            Some("rules/taxonomy.toml")
        );
        assert_eq!(config.enrichment.concurrency, 4);
    }

    #[test]
    fn analysis_options_from_app_config() {
        let mut app = AppConfig::default();
        app.analysis.dataset_top_k = 3;
        let opts = AnalysisOptions::from(&app);
        assert_eq!(opts.venue_top_k, 15);
        assert_eq!(opts.topic_top_k, 20);
        assert_eq!(opts.dataset_top_k, 3);
    }

    #[test]
    fn github_token_skips_unset_vars() {
        let mut config = AppConfig::default();
        // Unique env var names to avoid interfering with other tests
        config.enrichment.github_token_envs = vec![
            "PD_TEST_NONEXISTENT_TOKEN_12345".into(),
            "PD_TEST_NONEXISTENT_TOKEN_67890".into(),
        ];
        assert!(resolve_github_token(&config).is_none());
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let err = load_config_from(Path::new("/nonexistent/paperdash.toml")).unwrap_err();
        assert!(matches!(err, PaperDashError::Io { .. }));
    }
}
