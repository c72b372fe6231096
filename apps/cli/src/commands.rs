//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use paperdash_core::pipeline::{BuildConfig, BuildResult, ProgressReporter};
use paperdash_shared::{AnalysisOptions, AppConfig, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// paperdash: turn a curated markdown paper list into a statistics dashboard.
#[derive(Parser)]
#[command(
    name = "paperdash",
    version,
    about = "Parse a curated paper list, classify and aggregate it, and render a static dashboard.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.paperdash/paperdash.toml).
    #[arg(long, global = true, env = "PAPERDASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Sync the list, compute statistics, enrich them and write the dashboard.
    Build(BuildArgs),

    /// Parse a markdown file and print papers and resources as JSON.
    Parse {
        /// Markdown file to parse.
        file: PathBuf,
    },

    /// Print the statistics bundle for a markdown file as JSON (no network).
    Stats {
        /// Markdown file to analyze.
        file: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `paperdash build`. Each one overrides the config file.
#[derive(Args, Debug, Default)]
pub(crate) struct BuildArgs {
    /// Use the existing checkout instead of cloning or pulling.
    #[arg(long)]
    pub skip_sync: bool,

    /// Skip GitHub lookups for linked code.
    #[arg(long)]
    pub skip_code_fetch: bool,

    /// Skip OpenAlex citation lookups.
    #[arg(long)]
    pub skip_citations: bool,

    /// Only look up citations for the first N papers.
    #[arg(long, value_name = "N")]
    pub citations_limit: Option<usize>,

    /// Number of most-cited papers to keep.
    #[arg(long, value_name = "K")]
    pub citations_top_k: Option<usize>,

    /// Write data.json only, no HTML.
    #[arg(long)]
    pub json_only: bool,

    /// Output directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// HTML template.
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Local checkout of the paper list repository.
    #[arg(long)]
    pub repo_dir: Option<PathBuf>,

    /// Paper list repository URL.
    #[arg(long)]
    pub repo_url: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "paperdash=info",
        1 => "paperdash=debug",
        _ => "paperdash=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so `parse` and `stats` output stays pipeable.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;
    match cli.command {
        Command::Build(args) => cmd_build(&config, &args).await,
        Command::Parse { file } => cmd_parse(&file),
        Command::Stats { file } => cmd_stats(&config, &file),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Merge config file values with `build` flags.
pub(crate) fn build_config(config: &AppConfig, args: &BuildArgs) -> BuildConfig {
    let mut build = BuildConfig::from(config);

    build.skip_sync = args.skip_sync;
    build.json_only = args.json_only;
    build.enrichment.skip_code_fetch = args.skip_code_fetch;
    build.enrichment.skip_citations = args.skip_citations;

    if let Some(limit) = args.citations_limit {
        build.enrichment.citations_limit = Some(limit);
    }
    if let Some(top_k) = args.citations_top_k {
        build.enrichment.citations_top_k = top_k;
    }
    if let Some(dir) = &args.output_dir {
        build.output_dir = dir.clone();
    }
    if let Some(template) = &args.template {
        build.template = template.clone();
    }
    if let Some(dir) = &args.repo_dir {
        build.repo_dir = dir.clone();
    }
    if let Some(url) = &args.repo_url {
        build.repo_url = url.clone();
    }

    build
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(config: &AppConfig, args: &BuildArgs) -> Result<()> {
    let build = build_config(config, args);

    info!(
        repo_url = %build.repo_url,
        repo_dir = %build.repo_dir.display(),
        output_dir = %build.output_dir.display(),
        "building dashboard"
    );

    let reporter = CliProgress::new();
    let result = paperdash_core::build_dashboard(&build, &reporter).await?;

    println!();
    println!("  Dashboard built successfully!");
    println!("  Run:       {}", result.run_id);
    println!("  Papers:    {}", result.paper_count);
    println!("  Resources: {}", result.resource_count);
    println!("  Source:    {}", result.source_sha256);
    println!("  Data:      {}", result.data_path.display());
    if let Some(html) = &result.html_path {
        println!("  HTML:      {}", html.display());
    }
    println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn read_document(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).wrap_err_with(|| format!("failed to read {}", file.display()))
}

fn cmd_parse(file: &Path) -> Result<()> {
    let text = read_document(file)?;
    let parsed = paperdash_markdown::parse_readme(&text);
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

fn cmd_stats(config: &AppConfig, file: &Path) -> Result<()> {
    let text = read_document(file)?;
    let parsed = paperdash_markdown::parse_readme(&text);
    let taxonomy_file = config.analysis.taxonomy_file.as_ref().map(PathBuf::from);
    let taxonomies = paperdash_core::load_taxonomies(taxonomy_file.as_deref())?;
    let stats = paperdash_core::build_stats(&parsed, &taxonomies, &AnalysisOptions::from(config));
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn build_flags_override_config() {
        let cli = Cli::try_parse_from([
            "paperdash",
            "build",
            "--skip-sync",
            "--skip-citations",
            "--citations-top-k",
            "3",
            "--output-dir",
            "out",
            "--repo-url",
            "https://example.com/list.git",
        ])
        .unwrap();

        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };
        let build = build_config(&AppConfig::default(), &args);

        assert!(build.skip_sync);
        assert!(build.enrichment.skip_citations);
        assert!(!build.enrichment.skip_code_fetch);
        assert_eq!(build.enrichment.citations_top_k, 3);
        assert_eq!(build.enrichment.citations_limit, None);
        assert_eq!(build.output_dir, PathBuf::from("out"));
        assert_eq!(build.repo_url, "https://example.com/list.git");
        assert_eq!(build.repo_dir, PathBuf::from("data/papers_repo"));
        assert_eq!(build.template, PathBuf::from("templates/index.html"));
    }

    #[test]
    fn config_values_used_without_flags() {
        let mut config = AppConfig::default();
        config.output.output_dir = "public".into();
        config.enrichment.citations_limit = Some(25);

        let build = build_config(&config, &BuildArgs::default());
        assert_eq!(build.output_dir, PathBuf::from("public"));
        assert_eq!(build.enrichment.citations_limit, Some(25));
        assert!(!build.json_only);
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["paperdash", "stats", "README.md", "-vv", "--log-format", "json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
        assert!(matches!(cli.command, Command::Stats { .. }));
    }
}
