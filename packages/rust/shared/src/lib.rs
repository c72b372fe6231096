//! Shared types, error model, and configuration for paperdash.
//!
//! This crate is the foundation depended on by all other paperdash crates.
//! It provides:
//! - [`PaperDashError`]: the unified error type
//! - Domain types ([`PaperEntry`], [`ResourceLink`], [`ParseResult`], [`StatsBundle`])
//! - Configuration ([`AppConfig`], [`AnalysisOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AnalysisConfig, AnalysisOptions, AppConfig, EnrichmentConfig, OutputConfig, SourceConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from,
    resolve_github_token, resolve_openalex_email,
};
pub use error::{PaperDashError, Result};
pub use types::{
    CategoryCount, CitedPaper, CodeAvailability, EnrichmentStats, LabelCount, LanguageBytes,
    PaperEntry, ParseResult, RepoMetadata, RepoSummary, ResourceLink, StatsBundle, TopicCount,
    VenueCount, YearCount,
};
