//! Classification, aggregation and build orchestration for paperdash.
//!
//! The analysis half is pure and synchronous: [`taxonomy`] labels papers,
//! [`analysis`] reduces them to histograms, [`insights`] turns the histograms
//! into sentences and [`stats`] assembles the bundle. [`pipeline`] wires in
//! the document source, the enrichment APIs and the output files.

pub mod analysis;
pub mod insights;
pub mod pipeline;
pub mod stats;
pub mod taxonomy;

pub use insights::derive_insights;
pub use pipeline::{
    BuildConfig, BuildResult, EnrichmentOptions, ProgressReporter, SilentProgress, build_dashboard,
    enrich, load_taxonomies,
};
pub use stats::build_stats;
pub use taxonomy::{MatchMode, RuleTable, Taxonomies};
