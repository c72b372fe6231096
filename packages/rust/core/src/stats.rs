//! Assemble the full stats bundle for a parsed document.

use tracing::{debug, instrument};

use paperdash_shared::{AnalysisOptions, ParseResult, StatsBundle};

use crate::analysis;
use crate::insights::derive_insights;
use crate::taxonomy::Taxonomies;

/// Run every reducer and the insight generator over `parsed`.
///
/// The enrichment fields are left at their defaults; the pipeline merges
/// them in afterwards without touching the core aggregates.
#[instrument(skip_all, fields(papers = parsed.papers.len()))]
pub fn build_stats(
    parsed: &ParseResult,
    taxonomies: &Taxonomies,
    opts: &AnalysisOptions,
) -> StatsBundle {
    let papers = &parsed.papers;

    let mut stats = StatsBundle {
        paper_count: papers.len(),
        resource_count: parsed.resources.len(),
        year_counts: analysis::counts_by_year(papers),
        category_counts: analysis::counts_by_category(papers),
        venue_counts: analysis::counts_by_venue(papers, opts.venue_top_k),
        topics: analysis::word_frequencies(papers, opts.topic_top_k),
        code_availability: analysis::code_availability(papers),
        method_counts: analysis::taxonomy_counts(papers, &taxonomies.method),
        domain_counts: analysis::taxonomy_counts(papers, &taxonomies.domain),
        venue_strata: analysis::taxonomy_counts(papers, &taxonomies.venue_stratum),
        dataset_counts: analysis::dataset_counts(papers, &taxonomies.dataset, opts.dataset_top_k),
        ..Default::default()
    };
    stats.insights = derive_insights(&stats);

    debug!(
        years = stats.year_counts.len(),
        categories = stats.category_counts.len(),
        insights = stats.insights.len(),
        "built stats bundle"
    );
    stats
}
