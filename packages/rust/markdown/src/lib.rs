//! Markdown paper-list parser.
//!
//! Converts a curated, heading-delimited markdown list of papers into typed
//! [`PaperEntry`] and [`ResourceLink`] records.
//!
//! # Input dialect
//!
//! - `## Name` starts a top-level section (the record's `category`).
//! - `### Name` starts a sub-section (the record's `subcategory`) inside the
//!   current section; every `## ` heading clears it.
//! - A trailing `[[Back ...]]` navigation suffix on a heading is ignored.
//! - Tables use `|` as the column delimiter. The first two lines of a table
//!   are header and separator; each following row needs at least five cells:
//!   year, title, venue, paper link, code link. Cells are single-line.
//! - A table ends at the next heading, the next non-table line, or end of input.
//! - `**bold**` in a title cell is unwrapped and square brackets are dropped;
//!   links come from the paper/code cells, never from the title.
//! - In the resource-only sections ([`RESOURCE_ONLY_SECTIONS`]) a line that
//!   starts with `[text](http...)` becomes a [`ResourceLink`].
//!
//! Parsing is lenient: short rows are skipped, non-numeric years become
//! `None`, cells without a link give `None`. Nothing here returns an error.

mod cells;
mod parser;

use tracing::{info, instrument};

use paperdash_shared::ParseResult;

pub use cells::{clean_title, extract_link};
pub use parser::{DocumentParser, Line, ParserState, RESOURCE_ONLY_SECTIONS, Transition};

// Re-exported so callers can name record types through this crate alone.
pub use paperdash_shared::{PaperEntry, ResourceLink};

/// Parse a whole document into papers and resources, in document order.
#[instrument(skip_all, fields(bytes = text.len()))]
pub fn parse_readme(text: &str) -> ParseResult {
    let mut parser = DocumentParser::new();
    for line in text.lines() {
        parser.feed_line(line);
    }
    let (papers, resources) = parser.finish();

    info!(
        papers = papers.len(),
        resources = resources.len(),
        "parsed paper list"
    );

    ParseResult { papers, resources }
}
