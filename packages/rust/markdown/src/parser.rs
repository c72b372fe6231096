//! Line-driven state machine over the curated paper list.
//!
//! The parser keeps three pieces of state: the current section context
//! ([`ParserState`]), a buffer of pending table lines, and the records
//! produced so far. Transitions are computed by [`ParserState::next`], a pure
//! function of the current state and a classified [`Line`]; the
//! [`DocumentParser`] driver applies the returned [`Transition`].

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use paperdash_shared::{PaperEntry, ResourceLink};

use crate::cells::{clean_title, extract_link, split_row};

/// Top-level sections whose content is bare links rather than a paper table.
pub const RESOURCE_ONLY_SECTIONS: &[&str] =
    &["Toolbox", "Dataset", "Survey Paper", "Other Resource"];

/// Minimum cells per row: year, title, venue, paper link, code link.
const MIN_ROW_CELLS: usize = 5;

/// Header + separator lines at the top of every table.
const TABLE_PREAMBLE_LINES: usize = 2;

/// Trailing `[[Back to top]](#...)` navigation suffix on heading lines.
static BACK_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\[\[Back.*").expect("back link regex")
});

/// A line that is nothing but `[text](http...)` (anchored at the start).
static RESOURCE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^\]]+)\]\((https?://[^)]+)\)").expect("resource link regex")
});

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

/// A trimmed source line, classified by its leading markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// `## Name`, with any back-link suffix removed.
    Section(String),
    /// `### Name`, with any back-link suffix removed.
    Subsection(String),
    /// Any line starting with the `|` column delimiter.
    TableRow(&'a str),
    /// Everything else, including blank lines.
    Text(&'a str),
}

impl<'a> Line<'a> {
    pub fn classify(raw: &'a str) -> Self {
        let line = raw.trim();
        if line.starts_with("## ") {
            Line::Section(heading_text(line))
        } else if line.starts_with("### ") {
            Line::Subsection(heading_text(line))
        } else if line.starts_with('|') {
            Line::TableRow(line)
        } else {
            Line::Text(line)
        }
    }
}

fn heading_text(line: &str) -> String {
    let text = line.trim_start_matches('#').trim();
    BACK_LINK_RE.replace(text, "").trim().to_string()
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Section context while walking the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParserState {
    /// Before the first `## ` heading; table rows here produce no records.
    #[default]
    NoSection,
    InSection {
        category: String,
    },
    InSubsection {
        category: String,
        subcategory: String,
    },
}

/// What the driver must do for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<'a> {
    /// State after this line.
    pub state: ParserState,
    /// Flush the pending table using the state *before* this line.
    pub flush: bool,
    /// Append this line to the pending table.
    pub row: Option<&'a str>,
    /// Emit a bare resource link.
    pub resource: Option<ResourceLink>,
}

impl ParserState {
    pub fn category(&self) -> Option<&str> {
        match self {
            ParserState::NoSection => None,
            ParserState::InSection { category } | ParserState::InSubsection { category, .. } => {
                Some(category.as_str())
            }
        }
    }

    pub fn subcategory(&self) -> Option<&str> {
        match self {
            ParserState::InSubsection { subcategory, .. } => Some(subcategory.as_str()),
            _ => None,
        }
    }

    fn in_resource_section(&self) -> bool {
        self.category()
            .is_some_and(|c| RESOURCE_ONLY_SECTIONS.contains(&c))
    }

    /// Compute the transition for `line` without mutating anything.
    ///
    /// - `## ` flushes the pending table and enters a new section, clearing
    ///   the sub-section.
    /// - `### ` flushes and sets the sub-section within the current section.
    /// - `|` rows are buffered, even inside resource-only sections.
    /// - Any other line ends the pending table; in a resource-only section a
    ///   leading `[text](url)` also yields a [`ResourceLink`].
    pub fn next<'a>(&self, line: &Line<'a>) -> Transition<'a> {
        match line {
            Line::Section(name) => Transition {
                state: if name.is_empty() {
                    ParserState::NoSection
                } else {
                    ParserState::InSection {
                        category: name.clone(),
                    }
                },
                flush: true,
                row: None,
                resource: None,
            },
            Line::Subsection(name) => {
                let state = match (self.category(), name.is_empty()) {
                    (None, _) => ParserState::NoSection,
                    (Some(category), true) => ParserState::InSection {
                        category: category.to_string(),
                    },
                    (Some(category), false) => ParserState::InSubsection {
                        category: category.to_string(),
                        subcategory: name.clone(),
                    },
                };
                Transition {
                    state,
                    flush: true,
                    row: None,
                    resource: None,
                }
            }
            Line::TableRow(row) => Transition {
                state: self.clone(),
                flush: false,
                row: Some(*row),
                resource: None,
            },
            Line::Text(text) => {
                let resource = if self.in_resource_section() {
                    self.resource_link(text)
                } else {
                    None
                };
                Transition {
                    state: self.clone(),
                    flush: true,
                    row: None,
                    resource,
                }
            }
        }
    }

    fn resource_link(&self, text: &str) -> Option<ResourceLink> {
        let category = self.category()?;
        let caps = RESOURCE_LINK_RE.captures(text)?;
        Some(ResourceLink {
            title: caps[1].trim().to_string(),
            url: caps[2].trim().to_string(),
            category: category.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Accumulates records while lines are fed in document order.
#[derive(Debug, Default)]
pub struct DocumentParser {
    state: ParserState,
    table: Vec<String>,
    papers: Vec<PaperEntry>,
    resources: Vec<ResourceLink>,
}

impl DocumentParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current section context.
    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Process one raw source line.
    pub fn feed_line(&mut self, raw: &str) {
        let line = Line::classify(raw);
        let transition = self.state.next(&line);

        if transition.flush {
            self.flush_table();
        }
        if let Some(row) = transition.row {
            self.table.push(row.to_string());
        }
        if let Some(resource) = transition.resource {
            trace!(title = %resource.title, category = %resource.category, "resource link");
            self.resources.push(resource);
        }
        self.state = transition.state;
    }

    /// Flush any trailing table and return everything collected.
    pub fn finish(mut self) -> (Vec<PaperEntry>, Vec<ResourceLink>) {
        self.flush_table();
        (self.papers, self.resources)
    }

    fn flush_table(&mut self) {
        if self.table.is_empty() {
            return;
        }
        let lines = std::mem::take(&mut self.table);
        let Some(category) = self.state.category() else {
            debug!(lines = lines.len(), "dropping table outside any section");
            return;
        };

        let entries = parse_table(&lines, category, self.state.subcategory());
        debug!(
            category,
            subcategory = self.state.subcategory(),
            rows = lines.len().saturating_sub(TABLE_PREAMBLE_LINES),
            records = entries.len(),
            "flushed table"
        );
        self.papers.extend(entries);
    }
}

/// Turn a buffered table (header, separator, rows) into paper records.
///
/// Tables shorter than the header + separator produce nothing. Rows with fewer
/// than five cells or an empty title are skipped; a non-integer year becomes
/// `None`.
fn parse_table(lines: &[String], category: &str, subcategory: Option<&str>) -> Vec<PaperEntry> {
    if lines.len() < TABLE_PREAMBLE_LINES {
        return Vec::new();
    }

    lines[TABLE_PREAMBLE_LINES..]
        .iter()
        .filter_map(|row| {
            let cells = split_row(row);
            if cells.len() < MIN_ROW_CELLS {
                debug!(row = %row, cells = cells.len(), "skipping short row");
                return None;
            }
            let title = clean_title(cells[1]);
            if title.is_empty() {
                debug!(row = %row, "skipping row with empty title");
                return None;
            }
            Some(PaperEntry {
                year: cells[0].parse().ok(),
                title,
                venue: cells[2].to_string(),
                paper_url: extract_link(cells[3]),
                code_url: extract_link(cells[4]),
                category: category.to_string(),
                subcategory: subcategory.map(str::to_string),
            })
        })
        .collect()
}
