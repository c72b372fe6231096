//! Keyword taxonomies applied to paper titles and venues.
//!
//! A taxonomy is declarative data: a [`RuleTableDef`] lists labels with
//! pattern fragments, whether the table is multi-label or first-match, which
//! field it reads, and an optional fallback label. Definitions are deserialized from
//! TOML (the built-in set is embedded from `taxonomy.toml`) and compiled once
//! into immutable [`RuleTable`]s.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use paperdash_shared::{PaperDashError, PaperEntry, Result};

/// Built-in rule set.
pub const BUILTIN_TAXONOMY: &str = include_str!("../taxonomy.toml");

// ---------------------------------------------------------------------------
// Rule definitions
// ---------------------------------------------------------------------------

/// How a table turns matches into labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Every matching rule contributes its label.
    MultiLabel,
    /// Rules are tried in declaration order; the first match is the only label.
    FirstMatch,
}

/// Which part of a record a table reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Venue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    pub label: String,
    /// Case-insensitive regex fragments; any one matching is enough.
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTableDef {
    pub mode: MatchMode,
    pub field: Field,
    /// Label used when no rule matches. `None` means "no label".
    #[serde(default)]
    pub fallback: Option<String>,
    pub rules: Vec<RuleDef>,
}

/// The four taxonomies as they appear in a rule file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyDef {
    pub method: RuleTableDef,
    pub domain: RuleTableDef,
    pub venue_stratum: RuleTableDef,
    pub dataset: RuleTableDef,
}

// ---------------------------------------------------------------------------
// Compiled tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CompiledRule {
    label: String,
    regex: Regex,
}

/// A compiled, immutable rule table.
#[derive(Debug, Clone)]
pub struct RuleTable {
    name: String,
    mode: MatchMode,
    field: Field,
    fallback: Option<String>,
    rules: Vec<CompiledRule>,
}

impl RuleTable {
    /// Compile a table definition. Fails on an empty pattern list or an invalid regex.
    pub fn compile(name: &str, def: &RuleTableDef) -> Result<Self> {
        let rules = def
            .rules
            .iter()
            .map(|rule| {
                if rule.patterns.is_empty() {
                    return Err(PaperDashError::config(format!(
                        "taxonomy '{name}': rule '{}' has no patterns",
                        rule.label
                    )));
                }
                let alternation = rule
                    .patterns
                    .iter()
                    .map(|p| format!("(?:{p})"))
                    .collect::<Vec<_>>()
                    .join("|");
                let regex = Regex::new(&format!("(?i){alternation}")).map_err(|e| {
                    PaperDashError::config(format!(
                        "taxonomy '{name}': invalid pattern in rule '{}': {e}",
                        rule.label
                    ))
                })?;
                Ok(CompiledRule {
                    label: rule.label.clone(),
                    regex,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            mode: def.mode,
            field: def.field,
            fallback: def.fallback.clone(),
            rules,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    /// Rule labels in declaration order, followed by the fallback if any.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .map(|r| r.label.as_str())
            .chain(self.fallback.as_deref())
    }

    /// Labels for a piece of text.
    ///
    /// Multi-label tables return every matching label in declaration order;
    /// first-match tables return at most one. Either falls back to the
    /// fallback label (if configured) when nothing matches.
    pub fn classify_text(&self, text: &str) -> Vec<&str> {
        let mut labels: Vec<&str> = match self.mode {
            MatchMode::MultiLabel => self
                .rules
                .iter()
                .filter(|r| r.regex.is_match(text))
                .map(|r| r.label.as_str())
                .collect(),
            MatchMode::FirstMatch => self
                .rules
                .iter()
                .find(|r| r.regex.is_match(text))
                .map(|r| r.label.as_str())
                .into_iter()
                .collect(),
        };

        if labels.is_empty() {
            labels.extend(self.fallback.as_deref());
        }
        labels
    }

    /// Labels for a paper, reading the table's configured field.
    pub fn classify(&self, paper: &PaperEntry) -> Vec<&str> {
        let text = match self.field {
            Field::Title => paper.title.as_str(),
            Field::Venue => paper.venue.as_str(),
        };
        self.classify_text(text)
    }
}

/// The four compiled taxonomies.
#[derive(Debug, Clone)]
pub struct Taxonomies {
    pub method: RuleTable,
    pub domain: RuleTable,
    pub venue_stratum: RuleTable,
    pub dataset: RuleTable,
}

impl Taxonomies {
    /// Compile the embedded default rules.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_TAXONOMY)
    }

    /// Parse and compile a rule file's contents.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let def: TaxonomyDef = toml::from_str(content)
            .map_err(|e| PaperDashError::config(format!("failed to parse taxonomy: {e}")))?;
        Self::compile(&def)
    }

    /// Load an operator-edited rule file from disk.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PaperDashError::io(path, e))?;
        let taxonomies = Self::from_toml_str(&content)?;
        debug!("loaded taxonomy overrides");
        Ok(taxonomies)
    }

    pub fn compile(def: &TaxonomyDef) -> Result<Self> {
        let taxonomies = Self {
            method: RuleTable::compile("method", &def.method)?,
            domain: RuleTable::compile("domain", &def.domain)?,
            venue_stratum: RuleTable::compile("venue_stratum", &def.venue_stratum)?,
            dataset: RuleTable::compile("dataset", &def.dataset)?,
        };
        debug!(
            method_rules = taxonomies.method.rules.len(),
            domain_rules = taxonomies.domain.rules.len(),
            stratum_rules = taxonomies.venue_stratum.rules.len(),
            dataset_rules = taxonomies.dataset.rules.len(),
            "compiled taxonomies"
        );
        Ok(taxonomies)
    }
}
