//! Output files for a dashboard build.
//!
//! A build writes two files into the output directory:
//!
//! ```text
//! <output_dir>/
//! ├── data.json    (the full DashboardContext, pretty-printed)
//! └── index.html   (the template with the JSON inlined)
//! ```
//!
//! Templates are Handlebars documents. The data is exposed as three
//! pre-serialized JSON strings, `papers_json`, `stats_json` and
//! `resources_json`, which templates insert with a triple-stash
//! (`{{{stats_json}}}`) so the JSON is not HTML-escaped. Files are written to
//! a temp file and renamed into place.

mod context;

use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use paperdash_shared::{PaperDashError, Result};

pub use context::{DashboardContext, PaperView};

/// Template used when the configured template file does not exist.
pub const BUILTIN_TEMPLATE: &str = include_str!("../../../../templates/index.html");

pub const DATA_FILE: &str = "data.json";
pub const HTML_FILE: &str = "index.html";

const TEMPLATE_FIELDS: [&str; 3] = ["papers_json", "stats_json", "resources_json"];

/// Write `content` to `dir/filename` through a temp file and a rename.
fn write_artifact(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| PaperDashError::io(dir, e))?;

    let target = dir.join(filename);
    let temp = dir.join(format!(".{filename}.tmp"));

    std::fs::write(&temp, content).map_err(|e| PaperDashError::io(&temp, e))?;
    std::fs::rename(&temp, &target).map_err(|e| PaperDashError::io(&target, e))?;

    debug!(file = %filename, size = content.len(), "wrote artifact");
    Ok(target)
}

/// Write `<dir>/data.json`, creating `dir` if needed.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn write_data_json(dir: &Path, ctx: &DashboardContext) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(ctx)
        .map_err(|e| PaperDashError::Render(format!("failed to serialize dashboard data: {e}")))?;
    let path = write_artifact(dir, DATA_FILE, &json)?;

    info!(path = %path.display(), papers = ctx.papers.len(), "wrote dashboard data");
    Ok(path)
}

/// JSON that can sit inside an inline `<script>` element.
fn script_json<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)
        .map_err(|e| PaperDashError::Render(format!("failed to serialize template data: {e}")))?;
    Ok(json.replace("</", "<\\/"))
}

/// Render `template` against the dashboard data.
///
/// Unknown variables render as empty strings. A double-stash
/// `{{stats_json}}` HTML-escapes the JSON, so templates use triple-stash.
pub fn render_html(template: &str, ctx: &DashboardContext) -> Result<String> {
    if !TEMPLATE_FIELDS.iter().any(|field| template.contains(field)) {
        warn!("template references none of the dashboard data fields");
    }

    let data = json!({
        "papers_json": script_json(&ctx.papers)?,
        "stats_json": script_json(&ctx.stats)?,
        "resources_json": script_json(&ctx.resources)?,
        "generated_at": ctx.generated_at.to_rfc3339(),
        "run_id": ctx.run_id.to_string(),
    });

    let mut registry = Handlebars::new();
    registry.set_strict_mode(false);
    registry
        .render_template(template, &data)
        .map_err(|e| PaperDashError::Render(format!("failed to render template: {e}")))
}

/// Render `<dir>/index.html` from the template at `template`.
///
/// Falls back to [`BUILTIN_TEMPLATE`] when that file does not exist.
#[instrument(skip_all, fields(template = %template.display(), dir = %dir.display()))]
pub fn render_dashboard(template: &Path, dir: &Path, ctx: &DashboardContext) -> Result<PathBuf> {
    let source = if template.exists() {
        std::fs::read_to_string(template).map_err(|e| PaperDashError::io(template, e))?
    } else {
        warn!("template not found, using built-in template");
        BUILTIN_TEMPLATE.to_string()
    };

    let html = render_html(&source, ctx)?;
    let path = write_artifact(dir, HTML_FILE, &html)?;

    info!(path = %path.display(), "wrote dashboard");
    Ok(path)
}
