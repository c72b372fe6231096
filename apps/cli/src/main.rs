//! paperdash CLI: curated paper list in, statistics dashboard out.
//!
//! Parses a heading-delimited markdown list of papers, classifies and
//! aggregates it, optionally enriches it with GitHub and OpenAlex data, and
//! writes `data.json` plus a static HTML dashboard.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
