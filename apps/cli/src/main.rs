//! wortschatz CLI — multi-level German vocabulary dataset builder.
//!
//! Scrapes dictionary pages, backfills translations in resumable batches,
//! and refreshes word decomposition, one proficiency level at a time.

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
