//! CLI command definitions, routing, and tracing setup.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::error;

use wortschatz_core::compose::{ComposeOptions, recompose_level};
use wortschatz_core::extract::{ExtractOptions, extract_level};
use wortschatz_core::translate::translate_level;
use wortschatz_core::ProgressReporter;
use wortschatz_scrape::DwdsClient;
use wortschatz_shared::{AppConfig, Level, init_config, load_config};
use wortschatz_store::{CheckpointManager, PipelineKind, RecordStore};
use wortschatz_translate::GoogleTranslator;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// wortschatz — build a multi-level German vocabulary dataset.
#[derive(Parser)]
#[command(
    name = "wortschatz",
    version,
    about = "Scrape, translate, and maintain a multi-level German vocabulary dataset.",
    long_about = None,
)]
pub(crate) struct Cli {
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
    /// Backfill missing English translations for extracted records.
    Translate {
        /// Level to process (A1..C2).
        #[arg(short, long, conflicts_with = "all_levels")]
        level: Option<Level>,

        /// Process every level in sequence.
        #[arg(long)]
        all_levels: bool,

        /// Character ceiling per batched translation request.
        #[arg(long)]
        batch_chars: Option<usize>,

        /// Discard the level's checkpoint and re-attempt fallback values.
        #[arg(long)]
        fresh: bool,
    },

    /// Scrape dictionary pages for a level's base word list.
    Extract {
        /// Level to process (A1..C2).
        #[arg(short, long, conflicts_with = "all_levels")]
        level: Option<Level>,

        /// Process every level in sequence.
        #[arg(long)]
        all_levels: bool,

        /// Worker (shard) count.
        #[arg(short, long)]
        workers: Option<usize>,

        /// Start index into the base word list (overrides the checkpoint).
        #[arg(long)]
        start_from: Option<usize>,

        /// Maximum number of words to attempt this run.
        #[arg(long)]
        max_words: Option<usize>,
    },

    /// Re-extract word decomposition without touching other fields.
    Recompose {
        /// Level to process (A1..C2).
        #[arg(short, long, conflicts_with = "all_levels")]
        level: Option<Level>,

        /// Process every level in sequence.
        #[arg(long)]
        all_levels: bool,

        /// Records fetched per round.
        #[arg(long)]
        batch_size: Option<usize>,

        /// Concurrent fetches within a round.
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
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
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Translate {
            level,
            all_levels,
            batch_chars,
            fresh,
        } => cmd_translate(select_levels(level, all_levels)?, batch_chars, fresh).await,
        Command::Extract {
            level,
            all_levels,
            workers,
            start_from,
            max_words,
        } => {
            cmd_extract(
                select_levels(level, all_levels)?,
                workers,
                start_from,
                max_words,
            )
            .await
        }
        Command::Recompose {
            level,
            all_levels,
            batch_size,
            workers,
        } => cmd_recompose(select_levels(level, all_levels)?, batch_size, workers).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Resolve the level selection flags into a concrete run list.
fn select_levels(level: Option<Level>, all_levels: bool) -> Result<Vec<Level>> {
    if all_levels {
        Ok(Level::ALL.to_vec())
    } else if let Some(level) = level {
        Ok(vec![level])
    } else {
        Err(eyre!("pass --level <A1..C2> or --all-levels"))
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_translate(
    levels: Vec<Level>,
    batch_chars: Option<usize>,
    fresh: bool,
) -> Result<()> {
    let config = load_config()?;
    let mut translation = config.translation.clone();
    if let Some(batch_chars) = batch_chars {
        translation.batch_chars = batch_chars;
    }

    let store = RecordStore::new(&config.defaults.data_dir);
    let checkpoints = CheckpointManager::new(&config.defaults.data_dir);
    let mut failures = 0;

    for level in levels {
        println!("Translating {level}");

        if fresh {
            checkpoints.clear(level, PipelineKind::Translate)?;
        }

        // One translator handle per pipeline invocation.
        let translator = GoogleTranslator::new(&translation)?;
        let progress = CliProgress::new();

        match translate_level(
            level,
            &store,
            &checkpoints,
            &translator,
            &translation,
            &progress,
        )
        .await
        {
            Ok(outcome) => {
                progress.finish();
                println!(
                    "{level}: {} of {} pending items applied across {} batches in {:.0?}{}",
                    outcome.items_applied,
                    outcome.pending,
                    outcome.batches,
                    outcome.elapsed,
                    if outcome.completed {
                        ""
                    } else {
                        " (fallback values remain; rerun with --fresh to retry)"
                    },
                );
            }
            Err(e) => {
                progress.finish();
                error!(level = %level, error = %e, "translation run failed");
                failures += 1;
            }
        }
    }

    finish_run(failures)
}

async fn cmd_extract(
    levels: Vec<Level>,
    workers: Option<usize>,
    start_from: Option<usize>,
    max_words: Option<usize>,
) -> Result<()> {
    let config = load_config()?;
    let store = RecordStore::new(&config.defaults.data_dir);
    let checkpoints = CheckpointManager::new(&config.defaults.data_dir);
    let base_dir = std::path::PathBuf::from(&config.defaults.base_dir);

    let options = ExtractOptions {
        workers: workers.unwrap_or(config.scrape.workers as usize),
        start_from,
        max_words,
        rate_limit: Duration::from_millis(config.scrape.rate_limit_ms),
    };

    let mut failures = 0;
    for level in levels {
        println!("Extracting {level}");

        let fetcher = Arc::new(DwdsClient::new(&config.scrape)?);
        let progress = CliProgress::new();

        match extract_level(
            level,
            &base_dir,
            &store,
            &checkpoints,
            fetcher,
            &options,
            &progress,
        )
        .await
        {
            Ok(outcome) => {
                progress.finish();
                println!(
                    "{level}: {} extracted, {} failed of {} attempted ({} base words) in {:.0?}",
                    outcome.extracted,
                    outcome.failed,
                    outcome.attempted,
                    outcome.total_words,
                    outcome.elapsed,
                );
            }
            Err(e) => {
                progress.finish();
                error!(level = %level, error = %e, "extraction run failed");
                failures += 1;
            }
        }
    }

    finish_run(failures)
}

async fn cmd_recompose(
    levels: Vec<Level>,
    batch_size: Option<usize>,
    workers: Option<usize>,
) -> Result<()> {
    let config = load_config()?;
    let store = RecordStore::new(&config.defaults.data_dir);
    let checkpoints = CheckpointManager::new(&config.defaults.data_dir);

    let options = ComposeOptions {
        batch_size: batch_size.unwrap_or(config.scrape.recompose_batch_size),
        workers: workers.unwrap_or(config.scrape.recompose_workers as usize),
        rate_limit: Duration::from_millis(config.scrape.rate_limit_ms),
    };

    let mut failures = 0;
    for level in levels {
        println!("Recomposing {level}");

        let fetcher = Arc::new(DwdsClient::new(&config.scrape)?);
        let progress = CliProgress::new();

        match recompose_level(level, &store, &checkpoints, fetcher, &options, &progress).await {
            Ok(outcome) => {
                progress.finish();
                println!(
                    "{level}: {} of {} records updated in {:.0?}",
                    outcome.updated, outcome.records, outcome.elapsed,
                );
            }
            Err(e) => {
                progress.finish();
                error!(level = %level, error = %e, "recompose run failed");
                failures += 1;
            }
        }
    }

    finish_run(failures)
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("wrote {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// One level's failure must not abort the batch of levels, but the process
/// still exits nonzero if anything failed.
fn finish_run(failures: usize) -> Result<()> {
    if failures == 0 {
        Ok(())
    } else {
        Err(eyre!("{failures} level run(s) failed"))
    }
}

// ---------------------------------------------------------------------------
// Progress bar
// ---------------------------------------------------------------------------

/// Indicatif-backed progress reporter.
struct CliProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn finish(&self) {
        if let Some(bar) = self.bar.lock().expect("progress lock").take() {
            bar.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.finish();
        println!("==> {name}");
    }

    fn item_done(&self, current: usize, total: usize, detail: &str) {
        let mut guard = self.bar.lock().expect("progress lock");
        let bar = guard.get_or_insert_with(|| {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::with_template("  [{bar:40}] {pos}/{len} {msg}")
                    .expect("valid template")
                    .progress_chars("=> "),
            );
            bar
        });
        bar.set_length(total as u64);
        bar.set_position(current as u64);
        bar.set_message(detail.to_string());
    }
}
