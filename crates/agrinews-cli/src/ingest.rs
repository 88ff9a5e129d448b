//! Ingestion command handlers for the CLI.
//!
//! Per-source failures are part of the printed summary, not errors; the
//! command only fails when the store is unreachable at the start.

use agrinews_ingest::{select_sources, CycleReport, Pipeline, SourceOutcome, Trigger};
use clap::Subcommand;

use crate::{fmt_time, truncate};

/// Sub-commands available under `ingest`.
#[derive(Debug, Subcommand)]
pub enum IngestCommands {
    /// Fetch, summarize and store the newest article from every enabled source
    Run {
        /// Restrict the cycle to one source (by slug)
        #[arg(long)]
        source: Option<String>,

        /// Fetch and summarize but write nothing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Show recent runs
    Status {
        /// Maximum number of runs to show
        #[arg(long, default_value = "10")]
        limit: u32,
    },
}

/// Run one ingestion cycle and print the per-source summary.
///
/// # Errors
///
/// Returns an error if the sources file cannot be loaded, the source filter
/// does not name an enabled source, `GOOGLE_API_KEY` is unset, or the store
/// is unreachable.
pub(crate) async fn run_ingest(
    pool: &sqlx::PgPool,
    config: &agrinews_core::AppConfig,
    source_filter: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let file = agrinews_core::load_sources(&config.sources_path)?;
    let sources = select_sources(&file, source_filter)?;
    if sources.is_empty() {
        println!("no enabled sources in {}", config.sources_path.display());
        return Ok(());
    }

    let pipeline = Pipeline::from_config(config)?;
    tracing::info!(sources = sources.len(), dry_run, "cli: starting ingest");
    let outcome = pipeline.ingest(pool, &sources, dry_run, Trigger::Cli).await?;

    print_report(&outcome.report);
    match (outcome.run, outcome.bookkeeping_error) {
        (Some(run), _) => println!("recorded as run {}", run.id),
        (None, Some(reason)) => println!("warning: run was not recorded: {reason}"),
        (None, None) => println!("dry-run: nothing was written"),
    }
    Ok(())
}

fn print_report(report: &CycleReport) {
    println!("{:<28}{:<19}DETAIL", "SOURCE", "STATUS");
    for outcome in &report.outcomes {
        let detail = match outcome {
            SourceOutcome::Failed(failure) => {
                format!("{} at {}: {}", failure.kind, failure.stage, failure.message)
            }
            other => other.title().map(|t| truncate(t, 60)).unwrap_or_default(),
        };
        println!("{:<28}{:<19}{}", outcome.source(), outcome.status(), detail);
    }
    println!(
        "inserted {}, skipped {} duplicates, {} dry-run, {} failed",
        report.inserted, report.skipped_duplicate, report.dry_run, report.failed
    );
}

/// Prints the most recent runs of every kind.
pub(crate) async fn run_ingest_status(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = agrinews_db::list_runs(pool, limit).await?;
    if runs.is_empty() {
        println!("no runs recorded yet; try `ingest run`");
        return Ok(());
    }

    println!(
        "{:<7}{:<19}{:<19}{:<11}{:<5}{:<5}{:<5}{:<5}ERROR",
        "ID", "FINISHED", "KIND", "TRIGGER", "OK", "NEW", "DUP", "FAIL"
    );
    for run in &runs {
        println!(
            "{:<7}{:<19}{:<19}{:<11}{:<5}{:<5}{:<5}{:<5}{}",
            run.id,
            fmt_time(run.finished_at),
            run.kind,
            run.triggered_by,
            if run.succeeded { "yes" } else { "no" },
            run.inserted,
            run.skipped_duplicate,
            run.failed,
            run.error_message.as_deref().map(|e| truncate(e, 60)).unwrap_or_default()
        );
    }
    Ok(())
}
