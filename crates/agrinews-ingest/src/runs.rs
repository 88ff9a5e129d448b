//! Run records around cycles and jobs.
//!
//! Work happens first; the run is recorded afterwards in one write. Failing
//! to record a run is logged and never turns finished work into an error.

use agrinews_core::{CareLog, DemandForecast, SourceConfig};
use agrinews_db::{DemandRow, NewRun, NewRunSource, RunRow, WeeklySuggestionRow};
use agrinews_summarizer::TextGenerator;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::cycle::{run_ingestion_cycle, CycleOptions};
use crate::error::IngestError;
use crate::jobs::{produce_demand_forecast, produce_weekly_suggestion};
use crate::report::{CycleReport, SourceOutcome};
use crate::seams::ArticleSource;

/// What started a run. Stored in `pipeline_runs.triggered_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Cli,
    Api,
    Scheduler,
}

impl Trigger {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Cli => "cli",
            Trigger::Api => "api",
            Trigger::Scheduler => "scheduler",
        }
    }
}

/// Result of one triggered ingestion. The report is always complete.
#[derive(Debug)]
pub struct IngestRun {
    /// `None` for dry runs, and when the run could not be recorded.
    pub run: Option<RunRow>,
    pub report: CycleReport,
    /// Why the run could not be recorded, if it wasn't.
    pub bookkeeping_error: Option<String>,
}

/// Pings the store, runs one ingestion cycle, then records the run.
///
/// # Errors
///
/// Only [`IngestError::StoreUnavailable`], when the store does not answer
/// the ping; no source is contacted then. Per-source failures are in the
/// report, and a failed run write is reported in
/// [`IngestRun::bookkeeping_error`].
pub async fn run_ingest<A, G>(
    pool: &PgPool,
    sources: &[SourceConfig],
    adapter: &A,
    generator: &G,
    options: &CycleOptions,
    trigger: Trigger,
) -> Result<IngestRun, IngestError>
where
    A: ArticleSource + ?Sized,
    G: TextGenerator + ?Sized,
{
    agrinews_db::health_check(pool)
        .await
        .map_err(IngestError::StoreUnavailable)?;

    let started_at = Utc::now();
    tracing::info!(
        trigger = trigger.as_str(),
        sources = sources.len(),
        dry_run = options.dry_run,
        "ingest: cycle started"
    );
    let report = run_ingestion_cycle(sources, adapter, generator, pool, options).await;

    if options.dry_run {
        return Ok(IngestRun {
            run: None,
            report,
            bookkeeping_error: None,
        });
    }

    let recorded = agrinews_db::record_run(pool, &ingest_record(&report, trigger, started_at)).await;
    match recorded {
        Ok(run) => {
            tracing::info!(run_id = run.id, "ingest: run recorded");
            Ok(IngestRun {
                run: Some(run),
                report,
                bookkeeping_error: None,
            })
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                inserted = report.inserted,
                failed = report.failed,
                "ingest: cycle finished but its run could not be recorded"
            );
            Ok(IngestRun {
                run: None,
                report,
                bookkeeping_error: Some(e.to_string()),
            })
        }
    }
}

fn ingest_record(report: &CycleReport, trigger: Trigger, started_at: DateTime<Utc>) -> NewRun<'_> {
    let sources = report
        .outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            SourceOutcome::Inserted { source, title, .. } => Some(NewRunSource {
                source_slug: source.as_str(),
                outcome: outcome.status(),
                title: Some(title.as_str()),
                failure_stage: None,
                failure_kind: None,
                message: None,
            }),
            SourceOutcome::SkippedDuplicate { source, title } => Some(NewRunSource {
                source_slug: source.as_str(),
                outcome: outcome.status(),
                title: Some(title.as_str()),
                failure_stage: None,
                failure_kind: None,
                message: None,
            }),
            SourceOutcome::Failed(failure) => Some(NewRunSource {
                source_slug: failure.source.as_str(),
                outcome: outcome.status(),
                title: None,
                failure_stage: Some(failure.stage.as_str()),
                failure_kind: Some(failure.kind.as_str()),
                message: Some(failure.message.as_str()),
            }),
            SourceOutcome::DryRun { .. } => None,
        })
        .collect();

    NewRun {
        kind: "ingest",
        triggered_by: trigger.as_str(),
        started_at,
        succeeded: report.failed == 0,
        inserted: as_count(report.inserted),
        skipped_duplicate: as_count(report.skipped_duplicate),
        failed: as_count(report.failed),
        error_message: None,
        sources,
    }
}

fn as_count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Loads the newest care logs and stores a weekly suggestion, then records
/// the run.
///
/// # Errors
///
/// Any [`IngestError`] from loading, generation or storage. The failed run
/// is recorded before the error is returned.
pub async fn run_weekly_suggestion<G>(
    pool: &PgPool,
    generator: &G,
    limit: usize,
    trigger: Trigger,
) -> Result<WeeklySuggestionRow, IngestError>
where
    G: TextGenerator + ?Sized,
{
    let started_at = Utc::now();
    let result = weekly_from_store(pool, generator, limit).await;
    record_job(pool, "weekly_suggestion", trigger, started_at, result.as_ref().err()).await;
    result
}

/// Loads the newest articles and stores a demand forecast, then records the
/// run.
///
/// # Errors
///
/// Any [`IngestError`] from loading, generation, parsing or storage. The
/// failed run is recorded before the error is returned.
pub async fn run_demand_forecast<G>(
    pool: &PgPool,
    generator: &G,
    limit: usize,
    trigger: Trigger,
) -> Result<(DemandRow, DemandForecast), IngestError>
where
    G: TextGenerator + ?Sized,
{
    let started_at = Utc::now();
    let result = demand_from_store(pool, generator, limit).await;
    record_job(pool, "demand_forecast", trigger, started_at, result.as_ref().err()).await;
    result
}

async fn weekly_from_store<G>(
    pool: &PgPool,
    generator: &G,
    limit: usize,
) -> Result<WeeklySuggestionRow, IngestError>
where
    G: TextGenerator + ?Sized,
{
    let rows = agrinews_db::list_recent_plant_logs(pool, as_sql_limit(limit)).await?;
    let logs: Vec<CareLog> = rows.into_iter().map(CareLog::from).collect();
    produce_weekly_suggestion(generator, pool, logs, limit).await
}

async fn demand_from_store<G>(
    pool: &PgPool,
    generator: &G,
    limit: usize,
) -> Result<(DemandRow, DemandForecast), IngestError>
where
    G: TextGenerator + ?Sized,
{
    let articles = agrinews_db::list_news(pool, as_sql_limit(limit)).await?;
    produce_demand_forecast(generator, pool, articles, limit).await
}

fn as_sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

async fn record_job(
    pool: &PgPool,
    kind: &'static str,
    trigger: Trigger,
    started_at: DateTime<Utc>,
    error: Option<&IngestError>,
) {
    let message = error.map(ToString::to_string);
    let run = NewRun {
        kind,
        triggered_by: trigger.as_str(),
        started_at,
        succeeded: error.is_none(),
        inserted: i32::from(error.is_none()),
        skipped_duplicate: 0,
        failed: i32::from(error.is_some()),
        error_message: message.as_deref(),
        sources: Vec::new(),
    };

    if let Err(e) = agrinews_db::record_run(pool, &run).await {
        tracing::error!(kind, error = %e, "failed to record {kind} run");
    }
}
