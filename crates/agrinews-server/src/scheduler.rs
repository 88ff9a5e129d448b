//! Background job scheduler.
//!
//! Registers the recurring ingestion cycle and the weekly suggestion job.
//! Both go through the same [`Pipeline`] the HTTP triggers use.

use std::sync::Arc;

use agrinews_core::{AppConfig, SourcesFile};
use agrinews_ingest::{select_sources, Pipeline, Trigger};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Without a pipeline (no API key) the
/// scheduler starts empty.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, a
/// cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: &AppConfig,
    sources: Arc<SourcesFile>,
    pipeline: Option<Arc<Pipeline>>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    if let Some(pipeline) = pipeline {
        register_ingest_job(
            &scheduler,
            &config.ingest_cron,
            pool.clone(),
            sources,
            Arc::clone(&pipeline),
        )
        .await?;
        register_weekly_job(&scheduler, &config.weekly_cron, pool, pipeline).await?;
    } else {
        tracing::warn!("scheduler: GOOGLE_API_KEY is not set; no jobs registered");
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the daily ingestion cycle over every enabled source.
async fn register_ingest_job(
    scheduler: &JobScheduler,
    cron: &str,
    pool: PgPool,
    sources: Arc<SourcesFile>,
    pipeline: Arc<Pipeline>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = pool.clone();
        let sources = Arc::clone(&sources);
        let pipeline = Arc::clone(&pipeline);

        Box::pin(async move {
            tracing::info!("scheduler: starting ingestion cycle");
            run_ingest_job(&pool, &sources, &pipeline).await;
            tracing::info!("scheduler: ingestion cycle complete");
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: registered ingestion job");
    Ok(())
}

async fn run_ingest_job(pool: &PgPool, sources: &SourcesFile, pipeline: &Pipeline) {
    let selected = match select_sources(sources, None) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to select sources");
            return;
        }
    };
    if selected.is_empty() {
        tracing::info!("scheduler: no enabled sources; skipping");
        return;
    }

    match pipeline.ingest(pool, &selected, false, Trigger::Scheduler).await {
        Ok(outcome) => {
            let report = &outcome.report;
            tracing::info!(
                inserted = report.inserted,
                skipped_duplicate = report.skipped_duplicate,
                failed = report.failed,
                "scheduler: ingestion summary"
            );
            for failure in report.failures() {
                tracing::warn!(
                    source = %failure.source,
                    stage = %failure.stage,
                    kind = %failure.kind,
                    "scheduler: source failed"
                );
            }
        }
        Err(e) => tracing::error!(error = %e, "scheduler: ingestion cycle aborted"),
    }
}

/// Register the weekly growth suggestion job.
async fn register_weekly_job(
    scheduler: &JobScheduler,
    cron: &str,
    pool: PgPool,
    pipeline: Arc<Pipeline>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = pool.clone();
        let pipeline = Arc::clone(&pipeline);

        Box::pin(async move {
            tracing::info!("scheduler: starting weekly suggestion");
            match pipeline.weekly_suggestion(&pool, Trigger::Scheduler).await {
                Ok(row) => tracing::info!(id = row.id, "scheduler: weekly suggestion stored"),
                Err(e) => tracing::error!(error = %e, "scheduler: weekly suggestion failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: registered weekly suggestion job");
    Ok(())
}
