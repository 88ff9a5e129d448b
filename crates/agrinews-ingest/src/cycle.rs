//! The ingestion cycle: every enabled source, isolated, concurrently bounded.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use agrinews_core::{AppConfig, ArticleRecord, SourceConfig, SourcesFile};
use agrinews_db::InsertOutcome;
use agrinews_scraper::ScraperError;
use agrinews_summarizer::{prompts, summarize, SummarizerError, TextGenerator};
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};

use crate::error::IngestError;
use crate::report::{CycleReport, FailureKind, SourceFailure, SourceOutcome, Stage};
use crate::seams::{ArticleSource, ArticleWriter};

#[derive(Debug, Clone)]
pub struct CycleOptions {
    /// Sources processed at the same time. Zero is treated as one.
    pub max_concurrent: usize,
    /// Budget for one source's whole fetch → summarize → store sequence.
    pub source_timeout: Duration,
    /// Fetch and summarize, but do not write.
    pub dry_run: bool,
}

impl CycleOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_concurrent: config.max_concurrent_sources,
            source_timeout: Duration::from_secs(config.source_timeout_secs),
            dry_run: false,
        }
    }
}

/// Resolves which sources a cycle should run.
///
/// With no filter every enabled source is returned. A filter names exactly
/// one source by slug.
///
/// # Errors
///
/// [`IngestError::UnknownSource`] or [`IngestError::SourceDisabled`] when the
/// filter does not name an enabled source.
pub fn select_sources(
    file: &SourcesFile,
    filter: Option<&str>,
) -> Result<Vec<SourceConfig>, IngestError> {
    let Some(slug) = filter else {
        return Ok(file.enabled().cloned().collect());
    };

    let source = file
        .find(slug)
        .ok_or_else(|| IngestError::UnknownSource(slug.to_string()))?;
    if !source.enabled {
        return Err(IngestError::SourceDisabled(slug.to_string()));
    }
    Ok(vec![source.clone()])
}

/// Runs one ingestion cycle over `sources`.
///
/// Each enabled source goes through adapter → summarizer → writer on its
/// own; a failure at any stage is recorded against that source and the
/// cycle continues. Disabled sources are skipped. Never fails: the returned
/// report always accounts for every enabled source.
pub async fn run_ingestion_cycle<A, G, W>(
    sources: &[SourceConfig],
    adapter: &A,
    generator: &G,
    writer: &W,
    options: &CycleOptions,
) -> CycleReport
where
    A: ArticleSource + ?Sized,
    G: TextGenerator + ?Sized,
    W: ArticleWriter + ?Sized,
{
    // Materialized and boxed so the caller's future is provably `Send`
    // (works around rustc's higher-ranked auto-trait inference, #102211).
    let jobs: Vec<BoxFuture<'_, SourceOutcome>> = sources
        .iter()
        .filter(|s| s.enabled)
        .map(|source| -> BoxFuture<'_, SourceOutcome> {
            Box::pin(run_source(source, adapter, generator, writer, options))
        })
        .collect();
    let outcomes: Vec<SourceOutcome> = stream::iter(jobs)
        .buffer_unordered(options.max_concurrent.max(1))
        .collect()
        .await;

    let report = CycleReport::from_outcomes(outcomes);
    tracing::info!(
        inserted = report.inserted,
        skipped_duplicate = report.skipped_duplicate,
        dry_run = report.dry_run,
        failed = report.failed,
        "ingest: cycle finished"
    );
    report
}

async fn run_source<A, G, W>(
    source: &SourceConfig,
    adapter: &A,
    generator: &G,
    writer: &W,
    options: &CycleOptions,
) -> SourceOutcome
where
    A: ArticleSource + ?Sized,
    G: TextGenerator + ?Sized,
    W: ArticleWriter + ?Sized,
{
    let slug = source.slug();
    let stage = Mutex::new(Stage::Fetch);
    let attempt = process_source(
        source,
        &slug,
        &stage,
        adapter,
        generator,
        writer,
        options.dry_run,
    );

    let outcome = match tokio::time::timeout(options.source_timeout, attempt).await {
        Ok(outcome) => outcome,
        Err(_elapsed) => SourceOutcome::Failed(SourceFailure {
            source: slug.clone(),
            stage: *stage.lock().unwrap_or_else(PoisonError::into_inner),
            kind: FailureKind::Timeout,
            message: format!(
                "source did not finish within {}s",
                options.source_timeout.as_secs_f64()
            ),
        }),
    };

    log_outcome(&outcome);
    outcome
}

async fn process_source<A, G, W>(
    source: &SourceConfig,
    slug: &str,
    stage: &Mutex<Stage>,
    adapter: &A,
    generator: &G,
    writer: &W,
    dry_run: bool,
) -> SourceOutcome
where
    A: ArticleSource + ?Sized,
    G: TextGenerator + ?Sized,
    W: ArticleWriter + ?Sized,
{
    let fail = |stage: Stage, kind: FailureKind, message: String| {
        SourceOutcome::Failed(SourceFailure {
            source: slug.to_string(),
            stage,
            kind,
            message,
        })
    };

    let draft = match adapter.next_article(source).await {
        Ok(draft) => draft,
        Err(e) => return fail(Stage::Fetch, scrape_failure_kind(&e), e.to_string()),
    };

    enter(stage, Stage::Summarize);
    let insight = match summarize(generator, &draft.body_text, prompts::ARTICLE_INSIGHT).await {
        Ok(insight) => insight,
        Err(e) => return fail(Stage::Summarize, summarize_failure_kind(&e), e.to_string()),
    };

    let record = ArticleRecord::from_draft(draft, insight.text);
    if dry_run {
        return SourceOutcome::DryRun {
            source: slug.to_string(),
            title: record.title,
        };
    }

    enter(stage, Stage::Store);
    match writer.insert_if_absent(&record).await {
        Ok(InsertOutcome::Inserted(id)) => SourceOutcome::Inserted {
            source: slug.to_string(),
            title: record.title,
            id,
        },
        Ok(InsertOutcome::SkippedDuplicate) => SourceOutcome::SkippedDuplicate {
            source: slug.to_string(),
            title: record.title,
        },
        Err(e) => fail(Stage::Store, FailureKind::Store, e.to_string()),
    }
}

fn enter(current: &Mutex<Stage>, next: Stage) {
    *current.lock().unwrap_or_else(PoisonError::into_inner) = next;
}

pub(crate) fn scrape_failure_kind(err: &ScraperError) -> FailureKind {
    if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_parse() {
        FailureKind::Parse
    } else {
        FailureKind::Fetch
    }
}

pub(crate) fn summarize_failure_kind(err: &SummarizerError) -> FailureKind {
    match err {
        SummarizerError::SafetyBlocked { .. } => FailureKind::SafetyBlocked,
        SummarizerError::EmptyInput => FailureKind::NoInput,
        SummarizerError::Http(_) if err.is_timeout() => FailureKind::Timeout,
        SummarizerError::Http(_) => FailureKind::Fetch,
        SummarizerError::Provider(_) | SummarizerError::EmptyResponse => FailureKind::Provider,
    }
}

fn log_outcome(outcome: &SourceOutcome) {
    match outcome {
        SourceOutcome::Inserted { source, title, id } => {
            tracing::info!(source = %source, id, title = %title, "ingest: article inserted");
        }
        SourceOutcome::SkippedDuplicate { source, title } => {
            tracing::info!(source = %source, title = %title, "ingest: duplicate title skipped");
        }
        SourceOutcome::DryRun { source, title } => {
            tracing::info!(source = %source, title = %title, "ingest: dry run, not written");
        }
        SourceOutcome::Failed(failure) => {
            tracing::warn!(
                source = %failure.source,
                stage = %failure.stage,
                kind = %failure.kind,
                error = %failure.message,
                "ingest: source failed"
            );
        }
    }
}

#[cfg(test)]
#[path = "cycle_test.rs"]
mod tests;
