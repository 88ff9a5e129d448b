//! Aggregation jobs: one derived artifact per run, appended to the store.

use agrinews_core::care_logs::most_recent;
use agrinews_core::config::MAX_WEEKLY_LOG_LIMIT;
use agrinews_core::{CareLog, DemandForecast};
use agrinews_db::{DemandRow, NewsRow, WeeklySuggestionRow};
use agrinews_summarizer::{prompts, summarize, TextGenerator};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::IngestError;
use crate::seams::InsightStore;

/// What the demand prompt sees of an article. Ids are left out so they
/// cannot leak into the forecast.
#[derive(Serialize)]
struct ArticleBrief<'a> {
    title: &'a str,
    insight: &'a str,
    published_at: DateTime<Utc>,
}

/// Generates and stores growth suggestions from the most recent care logs.
///
/// At most `limit` logs (never more than ten) are used, newest `log_date`
/// first, whatever the caller passed in.
///
/// # Errors
///
/// - [`IngestError::NoInput`] if there are no logs; the generator is not called.
/// - [`IngestError::Summarizer`] if generation fails or is blocked.
/// - [`IngestError::Db`] if the suggestion cannot be stored.
pub async fn produce_weekly_suggestion<G, S>(
    generator: &G,
    store: &S,
    logs: Vec<CareLog>,
    limit: usize,
) -> Result<WeeklySuggestionRow, IngestError>
where
    G: TextGenerator + ?Sized,
    S: InsightStore + ?Sized,
{
    let logs = most_recent(logs, limit.min(MAX_WEEKLY_LOG_LIMIT));
    if logs.is_empty() {
        return Err(IngestError::NoInput("no care logs available"));
    }

    let input = serde_json::to_string_pretty(&logs)?;
    let insight = summarize(generator, &input, prompts::WEEKLY_SUGGESTION).await?;
    let row = store.save_weekly_suggestion(&insight.text).await?;

    tracing::info!(id = row.id, logs = logs.len(), "jobs: weekly suggestion stored");
    Ok(row)
}

/// Generates and stores a crop price outlook from the `limit` newest
/// articles.
///
/// The generator's answer must be a JSON object with `increasing` and
/// `decreasing` arrays; the stored text is its normalized re-encoding.
///
/// # Errors
///
/// - [`IngestError::NoInput`] if there are no articles; the generator is not called.
/// - [`IngestError::MalformedForecast`] if the answer is not a forecast;
///   nothing is stored.
/// - [`IngestError::Summarizer`] if generation fails or is blocked.
/// - [`IngestError::Db`] if the forecast cannot be stored.
pub async fn produce_demand_forecast<G, S>(
    generator: &G,
    store: &S,
    mut articles: Vec<NewsRow>,
    limit: usize,
) -> Result<(DemandRow, DemandForecast), IngestError>
where
    G: TextGenerator + ?Sized,
    S: InsightStore + ?Sized,
{
    articles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    articles.truncate(limit);
    if articles.is_empty() {
        return Err(IngestError::NoInput("no news articles available"));
    }

    let briefs: Vec<ArticleBrief<'_>> = articles
        .iter()
        .map(|a| ArticleBrief {
            title: &a.title,
            insight: &a.description,
            published_at: a.created_at,
        })
        .collect();
    let input = serde_json::to_string_pretty(&briefs)?;

    let insight = summarize(generator, &input, prompts::DEMAND_FORECAST).await?;
    let forecast = parse_forecast(&insight.text)?;
    let row = store
        .save_demand_forecast(&serde_json::to_string(&forecast)?)
        .await?;

    tracing::info!(
        id = row.id,
        articles = articles.len(),
        increasing = forecast.increasing.len(),
        decreasing = forecast.decreasing.len(),
        "jobs: demand forecast stored"
    );
    Ok((row, forecast))
}

/// Parses generator output (already fence-stripped) into a forecast.
///
/// # Errors
///
/// [`IngestError::MalformedForecast`] if `text` is not a JSON object with
/// `increasing` and `decreasing` arrays of `{crop, price, analysis}`.
pub fn parse_forecast(text: &str) -> Result<DemandForecast, IngestError> {
    serde_json::from_str(text).map_err(|e| IngestError::MalformedForecast(e.to_string()))
}

#[cfg(test)]
#[path = "jobs_test.rs"]
mod tests;
