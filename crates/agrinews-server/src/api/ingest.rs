use agrinews_ingest::{select_sources, CycleReport, Trigger};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_ingest_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct IngestQuery {
    /// Restrict the cycle to one source (by slug).
    pub source: Option<String>,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct IngestResult {
    /// `None` for dry runs and for runs that could not be recorded.
    run_id: Option<i64>,
    /// `recorded`, `dry_run` or `unrecorded`.
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bookkeeping_error: Option<String>,
    #[serde(flatten)]
    report: CycleReport,
}

/// POST /api/v1/ingest: run one ingestion cycle and return its summary.
///
/// Per-source failures are reported with 200 inside the summary; only an
/// unusable filter, a missing API key or an unreachable store fail the
/// request.
pub(super) async fn trigger_ingest(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<IngestQuery>,
) -> Result<Json<ApiResponse<IngestResult>>, ApiError> {
    let rid = req_id.0;
    let sources = select_sources(&state.sources, query.source.as_deref())
        .map_err(|e| map_ingest_error(rid.clone(), &e))?;
    let pipeline = state.pipeline(&rid)?;

    let outcome = pipeline
        .ingest(&state.pool, &sources, query.dry_run, Trigger::Api)
        .await
        .map_err(|e| map_ingest_error(rid.clone(), &e))?;

    let (run_id, status) = match (&outcome.run, query.dry_run) {
        (Some(run), _) => (Some(run.id), "recorded"),
        (None, true) => (None, "dry_run"),
        (None, false) => (None, "unrecorded"),
    };

    Ok(Json(ApiResponse {
        data: IngestResult {
            run_id,
            status,
            bookkeeping_error: outcome.bookkeeping_error,
            report: outcome.report,
        },
        meta: ResponseMeta::new(rid),
    }))
}
