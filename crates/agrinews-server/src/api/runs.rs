use agrinews_db::{DbError, RunRow, RunSourceRow};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct RunsQuery {
    pub limit: Option<i64>,
}

/// One row of `pipeline_runs`.
#[derive(Debug, Serialize)]
pub(super) struct RunItem {
    id: i64,
    kind: String,
    triggered_by: String,
    succeeded: bool,
    inserted: i32,
    skipped_duplicate: i32,
    failed: i32,
    error_message: Option<String>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl From<RunRow> for RunItem {
    fn from(row: RunRow) -> Self {
        let RunRow {
            id,
            kind,
            triggered_by,
            succeeded,
            inserted,
            skipped_duplicate,
            failed,
            error_message,
            started_at,
            finished_at,
        } = row;
        Self {
            id,
            kind,
            triggered_by,
            succeeded,
            inserted,
            skipped_duplicate,
            failed,
            error_message,
            started_at,
            finished_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct RunSourceItem {
    source: String,
    outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<RunFailureItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct RunFailureItem {
    stage: Option<String>,
    kind: Option<String>,
    message: Option<String>,
}

impl From<RunSourceRow> for RunSourceItem {
    fn from(row: RunSourceRow) -> Self {
        let failure = (row.outcome == "failed").then(|| RunFailureItem {
            stage: row.failure_stage,
            kind: row.failure_kind,
            message: row.message,
        });
        Self {
            source: row.source_slug,
            outcome: row.outcome,
            title: row.title,
            failure,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct RunDetail {
    #[serde(flatten)]
    run: RunItem,
    sources: Vec<RunSourceItem>,
}

pub(super) async fn list_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RunsQuery>,
) -> Result<Json<ApiResponse<Vec<RunItem>>>, ApiError> {
    let rows = agrinews_db::list_runs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(RunItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/runs/{run_id}: one run with its per-source rows.
pub(super) async fn get_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(run_id): Path<i64>,
) -> Result<Json<ApiResponse<RunDetail>>, ApiError> {
    let rid = req_id.0;
    let run = match agrinews_db::get_run(&state.pool, run_id).await {
        Ok(run) => run,
        Err(DbError::NotFound) => {
            return Err(ApiError::new(
                rid,
                "not_found",
                format!("run {run_id} not found"),
            ))
        }
        Err(e) => return Err(map_db_error(rid, &e)),
    };
    let sources = agrinews_db::list_run_sources(&state.pool, run.id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: RunDetail {
            run: run.into(),
            sources: sources.into_iter().map(RunSourceItem::from).collect(),
        },
        meta: ResponseMeta::new(rid),
    }))
}
