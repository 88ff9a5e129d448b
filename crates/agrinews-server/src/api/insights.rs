//! Weekly suggestion and demand forecast: triggers and read-back.

use agrinews_core::DemandForecast;
use agrinews_db::{DemandRow, WeeklySuggestionRow};
use agrinews_ingest::Trigger;
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, map_ingest_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct WeeklySuggestionItem {
    id: i64,
    suggestion: String,
    created_at: DateTime<Utc>,
}

impl From<WeeklySuggestionRow> for WeeklySuggestionItem {
    fn from(row: WeeklySuggestionRow) -> Self {
        Self {
            id: row.id,
            suggestion: row.suggestion,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct DemandItem {
    id: i64,
    #[serde(flatten)]
    forecast: DemandForecast,
    created_at: DateTime<Utc>,
}

impl DemandItem {
    fn new(row: &DemandRow, forecast: DemandForecast) -> Self {
        Self {
            id: row.id,
            forecast,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Triggers
// ---------------------------------------------------------------------------

/// POST /api/v1/insights/weekly: generate and store a weekly suggestion.
pub(super) async fn trigger_weekly(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<(StatusCode, Json<ApiResponse<WeeklySuggestionItem>>), ApiError> {
    let rid = req_id.0;
    let pipeline = state.pipeline(&rid)?;
    let row = pipeline
        .weekly_suggestion(&state.pool, Trigger::Api)
        .await
        .map_err(|e| map_ingest_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: row.into(),
            meta: ResponseMeta::new(rid),
        }),
    ))
}

/// POST /api/v1/insights/demand: generate and store a demand forecast.
pub(super) async fn trigger_demand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<(StatusCode, Json<ApiResponse<DemandItem>>), ApiError> {
    let rid = req_id.0;
    let pipeline = state.pipeline(&rid)?;
    let (row, forecast) = pipeline
        .demand_forecast(&state.pool, Trigger::Api)
        .await
        .map_err(|e| map_ingest_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: DemandItem::new(&row, forecast),
            meta: ResponseMeta::new(rid),
        }),
    ))
}

// ---------------------------------------------------------------------------
// Read-back
// ---------------------------------------------------------------------------

pub(super) async fn latest_weekly(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<WeeklySuggestionItem>>, ApiError> {
    let row = agrinews_db::latest_weekly_suggestion(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "no weekly suggestion yet"))?;

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn latest_demand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DemandItem>>, ApiError> {
    let row = agrinews_db::latest_demand_forecast(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "no demand forecast yet"))?;

    let forecast: DemandForecast = serde_json::from_str(&row.json).map_err(|e| {
        tracing::error!(id = row.id, error = %e, "stored demand forecast is not valid JSON");
        ApiError::new(req_id.0.clone(), "internal_error", "stored forecast is corrupt")
    })?;

    Ok(Json(ApiResponse {
        data: DemandItem::new(&row, forecast),
        meta: ResponseMeta::new(req_id.0),
    }))
}
