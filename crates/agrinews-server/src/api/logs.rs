use agrinews_db::{NewPlantLog, PlantLogRow};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct LogsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateLogRequest {
    pub plant: String,
    /// Defaults to the time of insertion.
    pub log_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub watered: bool,
    pub fertilizer_applied: Option<String>,
    pub disease: Option<String>,
    pub height_cm: Option<Decimal>,
    pub growth_stage: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct LogItem {
    id: i64,
    plant: String,
    log_date: DateTime<Utc>,
    watered: bool,
    fertilizer_applied: Option<String>,
    disease: Option<String>,
    height_cm: Option<Decimal>,
    growth_stage: Option<String>,
    note: Option<String>,
}

impl From<PlantLogRow> for LogItem {
    fn from(row: PlantLogRow) -> Self {
        Self {
            id: row.id,
            plant: row.plant,
            log_date: row.log_date,
            watered: row.watered,
            fertilizer_applied: row.fertilizer_applied,
            disease: row.disease,
            height_cm: row.height_cm,
            growth_stage: row.growth_stage,
            note: row.note,
        }
    }
}

/// `height_cm` is stored as `NUMERIC(5,2)`.
fn max_height_cm() -> Decimal {
    Decimal::new(99_999, 2)
}

fn validate(req_id: &str, body: &CreateLogRequest) -> Result<(), ApiError> {
    if body.plant.trim().is_empty() {
        return Err(ApiError::new(req_id, "validation_error", "plant must not be blank"));
    }
    if let Some(height) = body.height_cm {
        let max = max_height_cm();
        if height.is_sign_negative() || height > max {
            return Err(ApiError::new(
                req_id,
                "validation_error",
                format!("height_cm must be between 0 and {max}, got {height}"),
            ));
        }
    }
    Ok(())
}

pub(super) async fn list_logs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<ApiResponse<Vec<LogItem>>>, ApiError> {
    let rows = agrinews_db::list_recent_plant_logs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(LogItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/logs: record one care observation.
pub(super) async fn create_log(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateLogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LogItem>>), ApiError> {
    let rid = &req_id.0;
    validate(rid, &body)?;

    let log = NewPlantLog {
        plant: body.plant.trim().to_string(),
        log_date: body.log_date,
        watered: body.watered,
        fertilizer_applied: body.fertilizer_applied,
        disease: body.disease,
        height_cm: body.height_cm,
        growth_stage: body.growth_stage,
        note: body.note,
    };
    let row = agrinews_db::insert_plant_log(&state.pool, &log)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: row.into(),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
