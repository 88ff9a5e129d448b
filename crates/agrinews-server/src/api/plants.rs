use agrinews_db::{PlantRegistration, PlantRow};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct RegisterPlantRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PlantItem {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<PlantRow> for PlantItem {
    fn from(row: PlantRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

pub(super) async fn list_plants(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<PlantItem>>>, ApiError> {
    let rows = agrinews_db::list_plants(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(PlantItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/plants: 201 for a new plant, 200 when the name is already
/// registered.
pub(super) async fn register_plant(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RegisterPlantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PlantItem>>), ApiError> {
    let rid = req_id.0;
    if body.name.trim().is_empty() {
        return Err(ApiError::new(rid, "validation_error", "name must not be blank"));
    }

    let registration = agrinews_db::register_plant(&state.pool, &body.name)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let status = match registration {
        PlantRegistration::Created(_) => StatusCode::CREATED,
        PlantRegistration::AlreadyRegistered(_) => StatusCode::OK,
    };

    Ok((
        status,
        Json(ApiResponse {
            data: registration.into_row().into(),
            meta: ResponseMeta::new(rid),
        }),
    ))
}
