mod ingest;
mod insights;
mod logs;
mod news;
mod plants;
mod runs;

use std::sync::Arc;

use agrinews_core::SourcesFile;
use agrinews_ingest::{IngestError, Pipeline};
use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub sources: Arc<SourcesFile>,
    /// `None` when no generation API key is configured; trigger routes then
    /// answer 503 while read-back routes keep working.
    pub pipeline: Option<Arc<Pipeline>>,
}

impl AppState {
    fn pipeline(&self, request_id: &str) -> Result<Arc<Pipeline>, ApiError> {
        self.pipeline.clone().ok_or_else(|| {
            ApiError::new(
                request_id,
                "service_unavailable",
                IngestError::MissingApiKey.to_string(),
            )
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    generation: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &agrinews_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// Maps pipeline errors onto API error codes. Generation failures are the
/// upstream's fault (502); an unreachable store or missing key is ours (503).
pub(super) fn map_ingest_error(request_id: String, error: &IngestError) -> ApiError {
    let code = match error {
        IngestError::StoreUnavailable(_) | IngestError::MissingApiKey => "service_unavailable",
        IngestError::UnknownSource(_) | IngestError::NoInput(_) => "not_found",
        IngestError::SourceDisabled(_) => "bad_request",
        IngestError::MalformedForecast(_)
        | IngestError::Summarizer(_)
        | IngestError::Scraper(_) => "upstream_error",
        IngestError::Db(e) => return map_db_error(request_id, e),
        IngestError::Encode(_) => "internal_error",
    };
    tracing::warn!(error = %error, code, "pipeline request failed");
    ApiError::new(request_id, code, error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/ingest", post(ingest::trigger_ingest))
        .route("/api/v1/insights/weekly", post(insights::trigger_weekly))
        .route("/api/v1/insights/demand", post(insights::trigger_demand))
        .route(
            "/api/v1/insights/weekly/latest",
            get(insights::latest_weekly),
        )
        .route(
            "/api/v1/insights/demand/latest",
            get(insights::latest_demand),
        )
        .route("/api/v1/news", get(news::list_news))
        .route("/api/v1/logs", get(logs::list_logs).post(logs::create_log))
        .route(
            "/api/v1/plants",
            get(plants::list_plants).post(plants::register_plant),
        )
        .route("/api/v1/runs", get(runs::list_runs))
        .route("/api/v1/runs/{run_id}", get(runs::get_run))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let generation = if state.pipeline.is_some() {
        "configured"
    } else {
        "unconfigured"
    };

    match agrinews_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                    generation,
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                        generation,
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
