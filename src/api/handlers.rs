//! API Request Handlers

use axum::{
    extract::{Json, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use super::types::*;
use crate::core::agent::SheetsAgent;
use crate::models::errors::AppError;
use crate::utils::telemetry::TelemetryCollector;

/// Shared application state
pub struct AppState {
    pub agent: Arc<SheetsAgent>,
    pub telemetry: Arc<TelemetryCollector>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(agent: Arc<SheetsAgent>, telemetry: Arc<TelemetryCollector>) -> Self {
        Self {
            agent,
            telemetry,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Map an AppError onto the wire: status from the error code, body with the
/// code + detail.
fn fail(err: AppError) -> (StatusCode, Json<ErrorBody>) {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorBody {
            code: err.code_str().to_string(),
            detail: err.message,
        }),
    )
}

// ============================================
// Liveness & Health
// ============================================

/// Basic liveness probe
pub async fn root() -> Json<StatusData> {
    Json(StatusData::ok())
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthData> {
    Json(HealthData {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

// ============================================
// Questions
// ============================================

pub async fn stel_vraag(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<AnswerData>, (StatusCode, Json<ErrorBody>)> {
    if req.vraag.trim().is_empty() {
        return Err(fail(AppError::bad_request("vraag mag niet leeg zijn")));
    }

    info!("❓ Processing question: {}", req.vraag);

    match state.agent.query_data(&req.vraag).await {
        Ok(antwoord) => {
            state.telemetry.record_question_answered();
            Ok(Json(AnswerData { antwoord }))
        }
        Err(e) => {
            error!("❌ Error processing question: {}", e);
            state.telemetry.record_question_failed();
            Err(fail(e))
        }
    }
}

// ============================================
// Data Refresh
// ============================================

pub async fn ververs_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusData>, (StatusCode, Json<ErrorBody>)> {
    info!("🔄 Refreshing sheet data...");

    match state.agent.refresh().await {
        Ok(rows) => {
            info!("✅ Refresh complete: {} registrations", rows);
            state.telemetry.record_refresh();
            Ok(Json(StatusData::refreshed()))
        }
        Err(e) => {
            error!("❌ Error refreshing data: {}", e);
            Err(fail(e))
        }
    }
}

// ============================================
// CSV Export
// ============================================

/// Export registrations as a CSV download.
///
/// The query arrives either as `?query=...` or as a JSON body
/// `{"query": "..."}`; the query parameter wins when both are present.
pub async fn export_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
    body: Option<Json<ExportBody>>,
) -> Result<Response, (StatusCode, Json<ErrorBody>)> {
    let export_query = params
        .query
        .or_else(|| body.and_then(|Json(b)| b.query))
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| fail(AppError::bad_request("Query parameter is required")))?;

    info!("📦 Export requested: {}", export_query);

    let csv = state.agent.export_csv(&export_query).await.map_err(|e| {
        error!("❌ Error exporting data: {}", e);
        fail(e)
    })?;

    state.telemetry.record_export();

    let filename = crate::core::export::export_filename(chrono::Local::now());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
            (
                header::ACCESS_CONTROL_EXPOSE_HEADERS,
                "Content-Disposition".to_string(),
            ),
        ],
        csv,
    )
        .into_response())
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsData> {
    Json(StatsData {
        telemetry: state.telemetry.get_stats(),
        rows_loaded: state.agent.loaded_rows().await,
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
