//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::utils::telemetry::TelemetryStats;

/// Question body for POST /vraag
#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub vraag: String,
}

/// Answer body
#[derive(Debug, Serialize)]
pub struct AnswerData {
    pub antwoord: String,
}

/// Generic status body ("/" and "/ververs")
#[derive(Debug, Serialize)]
pub struct StatusData {
    pub status: String,
}

impl StatusData {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    pub fn refreshed() -> Self {
        Self {
            status: "Data ververst".to_string(),
        }
    }
}

/// Health check body
#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    /// ISO-8601 timestamp of the check
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Export query, accepted as query string or JSON body
#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportBody {
    pub query: Option<String>,
}

/// Stats body for GET /stats
#[derive(Debug, Serialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub telemetry: TelemetryStats,
    pub rows_loaded: usize,
    pub uptime_seconds: u64,
    pub api_version: String,
}

/// Error body returned by all failing endpoints
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable detail
    pub detail: String,
}
