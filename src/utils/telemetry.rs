//! Telemetry Module
//!
//! Lightweight in-process counters behind atomics: requests per endpoint,
//! questions answered/failed, data refreshes, exports, and latency totals.
//! Served by `/stats` and dumped once at shutdown.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Aggregated snapshot for `/stats` and the shutdown log
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryStats {
    pub total_requests: u64,
    pub questions_answered: u64,
    pub questions_failed: u64,
    pub data_refreshes: u64,
    pub exports: u64,
    /// Mean request latency over all recorded requests
    pub avg_latency_ms: f64,
    /// Requests per endpoint path
    pub requests_by_endpoint: std::collections::BTreeMap<String, u64>,
    pub session_start: u64,
}

pub struct TelemetryCollector {
    total_requests: AtomicU64,
    questions_answered: AtomicU64,
    questions_failed: AtomicU64,
    data_refreshes: AtomicU64,
    exports: AtomicU64,
    total_latency_ms: AtomicU64,
    requests_by_endpoint: DashMap<String, u64>,
    session_start: u64,
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            questions_answered: AtomicU64::new(0),
            questions_failed: AtomicU64::new(0),
            data_refreshes: AtomicU64::new(0),
            exports: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            requests_by_endpoint: DashMap::new(),
            session_start: current_timestamp(),
        }
    }

    /// Record one completed HTTP request
    pub fn record_request(&self, path: &str, latency_ms: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        *self.requests_by_endpoint.entry(path.to_string()).or_insert(0) += 1;
    }

    pub fn record_question_answered(&self) {
        self.questions_answered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_question_failed(&self) {
        self.questions_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refresh(&self) {
        self.data_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_export(&self) {
        self.exports.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of all counters
    pub fn get_stats(&self) -> TelemetryStats {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        TelemetryStats {
            total_requests,
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            questions_failed: self.questions_failed.load(Ordering::Relaxed),
            data_refreshes: self.data_refreshes.load(Ordering::Relaxed),
            exports: self.exports.load(Ordering::Relaxed),
            avg_latency_ms: if total_requests > 0 {
                total_latency as f64 / total_requests as f64
            } else {
                0.0
            },
            requests_by_endpoint: self
                .requests_by_endpoint
                .iter()
                .map(|e| (e.key().clone(), *e.value()))
                .collect(),
            session_start: self.session_start,
        }
    }

    /// One-line summary for the shutdown sequence
    pub fn log_summary(&self) {
        let stats = self.get_stats();
        info!(
            "📊 Session totals: {} requests, {} questions answered ({} failed), {} refreshes, {} exports, avg latency {:.1}ms",
            stats.total_requests,
            stats.questions_answered,
            stats.questions_failed,
            stats.data_refreshes,
            stats.exports,
            stats.avg_latency_ms,
        );
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let telemetry = TelemetryCollector::new();
        telemetry.record_request("/vraag", 120);
        telemetry.record_request("/vraag", 80);
        telemetry.record_request("/health", 2);
        telemetry.record_question_answered();
        telemetry.record_question_failed();
        telemetry.record_refresh();

        let stats = telemetry.get_stats();
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.questions_answered, 1);
        assert_eq!(stats.questions_failed, 1);
        assert_eq!(stats.data_refreshes, 1);
        assert_eq!(stats.requests_by_endpoint["/vraag"], 2);
        assert!((stats.avg_latency_ms - (202.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stats() {
        let stats = TelemetryCollector::new().get_stats();
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.avg_latency_ms, 0.0);
    }
}
