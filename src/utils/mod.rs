//! Utils Module - Helper Functions & Shared Utilities

pub mod telemetry;
pub mod text;

pub use telemetry::{TelemetryCollector, TelemetryStats};
pub use text::*;
