//! LSS Training Assistant
//!
//! HTTP service around a Google Sheet of training registrations:
//! - loads and parses the registration data into memory
//! - answers Dutch free-text questions via OpenAI chat completions,
//!   scoped to the period the question mentions
//! - exports period/company-filtered registrations as CSV

pub mod api;
pub mod config;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use core::{Period, SheetsAgent, TrainingDataset, TrainingSummary};
pub use models::errors::{AppError, AppResult, ErrorCode};
pub use models::types::{ChatMessage, Registration};
pub use providers::{AuthorizedUser, OpenAiClient, SheetsClient, SHEET_RANGE};
pub use utils::telemetry::{TelemetryCollector, TelemetryStats};
