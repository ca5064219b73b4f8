//! Core Module - Dataset, Periods, Summaries, Agent
//!
//! The analysis pipeline: raw sheet rows in, Dutch answers and CSV out.

pub mod agent;
pub mod dataset;
pub mod export;
pub mod period;
pub mod summary;

pub use agent::SheetsAgent;
pub use dataset::TrainingDataset;
pub use period::Period;
pub use summary::{TrainingSummary, Trends};
