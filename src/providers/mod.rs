//! Providers Module - External Data Sources
//!
//! Google Sheets (registration data) and OpenAI (analysis answers).

pub mod openai;
pub mod sheets;

pub use openai::OpenAiClient;
pub use sheets::{AuthorizedUser, SheetsClient, SHEET_RANGE};
