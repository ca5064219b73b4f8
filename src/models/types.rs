//! Core Data Types
//!
//! Single source of truth for the domain types shared across the crate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sheet column: registration date
pub const COL_DATE: &str = "Datum Inschrijving";
/// Sheet column: training name
pub const COL_TRAINING: &str = "Training";
/// Sheet column: revenue
pub const COL_REVENUE: &str = "Omzet";
/// Sheet column: training type
pub const COL_TYPE: &str = "Type";
/// Sheet column: company (optional, only used by export filter)
pub const COL_COMPANY: &str = "Bedrijf";

/// A single training registration parsed from the sheet
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    /// Registration date (Datum Inschrijving)
    pub registered_at: NaiveDate,
    /// Training name, cleaned of embedded dates
    pub training: String,
    /// Revenue in euros (Omzet)
    pub revenue: f64,
    /// Training type (Type)
    pub kind: String,
    /// Company (Bedrijf), when the column exists
    pub company: Option<String>,
}

/// One turn in the model conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}
