//! Sheets Agent
//!
//! Orchestrates the full question flow: sheet data lives in memory behind a
//! read/write lock, questions pull a period-scoped summary into the model
//! context, and the last few conversation turns ride along so follow-up
//! questions work.

use chrono::Local;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::core::dataset::TrainingDataset;
use crate::core::export::to_csv;
use crate::core::period::Period;
use crate::core::summary::{system_prompt, TrainingSummary};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::ChatMessage;
use crate::providers::openai::OpenAiClient;
use crate::providers::sheets::{SheetsClient, SHEET_RANGE};

/// Conversation turns sent along with each question
const MAX_HISTORY: usize = 5;

pub struct SheetsAgent {
    sheets: SheetsClient,
    openai: OpenAiClient,
    spreadsheet_id: String,
    dataset: RwLock<Option<TrainingDataset>>,
    history: Mutex<Vec<ChatMessage>>,
}

impl SheetsAgent {
    pub fn new(sheets: SheetsClient, openai: OpenAiClient, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            sheets,
            openai,
            spreadsheet_id: spreadsheet_id.into(),
            dataset: RwLock::new(None),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Fetch and parse the sheet, swapping the in-memory dataset.
    /// Returns the number of registrations loaded.
    pub async fn load_sheet_data(&self, range: &str) -> AppResult<usize> {
        let values = self.sheets.values_get(&self.spreadsheet_id, range).await?;
        let dataset = TrainingDataset::from_rows(&values)?;
        let count = dataset.len();

        info!(
            "📊 Sheet data loaded: {} registrations ({} rows skipped)",
            count,
            dataset.skipped()
        );

        *self.dataset.write().await = Some(dataset);
        Ok(count)
    }

    /// Reload using the default range.
    pub async fn refresh(&self) -> AppResult<usize> {
        self.load_sheet_data(SHEET_RANGE).await
    }

    /// Answer a Dutch free-text question about the registrations.
    pub async fn query_data(&self, question: &str) -> AppResult<String> {
        let today = Local::now().date_naive();

        // Build the context under the read lock, then release it before the
        // (slow) model call.
        let context = {
            let guard = self.dataset.read().await;
            let dataset = guard.as_ref().ok_or_else(AppError::data_not_loaded)?;

            let period = Period::parse(question, today);
            let summary = TrainingSummary::build(dataset, period, today);
            summary.to_context(today)
        };

        let mut messages = vec![ChatMessage::system(system_prompt(&context))];
        {
            let history = self.history.lock().await;
            let tail = history.len().saturating_sub(MAX_HISTORY);
            messages.extend(history[tail..].iter().cloned());
        }
        messages.push(ChatMessage::user(question));

        let answer = self.openai.chat(&messages).await?;

        let mut history = self.history.lock().await;
        history.push(ChatMessage::user(question));
        history.push(ChatMessage::assistant(answer.clone()));
        // Bound the buffer; only the tail is ever sent anyway
        let overflow = history.len().saturating_sub(MAX_HISTORY * 2);
        if overflow > 0 {
            history.drain(..overflow);
        }

        Ok(answer)
    }

    /// Export registrations matching a query (period + optional company
    /// mention) as CSV bytes.
    pub async fn export_csv(&self, query: &str) -> AppResult<Vec<u8>> {
        let today = Local::now().date_naive();
        let guard = self.dataset.read().await;
        let dataset = guard.as_ref().ok_or_else(AppError::data_not_loaded)?;

        let period = Period::parse(query, today);
        let company = dataset.detect_company(query);

        if let Some(name) = &company {
            info!("📦 Export scoped to company: {}", name);
        }

        let rows = dataset.filter(period, company.as_deref(), today);
        to_csv(&rows)
    }

    /// Number of registrations currently loaded (0 when not loaded yet)
    pub async fn loaded_rows(&self) -> usize {
        self.dataset.read().await.as_ref().map_or(0, |d| d.len())
    }

    /// Drop the conversation history
    #[allow(dead_code)]
    pub async fn reset_history(&self) {
        self.history.lock().await.clear();
    }
}
