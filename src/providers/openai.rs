//! OpenAI Chat Completions Client
//!
//! Thin reqwest wrapper around `/v1/chat/completions` with two guards the
//! upstream API requires in practice:
//! - a client-side request window (50 requests/minute) that callers wait on
//! - exponential backoff with jitter on 429/5xx/timeouts

use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::ChatMessage;

/// Model used for all analysis questions
pub const OPENAI_MODEL: &str = "gpt-4-turbo-preview";

/// Client-side rate limit window
pub const MAX_REQUESTS_PER_MINUTE: u32 = 50;
const WINDOW: Duration = Duration::from_secs(60);

/// Per-request timeout
const REQUEST_TIMEOUT_SECS: u64 = 30;

// Backoff: 1s -> 2s -> 4s, capped, with jitter
const BASE_RETRY_MS: u64 = 1000;
const MAX_RETRY_MS: u64 = 8000;
const MAX_RETRIES: u32 = 3;
const RETRY_JITTER_PERCENT: u64 = 20;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Sliding-window request budget. Callers block (async) until a slot frees.
struct RequestWindow {
    state: Mutex<(u32, Instant)>,
    max_per_window: u32,
}

impl RequestWindow {
    fn new(max_per_window: u32) -> Self {
        Self {
            state: Mutex::new((0, Instant::now())),
            max_per_window,
        }
    }

    async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let (ref mut count, ref mut window_start) = *state;

                if window_start.elapsed() > WINDOW {
                    *count = 0;
                    *window_start = Instant::now();
                }

                if *count < self.max_per_window {
                    *count += 1;
                    return;
                }

                WINDOW.saturating_sub(window_start.elapsed())
            };

            warn!("⏳ OpenAI rate window exhausted, waiting {:?}", wait);
            tokio::time::sleep(wait.max(Duration::from_millis(50))).await;
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// OpenAI API client
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    window: RequestWindow,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Custom base URL (tests point this at a mock server)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            window: RequestWindow::new(MAX_REQUESTS_PER_MINUTE),
        }
    }

    /// Run one chat completion and return the assistant's text.
    pub async fn chat(&self, messages: &[ChatMessage]) -> AppResult<String> {
        self.window.acquire().await;

        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = json!({
            "model": OPENAI_MODEL,
            "messages": messages,
            "temperature": 0.1,
            "max_tokens": 500,
        });

        let mut attempt = 0u32;
        loop {
            let started = Instant::now();
            let result = self
                .http
                .post(&url)
                .bearer_auth(&self.api_key)
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .json(&body)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    let parsed: CompletionResponse = response.json().await.map_err(|e| {
                        AppError::with_source(
                            ErrorCode::OpenAiInvalidResponse,
                            "Failed to parse completion response",
                            e,
                        )
                    })?;

                    let content = parsed
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|c| c.message.content)
                        .filter(|c| !c.is_empty())
                        .ok_or_else(|| {
                            AppError::openai_invalid("Completion returned no content")
                        })?;

                    debug!(
                        "OpenAI completion in {}ms ({} chars)",
                        started.elapsed().as_millis(),
                        content.len()
                    );
                    return Ok(content);
                }
                Ok(response) => {
                    let status = response.status();
                    let retryable = status.as_u16() == 429 || status.is_server_error();
                    let detail = response.text().await.unwrap_or_default();

                    if !retryable || attempt >= MAX_RETRIES {
                        let code = if status.as_u16() == 429 {
                            ErrorCode::OpenAiRateLimited
                        } else {
                            ErrorCode::OpenAiRequestFailed
                        };
                        return Err(AppError::new(
                            code,
                            format!("OpenAI API error {}: {}", status, truncate(&detail, 200)),
                        ));
                    }

                    warn!(
                        "⚠️ OpenAI returned {}, retry {}/{}",
                        status,
                        attempt + 1,
                        MAX_RETRIES
                    );
                }
                Err(e) => {
                    let retryable = e.is_timeout() || e.is_connect();
                    if !retryable || attempt >= MAX_RETRIES {
                        return Err(AppError::with_source(
                            ErrorCode::OpenAiRequestFailed,
                            "OpenAI request failed",
                            e,
                        ));
                    }
                    warn!("⚠️ OpenAI request error ({}), retry {}/{}", e, attempt + 1, MAX_RETRIES);
                }
            }

            tokio::time::sleep(retry_delay(attempt)).await;
            attempt += 1;
        }
    }
}

/// Exponential backoff with jitter
fn retry_delay(attempt: u32) -> Duration {
    let base = (BASE_RETRY_MS << attempt).min(MAX_RETRY_MS);
    let jitter_range = base * RETRY_JITTER_PERCENT / 100;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..=jitter_range)
    } else {
        0
    };
    Duration::from_millis(base + jitter)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
