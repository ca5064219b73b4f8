//! Google Sheets v4 Client
//!
//! Reads the registration sheet with an authorized-user credential: the
//! stored refresh token is exchanged for a short-lived access token, which is
//! cached in memory and re-exchanged shortly before expiry. The refreshed
//! credential set is persisted so a restarted container resumes without a new
//! consent flow (the token file lives on a writable volume).

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};

/// Default data range for the registration sheet
pub const SHEET_RANGE: &str = "'Inschrijvingen'!A1:Z50000";

/// Read-only scope requested for the spreadsheet
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const REQUEST_TIMEOUT_SECS: u64 = 15;

// Backoff for transient Sheets API failures
const BASE_RETRY_MS: u64 = 500;
const MAX_RETRY_MS: u64 = 4000;
const MAX_RETRIES: u32 = 3;
const RETRY_JITTER_PERCENT: u64 = 20;

/// Safety margin subtracted from the reported token lifetime
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

/// Google "authorized user" credential file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

impl AuthorizedUser {
    /// Parse credentials from a JSON string (env-provided deployments)
    pub fn from_json(json: &str) -> AppResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            AppError::with_source(
                ErrorCode::AuthCredentialsInvalid,
                "Credentials JSON malformed",
                e,
            )
        })
    }

    /// Read credentials from a file path
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorCode::AuthCredentialsUnreadable,
                format!("Credentials file not found at {}", path.display()),
                e,
            )
        })?;
        Self::from_json(&raw)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Option<Vec<Vec<serde_json::Value>>>,
}

/// Google Sheets API client
pub struct SheetsClient {
    http: reqwest::Client,
    api_base: String,
    token_url: String,
    creds: AuthorizedUser,
    /// Where refreshed credentials are persisted (None disables persistence)
    token_file: Option<PathBuf>,
    access: Mutex<Option<CachedToken>>,
}

impl SheetsClient {
    pub fn new(creds: AuthorizedUser, token_file: Option<PathBuf>) -> Self {
        Self::with_base_urls(creds, token_file, DEFAULT_API_BASE, DEFAULT_TOKEN_URL)
    }

    /// Custom endpoints (tests point these at a mock server)
    pub fn with_base_urls(
        creds: AuthorizedUser,
        token_file: Option<PathBuf>,
        api_base: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token_url: token_url.into(),
            creds,
            token_file,
            access: Mutex::new(None),
        }
    }

    /// Fetch a value range as a row matrix of strings.
    ///
    /// Uses `FORMATTED_VALUE` rendering so cells arrive the way the sheet
    /// displays them (Dutch dates and currency strings).
    pub async fn values_get(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> AppResult<Vec<Vec<String>>> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_base,
            spreadsheet_id,
            encode_range(range)
        );

        let mut attempt = 0u32;
        let response = loop {
            let result = self
                .http
                .get(&url)
                .query(&[("valueRenderOption", "FORMATTED_VALUE")])
                .bearer_auth(&token)
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => break response,
                Ok(response) => {
                    let status = response.status();
                    let retryable = status.as_u16() == 429 || status.is_server_error();
                    if !retryable || attempt >= MAX_RETRIES {
                        let code = if status.as_u16() == 429 {
                            ErrorCode::SheetsRateLimited
                        } else {
                            ErrorCode::SheetsRequestFailed
                        };
                        return Err(AppError::new(
                            code,
                            format!("Sheets API error: {}", status),
                        ));
                    }
                    warn!("⚠️ Sheets API returned {}, retry {}/{}", status, attempt + 1, MAX_RETRIES);
                }
                Err(e) => {
                    let retryable = e.is_timeout() || e.is_connect();
                    if !retryable || attempt >= MAX_RETRIES {
                        return Err(AppError::with_source(
                            ErrorCode::SheetsRequestFailed,
                            "Sheets request failed",
                            e,
                        ));
                    }
                    warn!("⚠️ Sheets request error ({}), retry {}/{}", e, attempt + 1, MAX_RETRIES);
                }
            }

            tokio::time::sleep(retry_delay(attempt)).await;
            attempt += 1;
        };

        let parsed: ValuesResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorCode::SheetsInvalidResponse,
                "Failed to parse Sheets response",
                e,
            )
        })?;

        let values = parsed.values.unwrap_or_default();
        if values.is_empty() {
            return Err(AppError::data_empty());
        }

        debug!("📊 Sheets: fetched {} rows from {}", values.len(), range);

        Ok(values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// Current access token, refreshing when missing or near expiry.
    async fn access_token(&self) -> AppResult<String> {
        let mut cached = self.access.lock().await;

        if let Some(entry) = cached.as_ref() {
            if entry.expires_at > Instant::now() {
                return Ok(entry.token.clone());
            }
        }

        let params = [
            ("client_id", self.creds.client_id.as_str()),
            ("client_secret", self.creds.client_secret.as_str()),
            ("refresh_token", self.creds.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorCode::AuthRefreshFailed, "Token endpoint unreachable", e)
            })?;

        if !response.status().is_success() {
            return Err(AppError::auth_refresh_failed(format!(
                "Token refresh rejected: {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::with_source(ErrorCode::AuthRefreshFailed, "Token response malformed", e)
        })?;

        info!("🔑 Google access token refreshed (valid {}s)", token.expires_in);

        let lifetime = token.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS);
        *cached = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });

        self.persist_token(&token.access_token);

        Ok(token.access_token)
    }

    /// Best-effort write of the refreshed credential set to the token file.
    fn persist_token(&self, access_token: &str) {
        let Some(path) = &self.token_file else {
            return;
        };

        let mut snapshot = self.creds.clone();
        snapshot.token = Some(access_token.to_string());
        snapshot.token_uri = Some(self.token_url.clone());
        snapshot.scopes = Some(vec![SHEETS_SCOPE.to_string()]);

        match serde_json::to_string_pretty(&snapshot)
            .map_err(std::io::Error::other)
            .and_then(|json| std::fs::write(path, json))
        {
            Ok(()) => debug!("💾 Token persisted to {}", path.display()),
            Err(e) => warn!("⚠️ Failed to persist token to {}: {}", path.display(), e),
        }
    }
}

/// Percent-encode the characters that occur in A1 range notation.
fn encode_range(range: &str) -> String {
    range
        .replace('%', "%25")
        .replace(' ', "%20")
        .replace('\'', "%27")
        .replace('!', "%21")
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_range() {
        assert_eq!(
            encode_range("'Inschrijvingen'!A1:Z50000"),
            "%27Inschrijvingen%27%21A1:Z50000"
        );
        assert_eq!(encode_range("Blad 1!A:B"), "Blad%201%21A:B");
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(serde_json::json!("abc")), "abc");
        assert_eq!(cell_to_string(serde_json::json!(12)), "12");
        assert_eq!(cell_to_string(serde_json::Value::Null), "");
    }

    #[test]
    fn test_authorized_user_from_json() {
        let creds = AuthorizedUser::from_json(
            r#"{"client_id":"id","client_secret":"secret","refresh_token":"rt"}"#,
        )
        .unwrap();
        assert_eq!(creds.client_id, "id");
        assert!(creds.token.is_none());
    }

    #[test]
    fn test_authorized_user_rejects_garbage() {
        let err = AuthorizedUser::from_json("not json").unwrap_err();
        assert_eq!(err.code_str(), "AUTH_CREDENTIALS_INVALID");
    }
}
