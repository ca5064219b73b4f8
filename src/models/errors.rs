//! Centralized Error Handling Module
//!
//! Every failure carries a unique machine-readable code so production logs
//! can be grepped per category.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - CFG_xxx: Configuration errors
//! - AUTH_xxx: Google OAuth errors
//! - SHEETS_xxx: Google Sheets API errors
//! - OPENAI_xxx: OpenAI API errors
//! - DATA_xxx: Dataset errors
//! - API_xxx: HTTP API errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Configuration Errors
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Google OAuth Errors
    // ============================================
    /// Credentials file missing or unreadable
    AuthCredentialsUnreadable,
    /// Credentials JSON malformed
    AuthCredentialsInvalid,
    /// Refresh token exchange failed
    AuthRefreshFailed,

    // ============================================
    // Google Sheets Errors
    // ============================================
    /// Sheets API request failed
    SheetsRequestFailed,
    /// Sheets API rate limited (HTTP 429)
    SheetsRateLimited,
    /// Sheets API returned an unparseable response
    SheetsInvalidResponse,

    // ============================================
    // OpenAI Errors
    // ============================================
    /// Chat completion request failed
    OpenAiRequestFailed,
    /// OpenAI rate limited (HTTP 429)
    OpenAiRateLimited,
    /// Completion response missing choices/content
    OpenAiInvalidResponse,

    // ============================================
    // Dataset Errors
    // ============================================
    /// No sheet data loaded yet
    DataNotLoaded,
    /// Sheet returned no rows
    DataEmpty,
    /// Required column missing from header row
    DataMissingColumn,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Generic Errors
    // ============================================
    /// External service timeout
    ExternalTimeout,
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            // Configuration
            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            // Google OAuth
            Self::AuthCredentialsUnreadable => "AUTH_CREDENTIALS_UNREADABLE",
            Self::AuthCredentialsInvalid => "AUTH_CREDENTIALS_INVALID",
            Self::AuthRefreshFailed => "AUTH_REFRESH_FAILED",

            // Google Sheets
            Self::SheetsRequestFailed => "SHEETS_REQUEST_FAILED",
            Self::SheetsRateLimited => "SHEETS_RATE_LIMITED",
            Self::SheetsInvalidResponse => "SHEETS_INVALID_RESPONSE",

            // OpenAI
            Self::OpenAiRequestFailed => "OPENAI_REQUEST_FAILED",
            Self::OpenAiRateLimited => "OPENAI_RATE_LIMITED",
            Self::OpenAiInvalidResponse => "OPENAI_INVALID_RESPONSE",

            // Dataset
            Self::DataNotLoaded => "DATA_NOT_LOADED",
            Self::DataEmpty => "DATA_EMPTY",
            Self::DataMissingColumn => "DATA_MISSING_COLUMN",

            // API
            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            // Generic
            Self::ExternalTimeout => "EXTERNAL_TIMEOUT",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest | Self::ConfigInvalidValue | Self::DataMissingColumn => 400,
            Self::ApiRateLimited => 429,
            Self::DataNotLoaded | Self::DataEmpty => 503,
            _ => 500,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SheetsRateLimited
                | Self::SheetsRequestFailed
                | Self::OpenAiRateLimited
                | Self::OpenAiRequestFailed
                | Self::ExternalTimeout
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Missing environment variable
    pub fn missing_env(name: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingEnv,
            format!("Missing environment variable: {}", name),
        )
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// Refresh token exchange failed
    pub fn auth_refresh_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthRefreshFailed, msg)
    }

    /// Sheets request failed
    pub fn sheets_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SheetsRequestFailed, msg)
    }

    /// OpenAI request failed
    pub fn openai_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::OpenAiRequestFailed, msg)
    }

    /// Completion response missing content
    pub fn openai_invalid(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::OpenAiInvalidResponse, msg)
    }

    /// No sheet data loaded yet
    pub fn data_not_loaded() -> Self {
        Self::new(
            ErrorCode::DataNotLoaded,
            "Geen data geladen. Roep eerst load_sheet_data aan.",
        )
    }

    /// Sheet returned no rows
    pub fn data_empty() -> Self {
        Self::new(ErrorCode::DataEmpty, "No data found in sheet")
    }

    /// Required column missing
    pub fn missing_column(name: &str) -> Self {
        Self::new(
            ErrorCode::DataMissingColumn,
            format!("Required column missing from sheet header: {}", name),
        )
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::ExternalTimeout, "Request timeout")
        } else {
            Self::new(ErrorCode::Unknown, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::SheetsInvalidResponse, "JSON parse error", err)
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        Self::with_source(ErrorCode::ApiInternalError, "CSV write error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::missing_env("SPREADSHEET_ID");
        assert_eq!(err.code, ErrorCode::ConfigMissingEnv);
        assert_eq!(err.code_str(), "CFG_MISSING_ENV");
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::OpenAiRateLimited.is_retryable());
        assert!(ErrorCode::SheetsRateLimited.is_retryable());
        assert!(!ErrorCode::DataMissingColumn.is_retryable());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::ApiBadRequest.http_status(), 400);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::DataNotLoaded.http_status(), 503);
        assert_eq!(ErrorCode::OpenAiRequestFailed.http_status(), 500);
    }

    #[test]
    fn test_display_includes_code() {
        let err = AppError::data_empty();
        assert!(err.to_string().contains("DATA_EMPTY"));
    }
}
