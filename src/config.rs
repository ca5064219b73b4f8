//! Configuration Module
//!
//! All runtime knobs come from the environment (the service runs in a
//! container; the orchestrator supplies secrets as env vars and a read-only
//! credentials mount).

use std::path::PathBuf;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::providers::sheets::AuthorizedUser;

/// Default bind port (the orchestrator health check targets this)
pub const DEFAULT_PORT: u16 = 8000;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind host (HOST, default 0.0.0.0)
    pub host: String,
    /// Bind port (PORT, default 8000)
    pub port: u16,
    /// Tracing filter (LOG_LEVEL, default info)
    pub log_level: String,
    /// Tokio worker threads (MAX_WORKERS, default: available CPUs)
    pub max_workers: Option<usize>,
    /// Path to the Google authorized-user JSON (GOOGLE_CREDENTIALS_FILE)
    pub google_credentials_file: Option<PathBuf>,
    /// Inline credentials JSON (GOOGLE_CREDENTIALS_JSON); wins over the file
    pub google_credentials_json: Option<String>,
    /// Writable path for refreshed token persistence (GOOGLE_TOKEN_FILE)
    pub google_token_file: PathBuf,
    /// Spreadsheet to read (SPREADSHEET_ID)
    pub spreadsheet_id: String,
    /// OpenAI API key (OPENAI_API_KEY); never logged
    pub openai_api_key: String,
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn required(name: &str) -> AppResult<String> {
    optional(name).ok_or_else(|| AppError::missing_env(name))
}

/// Parse MAX_WORKERS; the runtime builder panics on zero threads, so zero is
/// rejected here as a config error.
fn parse_workers(raw: &str) -> AppResult<usize> {
    let workers = raw
        .parse::<usize>()
        .map_err(|_| AppError::invalid_config(format!("MAX_WORKERS is not a number: {}", raw)))?;
    if workers == 0 {
        return Err(AppError::invalid_config("MAX_WORKERS must be at least 1"));
    }
    Ok(workers)
}

impl AppConfig {
    /// Load and validate configuration from the environment.
    pub fn from_env() -> AppResult<Self> {
        let port = match optional("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::invalid_config(format!("PORT is not a port: {}", raw)))?,
            None => DEFAULT_PORT,
        };

        let max_workers = match optional("MAX_WORKERS") {
            Some(raw) => Some(parse_workers(&raw)?),
            None => None,
        };

        let google_credentials_json = optional("GOOGLE_CREDENTIALS_JSON");
        let google_credentials_file = optional("GOOGLE_CREDENTIALS_FILE").map(PathBuf::from);

        if google_credentials_json.is_none() && google_credentials_file.is_none() {
            return Err(AppError::missing_env("GOOGLE_CREDENTIALS_FILE"));
        }

        Ok(Self {
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_level: optional("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            max_workers,
            google_credentials_file,
            google_credentials_json,
            google_token_file: optional("GOOGLE_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("token.json")),
            spreadsheet_id: required("SPREADSHEET_ID")?,
            openai_api_key: required("OPENAI_API_KEY")?,
        })
    }

    /// Load the Google credentials this config points at.
    pub fn google_credentials(&self) -> AppResult<AuthorizedUser> {
        if let Some(json) = &self.google_credentials_json {
            info!("🔑 Using credentials from GOOGLE_CREDENTIALS_JSON");
            return AuthorizedUser::from_json(json);
        }

        // from_env guarantees one of the two is present
        let path = self
            .google_credentials_file
            .as_ref()
            .ok_or_else(|| AppError::missing_env("GOOGLE_CREDENTIALS_FILE"))?;
        info!("🔑 Using credentials file: {}", path.display());
        AuthorizedUser::from_file(path)
    }

    /// Worker thread count for the runtime builder.
    pub fn worker_threads(&self) -> usize {
        self.max_workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; keep them to pure helpers here and
    // leave from_env coverage to the integration suite.

    #[test]
    fn test_parse_workers() {
        assert_eq!(parse_workers("4").unwrap(), 4);
        assert_eq!(parse_workers("0").unwrap_err().code_str(), "CFG_INVALID_VALUE");
        assert_eq!(parse_workers("veel").unwrap_err().code_str(), "CFG_INVALID_VALUE");
    }

    #[test]
    fn test_worker_threads_default_is_positive() {
        let cfg = AppConfig {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            log_level: "info".into(),
            max_workers: None,
            google_credentials_file: None,
            google_credentials_json: Some("{}".into()),
            google_token_file: "token.json".into(),
            spreadsheet_id: "sheet".into(),
            openai_api_key: "sk-test".into(),
        };
        assert!(cfg.worker_threads() >= 1);
    }

    #[test]
    fn test_worker_threads_explicit() {
        let cfg = AppConfig {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            log_level: "info".into(),
            max_workers: Some(2),
            google_credentials_file: None,
            google_credentials_json: Some("{}".into()),
            google_token_file: "token.json".into(),
            spreadsheet_id: "sheet".into(),
            openai_api_key: "sk-test".into(),
        };
        assert_eq!(cfg.worker_threads(), 2);
    }
}
