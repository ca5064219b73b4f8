//! LSS Training Assistant API Server
//!
//! Usage:
//!   cargo run --bin lss_api
//!
//! Environment:
//!   GOOGLE_CREDENTIALS_FILE - Google authorized-user JSON path
//!   GOOGLE_CREDENTIALS_JSON - inline alternative to the file
//!   SPREADSHEET_ID          - spreadsheet to read
//!   OPENAI_API_KEY          - OpenAI API key
//!   GOOGLE_TOKEN_FILE       - writable token path (default: token.json)
//!   LOG_LEVEL               - log filter (default: info)
//!   MAX_WORKERS             - runtime worker threads (default: CPUs)
//!   HOST / PORT             - bind address (default: 0.0.0.0:8000)

use lss_training_assistant::api::{create_router, start_cleanup_task, AppState};
use lss_training_assistant::config::AppConfig;
use lss_training_assistant::core::SheetsAgent;
use lss_training_assistant::providers::{OpenAiClient, SheetsClient, SHEET_RANGE};
use lss_training_assistant::utils::telemetry::TelemetryCollector;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> eyre::Result<()> {
    let config = AppConfig::from_env()?;

    // LOG_LEVEL drives the filter; RUST_LOG still wins when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let workers = config.worker_threads();
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()?
        .block_on(run(config, workers))
}

async fn run(config: AppConfig, workers: usize) -> eyre::Result<()> {
    info!("🚀 LSS Training Assistant v{} starting", env!("CARGO_PKG_VERSION"));
    info!("   Workers: {}", workers);

    // Wire up providers and the agent
    let creds = config.google_credentials()?;
    let sheets = SheetsClient::new(creds, Some(config.google_token_file.clone()));
    let openai = OpenAiClient::new(config.openai_api_key.clone());
    let agent = Arc::new(SheetsAgent::new(sheets, openai, config.spreadsheet_id.clone()));

    // Load sheet data before accepting traffic; a broken sheet or credential
    // set should fail the container, not serve empty answers
    info!("📊 Loading sheet data from range {}...", SHEET_RANGE);
    match agent.load_sheet_data(SHEET_RANGE).await {
        Ok(rows) => info!("✅ Initial load complete: {} registrations", rows),
        Err(e) => {
            error!("❌ Failed to load sheet data: {}", e);
            return Err(e.into());
        }
    }

    let telemetry = Arc::new(TelemetryCollector::new());
    let telemetry_for_shutdown = telemetry.clone();

    let state = Arc::new(AppState::new(agent, telemetry));

    // Background cleanup for the rate limiter
    start_cleanup_task();

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Listening on http://{}", addr);
    info!("");
    info!("Endpoints:");
    info!("  POST /vraag    - Dutch question about the registrations");
    info!("  GET  /ververs  - Reload sheet data");
    info!("  GET  /export   - CSV export (also accepts POST)");
    info!("  GET  /stats    - Request statistics");
    info!("  GET  /health   - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("");
    info!("🛑 Shutdown signal received, cleaning up...");
    telemetry_for_shutdown.log_summary();
    info!("👋 LSS Training Assistant shutdown complete");

    Ok(())
}
