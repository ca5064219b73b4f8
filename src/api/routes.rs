//! API Route Configuration

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::{logging_middleware, metrics_middleware, rate_limit_middleware};

/// Create the API router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    // Wildcard CORS; tighten per environment when a real frontend origin is known
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Liveness & health
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        // Data endpoints
        .route("/vraag", post(handlers::stel_vraag))
        .route("/ververs", get(handlers::ververs_data))
        .route("/export", get(handlers::export_data).post(handlers::export_data))
        .layer(middleware::from_fn_with_state(state.clone(), metrics_middleware))
        .with_state(state)
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(rate_limit_middleware))
}
