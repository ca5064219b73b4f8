//! HTTP API Module
//!
//! REST surface of the training assistant: question answering, data refresh,
//! CSV export, health and stats.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use middleware::start_cleanup_task;
pub use routes::create_router;
pub use types::*;
