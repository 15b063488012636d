//! SafeShift Report Service
//!
//! HTTP service that stores submitted reports, runs the flag engine on them and serves
//! department wellness metrics. Bind to 127.0.0.1 by default (internal only).

pub mod config;
pub mod error;
mod handlers;
pub mod ingest;
pub mod metrics;
mod state;
pub mod store;
pub mod telemetry;

use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use handlers::{health, ApiResponse};
pub use state::AppState;
pub use store::{MemoryStore, PgStore, ReportStore};

/// All routes, with shared state attached.
pub fn router<S: ReportStore>(state: Arc<AppState<S>>) -> Router {
  Router::new()
    .route("/health", get(handlers::health))
    .route(
      "/reports",
      get(handlers::list_reports::<S>).post(handlers::create_report::<S>),
    )
    .route("/reports/:id", get(handlers::get_report::<S>))
    .route("/reports/:id/status", put(handlers::update_status::<S>))
    .route("/departments/metrics", get(handlers::all_department_metrics::<S>))
    .route("/departments/:name/metrics", get(handlers::department_metrics::<S>))
    .route("/activity", get(handlers::activity::<S>))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}
