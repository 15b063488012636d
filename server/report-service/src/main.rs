//! Binary entrypoint for the report service.

use std::net::SocketAddr;
use std::sync::Arc;

use report_service::{router, telemetry, AppState, PgStore, ServiceConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  let config = ServiceConfig::from_env()?;
  telemetry::init(&config.log_level)?;

  let store = PgStore::connect(&config.database_url, config.max_connections).await?;
  let state = Arc::new(AppState::new(store, config.token_key.clone()));
  let app = router(state);

  let addr = config.socket_addr();
  let listener = tokio::net::TcpListener::bind(addr).await?;
  info!(%addr, "report-service listening");

  axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
  Ok(())
}
