//! Tracing subscriber setup. RUST_LOG wins over the configured level.

use tracing_subscriber::EnvFilter;

pub fn init(log_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  let filter = match EnvFilter::try_from_default_env() {
    Ok(filter) => filter,
    Err(_) => EnvFilter::try_new(log_level)?,
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .compact()
    .with_ansi(false)
    .try_init()?;
  Ok(())
}
