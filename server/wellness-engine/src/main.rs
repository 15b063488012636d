//! Binary entrypoint: read JSON lines from stdin, write one snapshot (or error) per line.

use chrono::Utc;
use std::io::{self, BufRead, Write};
use tracing::error;
use tracing_subscriber::EnvFilter;
use wellness_engine::types::{ErrorOutput, SnapshotRequest};
use wellness_engine::{snapshot_request, WellnessConfig, WellnessError};

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(io::stderr)
    .with_target(false)
    .compact()
    .init();

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  let config = WellnessConfig::default();

  for (index, line) in stdin.lock().lines().enumerate() {
    let line = match line {
      Ok(l) => l,
      Err(e) => {
        error!("read error: {}", e);
        std::process::exit(1);
      }
    };

    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let result = serde_json::from_str::<SnapshotRequest>(trimmed)
      .map_err(WellnessError::from)
      .and_then(|request| snapshot_request(&request, Utc::now(), &config));

    match result {
      Ok(snapshot) => {
        let _ = serde_json::to_writer(&mut out, &snapshot);
      }
      Err(e) => {
        let _ = serde_json::to_writer(&mut out, &ErrorOutput::for_line(index + 1, &e));
      }
    }
    let _ = writeln!(out);
  }

  let _ = out.flush();
}
