//! Binary entrypoint: read JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is an EvaluateRequest. Output lines are either:
//! - An EvaluateResponse (report id + flag evaluation)
//! - An ErrorOutput (when input validation fails)
//!
//! REPORT_TOKEN_SECRET must be set; it keys report tokens and anonymised submitter ids.

use chrono::Utc;
use flag_engine::types::{ErrorOutput, EvaluateRequest, EvaluateResponse};
use flag_engine::{normalize, EngineError, FlagContext, FlagEvaluator, TokenKey};
use std::io::{self, BufRead, Write};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(io::stderr)
    .with_target(false)
    .compact()
    .init();

  let key = match std::env::var("REPORT_TOKEN_SECRET") {
    Ok(secret) if !secret.trim().is_empty() => TokenKey::from_secret(&secret),
    _ => {
      error!("REPORT_TOKEN_SECRET must be set");
      std::process::exit(2);
    }
  };

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  let evaluator = FlagEvaluator::with_defaults();

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

    let result = serde_json::from_str::<EvaluateRequest>(trimmed)
      .map_err(EngineError::from)
      .and_then(|request| evaluate(&evaluator, &key, &request));

    match result {
      Ok(response) => {
        let _ = serde_json::to_writer(&mut out, &response);
      }
      Err(e) => {
        let _ = serde_json::to_writer(&mut out, &ErrorOutput::for_line(index + 1, &e));
      }
    }
    let _ = writeln!(out);
  }

  let _ = out.flush();
}

fn evaluate(
  evaluator: &FlagEvaluator,
  key: &TokenKey,
  request: &EvaluateRequest,
) -> Result<EvaluateResponse, EngineError> {
  let mut report = normalize::normalize(&request.report, Utc::now(), key)?;
  let ctx = FlagContext {
    recent_department_count: request.recent_department_count,
    admins: &request.admins,
  };
  let evaluation = evaluator.flag(&mut report, ctx)?;
  Ok(EvaluateResponse {
    report_id: report.id.clone(),
    submitted_by: report.submitter.identity().to_string(),
    evaluation,
  })
}
