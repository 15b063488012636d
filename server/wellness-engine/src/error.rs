//! Failures of the snapshot binary contract. Scoring itself never fails.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WellnessError {
  #[error("department must not be empty")]
  EmptyDepartment,

  #[error("computed_at '{value}' is not an RFC3339 timestamp: {source}")]
  BadTimestamp {
    value: String,
    #[source]
    source: chrono::ParseError,
  },

  #[error("malformed request: {0}")]
  Json(#[from] serde_json::Error),
}

impl WellnessError {
  /// Request field the error refers to.
  pub fn field(&self) -> Option<&'static str> {
    match self {
      Self::EmptyDepartment => Some("department"),
      Self::BadTimestamp { .. } => Some("computed_at"),
      Self::Json(_) => None,
    }
  }
}
