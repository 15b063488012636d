//! Flag engine failures. Input problems carry the offending field name.

use thiserror::Error;

use crate::types::ReportId;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("{field} must not be empty")]
  MissingField { field: &'static str },

  #[error("severity '{0}' is not one of Low, Medium, High, Critical")]
  UnknownSeverity(String),

  #[error("submitted_at '{value}' is not an RFC3339 timestamp: {source}")]
  BadTimestamp {
    value: String,
    #[source]
    source: chrono::ParseError,
  },

  #[error("report {0} already has flag fields")]
  AlreadyFlagged(ReportId),

  #[error("malformed request: {0}")]
  Json(#[from] serde_json::Error),
}

impl EngineError {
  /// Inbound field the error refers to; `None` for failures not caused by one field.
  pub fn field(&self) -> Option<&'static str> {
    match self {
      Self::MissingField { field } => Some(*field),
      Self::UnknownSeverity(_) => Some("severity"),
      Self::BadTimestamp { .. } => Some("submitted_at"),
      Self::AlreadyFlagged(_) | Self::Json(_) => None,
    }
  }

  /// True when the caller sent a report that cannot be accepted.
  pub fn is_rejected_input(&self) -> bool {
    self.field().is_some()
  }
}
