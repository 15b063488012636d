//! Service errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flag_engine::EngineError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
  #[error(transparent)]
  Engine(#[from] EngineError),

  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("{0} not found")]
  NotFound(String),

  #[error("storage: {0}")]
  Store(#[from] StoreError),
}

impl ServiceError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Engine(e) if e.is_rejected_input() => StatusCode::BAD_REQUEST,
      Self::Validation { .. } => StatusCode::BAD_REQUEST,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Store(StoreError::Conflict(_) | StoreError::FlagsLocked(_)) => StatusCode::CONFLICT,
      Self::Engine(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ServiceError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(error = %self, "request failed");
    }
    let body = Json(json!({ "success": false, "message": self.to_string() }));
    (status, body).into_response()
  }
}
