//! Normalize inbound reports into canonical internal Report models.

use chrono::{DateTime, Utc};

use crate::error::EngineError;
use crate::token::{self, TokenKey};
use crate::types::*;

fn required(field: &'static str, value: &str) -> Result<String, EngineError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(EngineError::MissingField { field });
  }
  Ok(trimmed.to_string())
}

/// Parse and validate an InboundReport into a Report.
///
/// `now` stands in for a missing `submitted_at`. `key` seeds the report token and, for anonymous
/// reports, the replacement submitter identity.
pub fn normalize(raw: &InboundReport, now: DateTime<Utc>, key: &TokenKey) -> Result<Report, EngineError> {
  let title = required("title", &raw.title)?;
  let description = required("description", &raw.description)?;
  let report_type = required("type", &raw.report_type)?;
  let department = required("department", &raw.department)?;
  let submitted_by = required("submitted_by", &raw.submitted_by)?;

  let severity = Severity::from_str_loose(&raw.severity)
    .ok_or_else(|| EngineError::UnknownSeverity(raw.severity.trim().to_string()))?;

  let submitted_at = match &raw.submitted_at {
    Some(ts) => DateTime::parse_from_rfc3339(ts.trim())
      .map_err(|source| EngineError::BadTimestamp {
        value: ts.clone(),
        source,
      })?
      .with_timezone(&Utc),
    None => now,
  };

  let id = token::report_id(key, &title, &department, &submitted_at);
  let submitter = if raw.is_anonymous {
    Submitter::Anonymous(token::anonymise(key, &submitted_by, &id))
  } else {
    Submitter::Named(submitted_by)
  };

  let incident_date = raw
    .incident_date
    .as_ref()
    .map(|d| d.trim().to_string())
    .filter(|d| !d.is_empty());

  Ok(Report::new(
    id,
    title,
    description,
    report_type,
    severity,
    department,
    raw.location.trim().to_string(),
    submitted_at,
    submitter,
    raw.has_attachments.unwrap_or(false),
    incident_date,
  ))
}
