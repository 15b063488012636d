//! Core types for the flag engine (JSON contracts + internal models).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Inbound types: what the caller sends
// ---------------------------------------------------------------------------

/// One submitted report as received from the ingestion layer. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundReport {
  pub title: String,
  pub description: String,
  #[serde(rename = "type")]
  pub report_type: String,
  pub severity: String,
  pub department: String,
  #[serde(default)]
  pub location: String,
  pub submitted_by: String,
  #[serde(default)]
  pub is_anonymous: bool,
  #[serde(default)]
  pub has_attachments: Option<bool>,
  #[serde(default)]
  pub submitted_at: Option<String>,
  #[serde(default)]
  pub incident_date: Option<String>,
}

/// An account row as fetched by the caller for senior-admin selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
  pub id: i64,
  pub name: String,
  pub role: String,
  pub created_at: DateTime<Utc>,
}

impl AdminAccount {
  pub fn is_admin(&self) -> bool {
    self.role.trim().eq_ignore_ascii_case("admin")
  }
}

// ---------------------------------------------------------------------------
// Severity enum (normalized)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
  Low,
  Medium,
  High,
  Critical,
}

impl Severity {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "low" => Some(Self::Low),
      "medium" => Some(Self::Medium),
      "high" => Some(Self::High),
      "critical" => Some(Self::Critical),
      _ => None,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Low => "Low",
      Self::Medium => "Medium",
      Self::High => "High",
      Self::Critical => "Critical",
    }
  }

  pub fn is_high_or_critical(self) -> bool {
    matches!(self, Self::High | Self::Critical)
  }
}

// ---------------------------------------------------------------------------
// Internal normalized types
// ---------------------------------------------------------------------------

/// Opaque report token ("REP-" + hex digest).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

impl std::fmt::Display for ReportId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

/// Who filed the report. Anonymous submitters only keep a derived token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Submitter {
  Named(String),
  Anonymous(String),
}

impl Submitter {
  pub fn identity(&self) -> &str {
    match self {
      Self::Named(s) | Self::Anonymous(s) => s,
    }
  }

  pub fn is_anonymous(&self) -> bool {
    matches!(self, Self::Anonymous(_))
  }
}

/// Canonical report after normalization + validation.
#[derive(Debug, Clone)]
pub struct Report {
  pub id: ReportId,
  pub title: String,
  pub description: String,
  pub report_type: String,
  pub severity: Severity,
  pub department: String,
  pub location: String,
  pub submitted_at: DateTime<Utc>,
  pub submitter: Submitter,
  pub has_attachments: bool,
  pub incident_date: Option<String>,
  flags: Option<FlagEvaluation>,
}

impl Report {
  #[allow(clippy::too_many_arguments)]
  pub(crate) fn new(
    id: ReportId,
    title: String,
    description: String,
    report_type: String,
    severity: Severity,
    department: String,
    location: String,
    submitted_at: DateTime<Utc>,
    submitter: Submitter,
    has_attachments: bool,
    incident_date: Option<String>,
  ) -> Self {
    Self {
      id,
      title,
      description,
      report_type,
      severity,
      department,
      location,
      submitted_at,
      submitter,
      has_attachments,
      incident_date,
      flags: None,
    }
  }

  /// Flag fields, once written.
  pub fn flags(&self) -> Option<&FlagEvaluation> {
    self.flags.as_ref()
  }

  pub fn auto_flagged(&self) -> bool {
    self.flags.as_ref().map(|f| f.auto_flagged).unwrap_or(false)
  }

  /// Write the derived flag fields. They are written once and never recomputed.
  pub fn apply_flags(&mut self, evaluation: FlagEvaluation) -> Result<(), EngineError> {
    if self.flags.is_some() {
      return Err(EngineError::AlreadyFlagged(self.id.clone()));
    }
    self.flags = Some(evaluation);
    Ok(())
  }
}

// ---------------------------------------------------------------------------
// Rule contributions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
  CriticalKeyword,
  HighRiskKeyword,
  CriticalSeverity,
  HighSeverity,
  DepartmentPattern,
  MissingAttachments,
  VagueDescription,
}

/// One rule that fired, with its points and human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredRule {
  pub rule: RuleKind,
  pub points: u32,
  pub reason: String,
}

// ---------------------------------------------------------------------------
// Output types: what we emit
// ---------------------------------------------------------------------------

/// Administrator chosen to own a Critical report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRef {
  pub id: i64,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagEvaluation {
  pub auto_flagged: bool,
  pub flag_score: u32,
  pub flag_reason: Option<String>,
  pub assign_to: Option<AdminRef>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub triggered: Vec<TriggeredRule>,
}

/// Evaluation request line accepted by the binary.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRequest {
  pub report: InboundReport,
  #[serde(default)]
  pub recent_department_count: Option<u32>,
  #[serde(default)]
  pub admins: Vec<AdminAccount>,
}

/// Evaluation response line emitted by the binary.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluateResponse {
  pub report_id: ReportId,
  pub submitted_by: String,
  #[serde(flatten)]
  pub evaluation: FlagEvaluation,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Output line for an input line that produced no evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  /// 1-based position of the offending line on stdin.
  pub line: usize,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<&'static str>,
}

impl ErrorOutput {
  pub fn for_line(line: usize, err: &EngineError) -> Self {
    Self {
      error: true,
      line,
      message: err.to_string(),
      field: err.field(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn error_line_carries_position_and_field() {
    let out = ErrorOutput::for_line(3, &EngineError::UnknownSeverity("urgent".into()));
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["error"], true);
    assert_eq!(json["line"], 3);
    assert_eq!(json["field"], "severity");

    let out = ErrorOutput::for_line(1, &EngineError::AlreadyFlagged(ReportId("REP-1".into())));
    assert!(serde_json::to_value(&out).unwrap().get("field").is_none());
  }

  #[test]
  fn severity_parses_loosely() {
    assert_eq!(Severity::from_str_loose("critical"), Some(Severity::Critical));
    assert_eq!(Severity::from_str_loose(" HIGH "), Some(Severity::High));
    assert_eq!(Severity::from_str_loose("Medium"), Some(Severity::Medium));
    assert_eq!(Severity::from_str_loose("severe"), None);
  }

  #[test]
  fn severity_serializes_as_label() {
    let json = serde_json::to_string(&Severity::Critical).unwrap();
    assert_eq!(json, "\"Critical\"");
    assert!(Severity::High.is_high_or_critical());
    assert!(!Severity::Medium.is_high_or_critical());
  }

  #[test]
  fn inbound_report_defaults_optional_fields() {
    let json = r#"{
      "title": "Spill",
      "description": "Oil on the floor",
      "type": "Safety",
      "severity": "Low",
      "department": "Warehouse",
      "submitted_by": "EMP-000012"
    }"#;
    let raw: InboundReport = serde_json::from_str(json).unwrap();
    assert_eq!(raw.report_type, "Safety");
    assert_eq!(raw.has_attachments, None);
    assert!(!raw.is_anonymous);
    assert!(raw.location.is_empty());
  }

  #[test]
  fn admin_role_match_is_case_insensitive() {
    let account = AdminAccount {
      id: 1,
      name: "Dana".into(),
      role: "Admin".into(),
      created_at: Utc::now(),
    };
    assert!(account.is_admin());
  }
}
