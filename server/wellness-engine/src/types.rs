//! Input/output types for the wellness engine (JSON contract with the metrics endpoints).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WellnessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
  Increasing,
  Decreasing,
  Stable,
}

impl TrendDirection {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Increasing => "increasing",
      Self::Decreasing => "decreasing",
      Self::Stable => "stable",
    }
  }
}

/// Counts the wellness score is computed from.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct WellnessInput {
  pub employee_count: u32,
  /// Average self-reported wellness; None when there is nothing to average.
  #[serde(default)]
  pub avg_wellness: Option<f64>,
  pub active_reports: u32,
  pub critical_reports: u32,
  /// Reports in the last trend window.
  pub recent_count: u32,
  /// Reports in the window immediately before that.
  pub prior_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WellnessOutcome {
  pub wellness_score: u8,
  pub trend_direction: TrendDirection,
}

/// Everything the caller fetched for one department.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DepartmentCounts {
  pub employee_count: u32,
  #[serde(default)]
  pub avg_wellness: Option<f64>,
  pub total_reports: u32,
  pub active_reports: u32,
  pub resolved_reports: u32,
  pub critical_reports: u32,
  pub recent_count: u32,
  pub prior_count: u32,
  /// Mean hours from creation to resolution; None when nothing is resolved yet.
  #[serde(default)]
  pub avg_resolution_hours: Option<f64>,
}

impl DepartmentCounts {
  pub fn wellness_input(&self) -> WellnessInput {
    WellnessInput {
      employee_count: self.employee_count,
      avg_wellness: self.avg_wellness,
      active_reports: self.active_reports,
      critical_reports: self.critical_reports,
      recent_count: self.recent_count,
      prior_count: self.prior_count,
    }
  }
}

/// Derived per-department metrics. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentMetricsSnapshot {
  pub department: String,
  pub employee_count: u32,
  pub active_reports: u32,
  pub total_reports: u32,
  pub resolved_reports: u32,
  pub critical_reports: u32,
  pub wellness_score: u8,
  /// Hours.
  pub avg_resolution_time: i64,
  pub trend_direction: TrendDirection,
  pub computed_at: DateTime<Utc>,
}

/// Snapshot request line accepted by the binary.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotRequest {
  pub department: String,
  #[serde(flatten)]
  pub counts: DepartmentCounts,
  #[serde(default)]
  pub computed_at: Option<String>,
}

/// Output line for a request line that produced no snapshot.
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
  pub fn for_line(line: usize, err: &WellnessError) -> Self {
    Self {
      error: true,
      line,
      message: err.to_string(),
      field: err.field(),
    }
  }
}
