//! SafeShift Wellness Engine: bounded wellness score + trend per department; no DB, no network.
//! Used by the metrics endpoints on every read; can also be run as a stdin/stdout binary.

pub mod config;
pub mod error;
pub mod resolution;
pub mod score;
pub mod trend;
pub mod types;

use chrono::{DateTime, Utc};

pub use config::WellnessConfig;
pub use error::WellnessError;
pub use types::{
  DepartmentCounts, DepartmentMetricsSnapshot, TrendDirection, WellnessInput, WellnessOutcome,
};

/// Score and trend from raw counts (no I/O).
pub fn compute_wellness(input: &WellnessInput, config: &WellnessConfig) -> WellnessOutcome {
  WellnessOutcome {
    wellness_score: score::compute_wellness_score(input, config),
    trend_direction: trend::classify(input.recent_count, input.prior_count),
  }
}

/// Full metrics snapshot for one department, stamped with `computed_at`.
pub fn snapshot(
  department: &str,
  counts: &DepartmentCounts,
  computed_at: DateTime<Utc>,
  config: &WellnessConfig,
) -> DepartmentMetricsSnapshot {
  let outcome = compute_wellness(&counts.wellness_input(), config);
  DepartmentMetricsSnapshot {
    department: department.to_string(),
    employee_count: counts.employee_count,
    active_reports: counts.active_reports,
    total_reports: counts.total_reports,
    resolved_reports: counts.resolved_reports,
    critical_reports: counts.critical_reports,
    wellness_score: outcome.wellness_score,
    avg_resolution_time: resolution::resolution_time(
      counts.avg_resolution_hours,
      config.default_resolution_hours,
    ),
    trend_direction: outcome.trend_direction,
    computed_at,
  }
}

/// Validate a binary request line and build its snapshot.
pub fn snapshot_request(
  request: &types::SnapshotRequest,
  now: DateTime<Utc>,
  config: &WellnessConfig,
) -> Result<DepartmentMetricsSnapshot, WellnessError> {
  let department = request.department.trim();
  if department.is_empty() {
    return Err(WellnessError::EmptyDepartment);
  }
  let computed_at = match &request.computed_at {
    Some(ts) => DateTime::parse_from_rfc3339(ts.trim())
      .map_err(|source| WellnessError::BadTimestamp {
        value: ts.clone(),
        source,
      })?
      .with_timezone(&Utc),
    None => now,
  };
  Ok(snapshot(department, &request.counts, computed_at, config))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn snapshot_returns_valid_output_shape() {
    let counts = DepartmentCounts {
      employee_count: 20,
      avg_wellness: Some(90.0),
      total_reports: 30,
      active_reports: 12,
      resolved_reports: 18,
      critical_reports: 3,
      recent_count: 4,
      prior_count: 6,
      avg_resolution_hours: Some(30.6),
    };
    let at = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
    let snap = snapshot("Operations", &counts, at, &WellnessConfig::default());
    assert_eq!(snap.department, "Operations");
    assert_eq!(snap.wellness_score, 55);
    assert_eq!(snap.avg_resolution_time, 31);
    assert_eq!(snap.trend_direction, TrendDirection::Decreasing);
    assert_eq!(snap.total_reports, 30);
    assert_eq!(snap.computed_at, at);
  }

  #[test]
  fn snapshot_request_rejects_blank_department() {
    let request: types::SnapshotRequest = serde_json::from_str(
      r#"{"department": " ", "employee_count": 1, "total_reports": 0, "active_reports": 0,
          "resolved_reports": 0, "critical_reports": 0, "recent_count": 0, "prior_count": 0}"#,
    )
    .unwrap();
    let err = snapshot_request(&request, Utc::now(), &WellnessConfig::default()).unwrap_err();
    assert!(err.to_string().contains("department"));
  }
}
