//! Integration tests for the wellness engine.

use chrono::{Duration, TimeZone, Utc};
use wellness_engine::types::SnapshotRequest;
use wellness_engine::{
  compute_wellness, snapshot_request, trend, TrendDirection, WellnessConfig, WellnessInput,
};

fn wellness(employees: u32, avg: Option<f64>, active: u32, critical: u32, recent: u32, prior: u32) -> WellnessInput {
  WellnessInput {
    employee_count: employees,
    avg_wellness: avg,
    active_reports: active,
    critical_reports: critical,
    recent_count: recent,
    prior_count: prior,
  }
}

#[test]
fn heavy_load_and_critical_reports() {
  let out = compute_wellness(&wellness(20, Some(90.0), 12, 3, 2, 2), &WellnessConfig::default());
  assert_eq!(out.wellness_score, 55);
  assert_eq!(out.trend_direction, TrendDirection::Stable);
}

#[test]
fn score_floors_at_zero() {
  let out = compute_wellness(&wellness(5, Some(95.0), 4, 20, 9, 1), &WellnessConfig::default());
  assert_eq!(out.wellness_score, 0);
  assert_eq!(out.trend_direction, TrendDirection::Increasing);
}

#[test]
fn no_employees_uses_average_and_critical_penalty_only() {
  let out = compute_wellness(&wellness(0, Some(81.0), 40, 1, 0, 3), &WellnessConfig::default());
  assert_eq!(out.wellness_score, 76);
  assert_eq!(out.trend_direction, TrendDirection::Decreasing);
}

#[test]
fn stable_when_both_periods_empty() {
  let out = compute_wellness(&wellness(3, None, 0, 0, 0, 0), &WellnessConfig::default());
  assert_eq!(out.wellness_score, 75);
  assert_eq!(out.trend_direction, TrendDirection::Stable);
}

#[test]
fn score_always_within_bounds() {
  let config = WellnessConfig::default();
  for employees in [0, 1, 7, 50] {
    for avg in [None, Some(-40.0), Some(0.0), Some(55.5), Some(100.0), Some(250.0)] {
      for active in [0, 3, 30] {
        for critical in [0, 2, 100] {
          let out = compute_wellness(&wellness(employees, avg, active, critical, 0, 0), &config);
          assert!(out.wellness_score <= 100);
        }
      }
    }
  }
}

#[test]
fn trend_from_raw_timestamps() {
  let now = Utc.with_ymd_and_hms(2025, 3, 20, 8, 0, 0).unwrap();
  let timestamps = vec![
    now - Duration::days(1),
    now - Duration::days(2),
    now - Duration::days(3),
    now - Duration::days(9),
  ];
  let (recent, prior) = trend::period_counts(&timestamps, now, 7);
  assert_eq!((recent, prior), (3, 1));
  assert_eq!(trend::classify(recent, prior), TrendDirection::Increasing);
}

#[test]
fn snapshot_line_round_trip_through_json() {
  let json = r#"{
    "department": "Operations",
    "employee_count": 10,
    "avg_wellness": 80,
    "total_reports": 14,
    "active_reports": 6,
    "resolved_reports": 8,
    "critical_reports": 1,
    "recent_count": 2,
    "prior_count": 2,
    "computed_at": "2025-03-20T08:00:00Z",
    "unknown_field": true
  }"#;
  let request: SnapshotRequest = serde_json::from_str(json).unwrap();
  let snap = snapshot_request(&request, Utc::now(), &WellnessConfig::default()).unwrap();
  assert_eq!(snap.wellness_score, 55);
  assert_eq!(snap.avg_resolution_time, 24);

  let value = serde_json::to_value(&snap).unwrap();
  assert_eq!(value["trend_direction"], "stable");
  assert_eq!(value["department"], "Operations");
  assert_eq!(value["computed_at"], "2025-03-20T08:00:00Z");
}

#[test]
fn bad_timestamp_gives_clear_error() {
  let json = r#"{
    "department": "Operations", "employee_count": 1, "total_reports": 0, "active_reports": 0,
    "resolved_reports": 0, "critical_reports": 0, "recent_count": 0, "prior_count": 0,
    "computed_at": "last week"
  }"#;
  let request: SnapshotRequest = serde_json::from_str(json).unwrap();
  let err = snapshot_request(&request, Utc::now(), &WellnessConfig::default()).unwrap_err();
  assert!(err.to_string().contains("computed_at"), "Error should mention the field: {}", err);
}

#[test]
fn hostile_average_in_request_line_still_scores() {
  let json = r#"{
    "department": "Operations", "employee_count": 4, "avg_wellness": -1e300, "total_reports": 1,
    "active_reports": 1, "resolved_reports": 0, "critical_reports": 1, "recent_count": 1, "prior_count": 0
  }"#;
  let request: SnapshotRequest = serde_json::from_str(json).unwrap();
  let snap = snapshot_request(&request, Utc::now(), &WellnessConfig::default()).unwrap();
  assert_eq!(snap.wellness_score, 0);
  assert_eq!(snap.trend_direction, TrendDirection::Increasing);
}
