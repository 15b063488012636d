//! Department metrics, recomputed from stored data on every read.

use chrono::{DateTime, Utc};
use wellness_engine::{snapshot, DepartmentMetricsSnapshot, WellnessConfig};

use crate::error::ServiceError;
use crate::store::ReportStore;

pub async fn department_metrics<S: ReportStore>(
  store: &S,
  department: &str,
  config: &WellnessConfig,
  now: DateTime<Utc>,
) -> Result<DepartmentMetricsSnapshot, ServiceError> {
  let names = store.department_names().await?;
  if !names.iter().any(|n| n == department) {
    return Err(ServiceError::NotFound(format!("department {}", department)));
  }
  let counts = store.department_counts(department, now, config.trend_window_days).await?;
  Ok(snapshot(department, &counts, now, config))
}

pub async fn all_department_metrics<S: ReportStore>(
  store: &S,
  config: &WellnessConfig,
  now: DateTime<Utc>,
) -> Result<Vec<DepartmentMetricsSnapshot>, ServiceError> {
  let mut out = Vec::new();
  for name in store.department_names().await? {
    let counts = store.department_counts(&name, now, config.trend_window_days).await?;
    out.push(snapshot(&name, &counts, now, config));
  }
  Ok(out)
}
