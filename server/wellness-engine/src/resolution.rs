//! Average resolution time from creation/resolution timestamp pairs.

use chrono::{DateTime, Utc};

/// Mean of whole elapsed hours per resolved report (each pair truncated to whole hours).
///
/// None when there are no pairs. Pairs resolved before they were created count as zero.
pub fn average_resolution_hours(pairs: &[(DateTime<Utc>, DateTime<Utc>)]) -> Option<f64> {
  if pairs.is_empty() {
    return None;
  }
  let total: i64 = pairs
    .iter()
    .map(|(created, resolved)| (*resolved - *created).num_hours().max(0))
    .sum();
  Some(total as f64 / pairs.len() as f64)
}

/// Rounded hours, falling back to `default_hours` when no timing is available.
pub fn resolution_time(avg_hours: Option<f64>, default_hours: i64) -> i64 {
  avg_hours
    .filter(|v| v.is_finite())
    .map(|v| v.round() as i64)
    .unwrap_or(default_hours)
}
