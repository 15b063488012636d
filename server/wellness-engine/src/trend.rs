//! Week-over-week trend classification and trailing-window counting.

use chrono::{DateTime, Duration, Utc};

use crate::types::TrendDirection;

/// Strict comparison of the recent period against the one before it.
pub fn classify(recent_count: u32, prior_count: u32) -> TrendDirection {
  if recent_count > prior_count {
    TrendDirection::Increasing
  } else if recent_count < prior_count {
    TrendDirection::Decreasing
  } else {
    TrendDirection::Stable
  }
}

/// Count timestamps into (recent, prior) periods of `window_days` each, ending at `now`.
///
/// recent: ts >= now - window. prior: now - 2*window <= ts < now - window.
pub fn period_counts(timestamps: &[DateTime<Utc>], now: DateTime<Utc>, window_days: i64) -> (u32, u32) {
  let recent_start = now - Duration::days(window_days);
  let prior_start = recent_start - Duration::days(window_days);

  timestamps.iter().fold((0, 0), |(recent, prior), ts| {
    if *ts >= recent_start {
      (recent + 1, prior)
    } else if *ts >= prior_start {
      (recent, prior + 1)
    } else {
      (recent, prior)
    }
  })
}
