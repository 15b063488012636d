//! Wellness score: self-reported baseline minus load and critical-report penalties.

use crate::config::WellnessConfig;
use crate::types::WellnessInput;

const BASELINE_BOUND: f64 = 1_000_000.0;

/// Baseline from the average self-reported wellness, rounded half away from zero.
fn baseline(avg_wellness: Option<f64>, config: &WellnessConfig) -> i64 {
  let avg = avg_wellness
    .filter(|v| v.is_finite())
    .unwrap_or(config.default_avg_wellness);
  // Far outside 0-100 the value only matters for its sign; bounding it keeps the i64 math exact.
  avg.clamp(-BASELINE_BOUND, BASELINE_BOUND).round() as i64
}

/// Penalty for active reports per employee. Only the first matching threshold applies;
/// skipped entirely when there are no employees.
pub fn load_penalty(employee_count: u32, active_reports: u32, config: &WellnessConfig) -> i64 {
  if employee_count == 0 {
    return 0;
  }
  let reports_per_employee = active_reports as f64 / employee_count as f64;
  if reports_per_employee > config.heavy_load_ratio {
    config.heavy_load_penalty
  } else if reports_per_employee > config.moderate_load_ratio {
    config.moderate_load_penalty
  } else {
    0
  }
}

/// Wellness 0–100.
pub fn compute_wellness_score(input: &WellnessInput, config: &WellnessConfig) -> u8 {
  let critical = i64::from(input.critical_reports).saturating_mul(config.critical_report_penalty);
  baseline(input.avg_wellness, config)
    .saturating_sub(load_penalty(input.employee_count, input.active_reports, config))
    .saturating_sub(critical)
    .clamp(0, 100) as u8
}
