//! Wellness scoring configuration with the production defaults.

/// Penalties and fallbacks for the wellness score.
#[derive(Debug, Clone)]
pub struct WellnessConfig {
  /// Used when no average self-reported wellness is available.
  pub default_avg_wellness: f64,
  /// Active reports per employee above which the heavy penalty applies.
  pub heavy_load_ratio: f64,
  pub heavy_load_penalty: i64,
  /// Active reports per employee above which the moderate penalty applies.
  pub moderate_load_ratio: f64,
  pub moderate_load_penalty: i64,
  /// Subtracted once per critical report.
  pub critical_report_penalty: i64,
  /// Reported when no resolved report has timing data.
  pub default_resolution_hours: i64,
  /// Length of each trend period.
  pub trend_window_days: i64,
}

impl Default for WellnessConfig {
  fn default() -> Self {
    Self {
      default_avg_wellness: 75.0,
      heavy_load_ratio: 0.5,
      heavy_load_penalty: 20,
      moderate_load_ratio: 0.3,
      moderate_load_penalty: 10,
      critical_report_penalty: 5,
      default_resolution_hours: 24,
      trend_window_days: 7,
    }
  }
}
