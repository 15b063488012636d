//! Flag rule weights and thresholds with the production defaults.

/// Tunable points and thresholds for report flagging.
#[derive(Debug, Clone)]
pub struct FlagConfig {
  /// Total score at or above which a report is auto-flagged.
  pub flag_threshold: u32,
  /// Points for the first critical keyword found.
  pub critical_keyword_points: u32,
  /// Points for the first high-risk keyword found (only when no critical keyword fired).
  pub high_keyword_points: u32,
  pub critical_severity_points: u32,
  pub high_severity_points: u32,
  /// Same-department reports in the trailing window needed for the pattern signal.
  pub pattern_min_reports: u32,
  pub pattern_points: u32,
  /// Length of the trailing window the caller counts over.
  pub pattern_window_days: i64,
  pub missing_attachments_points: u32,
  /// Descriptions shorter than this (in characters) are considered vague.
  pub vague_description_chars: usize,
  pub vague_description_points: u32,
}

impl Default for FlagConfig {
  fn default() -> Self {
    Self {
      flag_threshold: 30,
      critical_keyword_points: 30,
      high_keyword_points: 20,
      critical_severity_points: 25,
      high_severity_points: 15,
      pattern_min_reports: 3,
      pattern_points: 20,
      pattern_window_days: 7,
      missing_attachments_points: 15,
      vague_description_chars: 100,
      vague_description_points: 10,
    }
  }
}
