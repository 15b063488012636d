//! Additive flag rules. Each rule returns the contribution it makes, if any.
//!
//! Rules run in a fixed order; reasons are reported in that same order.

use crate::config::FlagConfig;
use crate::keywords::{self, CRITICAL_KEYWORDS, HIGH_RISK_KEYWORDS};
use crate::types::{Report, RuleKind, Severity, TriggeredRule};

fn triggered(rule: RuleKind, points: u32, reason: impl Into<String>) -> TriggeredRule {
  TriggeredRule {
    rule,
    points,
    reason: reason.into(),
  }
}

/// Tier 1: first critical keyword in description, title or type.
pub fn critical_keyword(report: &Report, config: &FlagConfig) -> Option<TriggeredRule> {
  let fields = [
    report.description.as_str(),
    report.title.as_str(),
    report.report_type.as_str(),
  ];
  keywords::first_match(&fields, CRITICAL_KEYWORDS).map(|kw| {
    triggered(
      RuleKind::CriticalKeyword,
      config.critical_keyword_points,
      format!("Critical keyword detected: '{}'", kw),
    )
  })
}

/// Tier 2: first high-risk keyword in description or title.
pub fn high_risk_keyword(report: &Report, config: &FlagConfig) -> Option<TriggeredRule> {
  let fields = [report.description.as_str(), report.title.as_str()];
  keywords::first_match(&fields, HIGH_RISK_KEYWORDS).map(|kw| {
    triggered(
      RuleKind::HighRiskKeyword,
      config.high_keyword_points,
      format!("High-risk keyword detected: '{}'", kw),
    )
  })
}

pub fn severity(report: &Report, config: &FlagConfig) -> Option<TriggeredRule> {
  match report.severity {
    Severity::Critical => Some(triggered(
      RuleKind::CriticalSeverity,
      config.critical_severity_points,
      "Critical severity level",
    )),
    Severity::High => Some(triggered(
      RuleKind::HighSeverity,
      config.high_severity_points,
      "High severity level",
    )),
    Severity::Medium | Severity::Low => None,
  }
}

/// Volume signal from the caller-supplied trailing-window count (current report excluded).
pub fn department_pattern(
  report: &Report,
  recent_department_count: Option<u32>,
  config: &FlagConfig,
) -> Option<TriggeredRule> {
  let count = recent_department_count?;
  if count < config.pattern_min_reports {
    return None;
  }
  Some(triggered(
    RuleKind::DepartmentPattern,
    config.pattern_points,
    format!(
      "Multiple reports from {} in past {} days (Total: {})",
      report.department, config.pattern_window_days, count
    ),
  ))
}

pub fn missing_attachments(report: &Report, config: &FlagConfig) -> Option<TriggeredRule> {
  if report.severity.is_high_or_critical() && !report.has_attachments {
    Some(triggered(
      RuleKind::MissingAttachments,
      config.missing_attachments_points,
      "High/Critical severity report without attachments",
    ))
  } else {
    None
  }
}

pub fn vague_description(report: &Report, config: &FlagConfig) -> Option<TriggeredRule> {
  let chars = report.description.chars().count();
  if chars < config.vague_description_chars && report.severity.is_high_or_critical() {
    Some(triggered(
      RuleKind::VagueDescription,
      config.vague_description_points,
      format!(
        "Vague description (under {} characters) for high-severity report",
        config.vague_description_chars
      ),
    ))
  } else {
    None
  }
}

/// Run every rule in order and return the contributions that fired.
///
/// The high-risk keyword tier is skipped entirely once a critical keyword matched.
pub fn score_report(
  report: &Report,
  recent_department_count: Option<u32>,
  config: &FlagConfig,
) -> Vec<TriggeredRule> {
  let mut fired = Vec::new();

  match critical_keyword(report, config) {
    Some(rule) => fired.push(rule),
    None => fired.extend(high_risk_keyword(report, config)),
  }
  fired.extend(severity(report, config));
  fired.extend(department_pattern(report, recent_department_count, config));
  fired.extend(missing_attachments(report, config));
  fired.extend(vague_description(report, config));

  fired
}

/// Sum of points over fired rules.
pub fn total_points(fired: &[TriggeredRule]) -> u32 {
  fired.iter().map(|r| r.points).sum()
}

/// Pipe-joined reasons in firing order, or None when nothing fired.
pub fn join_reasons(fired: &[TriggeredRule]) -> Option<String> {
  if fired.is_empty() {
    return None;
  }
  Some(
    fired
      .iter()
      .map(|r| r.reason.as_str())
      .collect::<Vec<_>>()
      .join(" | "),
  )
}
