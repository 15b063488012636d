//! Report flag evaluator: runs the rules, decides the flag, picks an assignee.

use tracing::{debug, warn};

use crate::assign;
use crate::config::FlagConfig;
use crate::error::EngineError;
use crate::rules;
use crate::types::*;

/// Side inputs fetched by the caller before evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagContext<'a> {
  /// Same-department reports in the trailing window, excluding the one being evaluated.
  /// None when the lookup failed; the pattern rule is then skipped.
  pub recent_department_count: Option<u32>,
  /// Accounts considered for senior-admin assignment.
  pub admins: &'a [AdminAccount],
}

/// Stateless evaluator over a fixed rule set.
pub struct FlagEvaluator {
  config: FlagConfig,
}

impl FlagEvaluator {
  pub fn new(config: FlagConfig) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(FlagConfig::default())
  }

  pub fn config(&self) -> &FlagConfig {
    &self.config
  }

  /// Score one report. Total over all inputs; never fails.
  pub fn evaluate(&self, report: &Report, ctx: FlagContext<'_>) -> FlagEvaluation {
    if ctx.recent_department_count.is_none() {
      warn!(
        report_id = %report.id,
        department = %report.department,
        "department count unavailable, skipping pattern rule"
      );
    }

    let triggered = rules::score_report(report, ctx.recent_department_count, &self.config);
    let flag_score = rules::total_points(&triggered);
    let flag_reason = rules::join_reasons(&triggered);

    // Assignment depends on severity alone, not on the flag outcome.
    let assign_to = if report.severity == Severity::Critical {
      let picked = assign::select_senior_admin(ctx.admins);
      if picked.is_none() {
        debug!(report_id = %report.id, "no admin account available for assignment");
      }
      picked
    } else {
      None
    };

    let auto_flagged = flag_score >= self.config.flag_threshold;
    debug!(
      report_id = %report.id,
      flag_score,
      auto_flagged,
      rules = triggered.len(),
      "report evaluated"
    );

    FlagEvaluation {
      auto_flagged,
      flag_score,
      flag_reason,
      assign_to,
      triggered,
    }
  }

  /// Evaluate and write the flag fields onto the report.
  pub fn flag(&self, report: &mut Report, ctx: FlagContext<'_>) -> Result<FlagEvaluation, EngineError> {
    let evaluation = self.evaluate(report, ctx);
    report.apply_flags(evaluation.clone())?;
    Ok(evaluation)
  }
}
