//! Report submission: persist first, then flag, then record activity.
//!
//! Once the report row is stored the submission succeeds; everything after that is advisory
//! and only logged when it fails.

use chrono::{DateTime, Duration, Utc};
use flag_engine::normalize::normalize;
use flag_engine::{AdminRef, FlagContext, FlagEvaluation, FlagEvaluator, InboundReport, Report, Severity, TokenKey};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::store::{NewActivity, ReportStatus, ReportStore};

/// Response body for a stored submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedReport {
  pub report_id: String,
  pub auto_flagged: bool,
  pub flag_score: u32,
  pub flag_reason: Option<String>,
  pub assigned_to: Option<AdminRef>,
}

pub async fn submit_report<S: ReportStore>(
  store: &S,
  evaluator: &FlagEvaluator,
  key: &TokenKey,
  raw: &InboundReport,
  origin: Option<String>,
  now: DateTime<Utc>,
) -> Result<SubmittedReport, ServiceError> {
  let mut report = normalize(raw, now, key)?;
  store.insert_report(&report).await?;
  info!(
    report_id = %report.id,
    department = %report.department,
    severity = report.severity.label(),
    "report stored"
  );

  let evaluation = flag_stored_report(store, evaluator, &mut report, now).await;

  let actor = report.submitter.identity().to_string();
  record_activity(
    store,
    NewActivity {
      actor: actor.clone(),
      action: "Report Submitted".into(),
      description: format!(
        "New {} report submitted - Department: {}",
        report.report_type, report.department
      ),
      origin: origin.clone(),
      at: now,
    },
  )
  .await;

  if let Some(eval) = &evaluation {
    if eval.auto_flagged {
      record_activity(
        store,
        NewActivity {
          actor: "system".into(),
          action: "Report Flagged".into(),
          description: format!("Report {} auto-flagged (score {})", report.id, eval.flag_score),
          origin: origin.clone(),
          at: now,
        },
      )
      .await;
    }
    if let Some(admin) = &eval.assign_to {
      record_activity(
        store,
        NewActivity {
          actor: "system".into(),
          action: "Report Assigned".into(),
          description: format!("Report {} assigned to {}", report.id, admin.name),
          origin,
          at: now,
        },
      )
      .await;
    }
  }

  Ok(match evaluation {
    Some(eval) => SubmittedReport {
      report_id: report.id.0,
      auto_flagged: eval.auto_flagged,
      flag_score: eval.flag_score,
      flag_reason: eval.flag_reason,
      assigned_to: eval.assign_to,
    },
    None => SubmittedReport {
      report_id: report.id.0,
      auto_flagged: false,
      flag_score: 0,
      flag_reason: None,
      assigned_to: None,
    },
  })
}

/// Fetch side inputs, evaluate, and write the flag fields. Never fails the submission.
async fn flag_stored_report<S: ReportStore>(
  store: &S,
  evaluator: &FlagEvaluator,
  report: &mut Report,
  now: DateTime<Utc>,
) -> Option<FlagEvaluation> {
  let since = now - Duration::days(evaluator.config().pattern_window_days);
  let recent_department_count = match store
    .count_department_reports_since(&report.department, since, &report.id)
    .await
  {
    Ok(n) => Some(n),
    Err(e) => {
      warn!(report_id = %report.id, error = %e, "department count lookup failed");
      None
    }
  };

  let admins = if report.severity == Severity::Critical {
    match store.admin_accounts().await {
      Ok(accounts) => accounts,
      Err(e) => {
        warn!(report_id = %report.id, error = %e, "admin lookup failed");
        Vec::new()
      }
    }
  } else {
    Vec::new()
  };

  let ctx = FlagContext {
    recent_department_count,
    admins: &admins,
  };
  let evaluation = match evaluator.flag(report, ctx) {
    Ok(eval) => eval,
    Err(e) => {
      warn!(report_id = %report.id, error = %e, "flag evaluation skipped");
      return None;
    }
  };

  if let Err(e) = store.save_flags(&report.id, &evaluation, now).await {
    warn!(report_id = %report.id, error = %e, "flag write failed");
  }
  Some(evaluation)
}

/// Change a report's status. Flags are not re-evaluated.
pub async fn change_status<S: ReportStore>(
  store: &S,
  id: &str,
  status: &str,
  actor: Option<String>,
  origin: Option<String>,
  now: DateTime<Utc>,
) -> Result<ReportStatus, ServiceError> {
  let status = ReportStatus::from_label(status)
    .ok_or_else(|| ServiceError::validation("status", "expected Pending|Under Review|Resolved"))?;

  if !store.update_status(id, status, now).await? {
    return Err(ServiceError::NotFound(format!("report {}", id)));
  }

  record_activity(
    store,
    NewActivity {
      actor: actor.unwrap_or_else(|| "system".into()),
      action: "Status Changed".into(),
      description: format!("Changed report {} status to {}", id, status.label()),
      origin,
      at: now,
    },
  )
  .await;
  Ok(status)
}

async fn record_activity<S: ReportStore>(store: &S, entry: NewActivity) {
  if let Err(e) = store.append_activity(&entry).await {
    warn!(action = %entry.action, error = %e, "activity write failed");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::{ActivityFilter, EmployeeRecord, MemoryStore};
  use chrono::TimeZone;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()
  }

  fn key() -> TokenKey {
    TokenKey::from_secret("ingest-tests")
  }

  fn inbound(title: &str, description: &str, severity: &str) -> InboundReport {
    InboundReport {
      title: title.into(),
      description: description.into(),
      report_type: "Safety".into(),
      severity: severity.into(),
      department: "Warehouse".into(),
      location: "Dock".into(),
      submitted_by: "EMP-000031".into(),
      is_anonymous: false,
      has_attachments: Some(false),
      submitted_at: None,
      incident_date: None,
    }
  }

  fn admin(id: i64, name: &str, year: i32) -> EmployeeRecord {
    EmployeeRecord {
      id,
      name: name.into(),
      role: "admin".into(),
      department: "HR".into(),
      status: "Active".into(),
      wellness_score: Some(80),
      created_at: Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap(),
    }
  }

  #[tokio::test]
  async fn submission_persists_flags_and_assignment() {
    let store = MemoryStore::new();
    store.add_employee(admin(8, "Late Admin", 2024)).unwrap();
    store.add_employee(admin(3, "First Admin", 2021)).unwrap();
    let evaluator = FlagEvaluator::with_defaults();

    for i in 0..4 {
      let raw = inbound(&format!("Earlier {}", i), &"x".repeat(120), "Low");
      let earlier = now() - Duration::days(1) - Duration::minutes(i);
      submit_report(&store, &evaluator, &key(), &raw, None, earlier).await.unwrap();
    }

    let raw = inbound("Incident", "Coworker made a threat today", "Critical");
    let submitted = submit_report(&store, &evaluator, &key(), &raw, Some("10.0.0.5".into()), now())
      .await
      .unwrap();

    assert_eq!(submitted.flag_score, 100);
    assert!(submitted.auto_flagged);
    assert_eq!(submitted.assigned_to.as_ref().unwrap().id, 3);

    let stored = store.fetch_report(&submitted.report_id).await.unwrap().unwrap();
    assert!(stored.auto_flagged);
    assert_eq!(stored.flag_score, 100);
    assert_eq!(stored.assigned_name.as_deref(), Some("First Admin"));
    assert_eq!(stored.flag_reason, submitted.flag_reason);

    let activity = store.activity(&ActivityFilter::default()).await.unwrap().entries;
    let actions: Vec<&str> = activity.iter().map(|a| a.action.as_str()).collect();
    assert!(actions.contains(&"Report Flagged"));
    assert!(actions.contains(&"Report Assigned"));
    assert!(activity.iter().any(|a| a.origin.as_deref() == Some("10.0.0.5")));
  }

  #[tokio::test]
  async fn degraded_store_still_accepts_submission() {
    let store = MemoryStore::new();
    store.set_degraded(true);
    let evaluator = FlagEvaluator::with_defaults();

    let raw = inbound("Incident", "Coworker made a threat today", "Critical");
    let submitted = submit_report(&store, &evaluator, &key(), &raw, None, now()).await.unwrap();

    // Pattern rule skipped, no admin found; keyword + severity + docs + vague still fire.
    assert_eq!(submitted.flag_score, 80);
    assert!(submitted.assigned_to.is_none());
    assert!(store.fetch_report(&submitted.report_id).await.unwrap().is_some());
  }

  #[tokio::test]
  async fn invalid_submission_is_not_stored() {
    let store = MemoryStore::new();
    let evaluator = FlagEvaluator::with_defaults();
    let raw = inbound("", "text", "Low");
    let err = submit_report(&store, &evaluator, &key(), &raw, None, now()).await.unwrap_err();
    assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    assert!(store.department_names().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn status_change_keeps_flags() {
    let store = MemoryStore::new();
    let evaluator = FlagEvaluator::with_defaults();
    let raw = inbound("Incident", "an assault in the yard", "High");
    let submitted = submit_report(&store, &evaluator, &key(), &raw, None, now()).await.unwrap();

    let later = now() + Duration::hours(5);
    let status = change_status(&store, &submitted.report_id, "resolved", Some("EMP-1".into()), None, later)
      .await
      .unwrap();
    assert_eq!(status, ReportStatus::Resolved);

    let stored = store.fetch_report(&submitted.report_id).await.unwrap().unwrap();
    assert_eq!(stored.status, "Resolved");
    assert_eq!(stored.updated_at, later);
    assert_eq!(stored.flag_score, submitted.flag_score);
  }

  #[tokio::test]
  async fn status_change_errors() {
    let store = MemoryStore::new();
    let err = change_status(&store, "REP-missing", "Resolved", None, None, now()).await.unwrap_err();
    assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);

    let err = change_status(&store, "REP-missing", "Closed", None, None, now()).await.unwrap_err();
    assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn mixed_case_admin_role_is_assigned() {
    let store = MemoryStore::new();
    let mut senior = admin(6, "Dana Reyes", 2020);
    senior.role = "Admin".into();
    store.add_employee(senior).unwrap();
    store.add_employee(admin(2, "Later Admin", 2023)).unwrap();
    let evaluator = FlagEvaluator::with_defaults();

    let raw = inbound("Incident", "Coworker made a threat today", "Critical");
    let submitted = submit_report(&store, &evaluator, &key(), &raw, None, now()).await.unwrap();
    assert_eq!(submitted.assigned_to.unwrap().id, 6);
  }

  #[tokio::test]
  async fn duplicate_submission_conflicts() {
    let store = MemoryStore::new();
    let evaluator = FlagEvaluator::with_defaults();
    let mut raw = inbound("Forklift", "Brakes fail on the ramp", "Medium");
    raw.submitted_at = Some("2025-01-15T09:00:00Z".into());

    submit_report(&store, &evaluator, &key(), &raw, None, now()).await.unwrap();
    let err = submit_report(&store, &evaluator, &key(), &raw, None, now()).await.unwrap_err();
    assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
  }
}
