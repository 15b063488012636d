//! Storage seam for reports, accounts and the activity trail.

mod memory;
mod postgres;

pub use memory::{EmployeeRecord, MemoryStore};
pub use postgres::PgStore;

use std::future::Future;

use chrono::{DateTime, Utc};
use flag_engine::{AdminAccount, FlagEvaluation, Report, ReportId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use wellness_engine::DepartmentCounts;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("database: {0}")]
  Database(#[from] sqlx_core::Error),

  #[error("conflict: {0} already exists")]
  Conflict(String),

  #[error("flags for report {0} are already written")]
  FlagsLocked(String),

  #[error("unavailable: {0}")]
  Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
  Pending,
  #[serde(rename = "Under Review")]
  UnderReview,
  Resolved,
}

impl ReportStatus {
  pub fn label(self) -> &'static str {
    match self {
      Self::Pending => "Pending",
      Self::UnderReview => "Under Review",
      Self::Resolved => "Resolved",
    }
  }

  pub fn from_label(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pending" => Some(Self::Pending),
      "under review" | "under_review" => Some(Self::UnderReview),
      "resolved" => Some(Self::Resolved),
      _ => None,
    }
  }
}

/// A report as stored, including its write-once flag fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredReport {
  pub id: String,
  pub title: String,
  #[serde(rename = "type")]
  pub report_type: String,
  pub department: String,
  pub severity: String,
  pub status: String,
  pub description: String,
  pub location: String,
  pub incident_date: Option<String>,
  pub is_anonymous: bool,
  pub submitted_by: String,
  pub submitted_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub has_attachments: bool,
  pub auto_flagged: bool,
  pub flag_reason: Option<String>,
  pub flag_score: u32,
  pub assigned_to: Option<i64>,
  pub assigned_name: Option<String>,
  /// Set by the one flag write a report ever gets.
  pub flagged_at: Option<DateTime<Utc>>,
}

impl StoredReport {
  /// Row for a freshly submitted report; flag fields start empty.
  pub fn from_report(report: &Report) -> Self {
    Self {
      id: report.id.0.clone(),
      title: report.title.clone(),
      report_type: report.report_type.clone(),
      department: report.department.clone(),
      severity: report.severity.label().to_string(),
      status: ReportStatus::Pending.label().to_string(),
      description: report.description.clone(),
      location: report.location.clone(),
      incident_date: report.incident_date.clone(),
      is_anonymous: report.submitter.is_anonymous(),
      submitted_by: report.submitter.identity().to_string(),
      submitted_at: report.submitted_at,
      updated_at: report.submitted_at,
      has_attachments: report.has_attachments,
      auto_flagged: false,
      flag_reason: None,
      flag_score: 0,
      assigned_to: None,
      assigned_name: None,
      flagged_at: None,
    }
  }
}

/// Optional narrowing for the report list; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
  pub department: Option<String>,
  pub status: Option<ReportStatus>,
  pub flagged: Option<bool>,
}

impl ReportFilter {
  pub fn matches(&self, report: &StoredReport) -> bool {
    self.department.as_ref().map_or(true, |d| report.department == *d)
      && self.status.map_or(true, |s| report.status == s.label())
      && self.flagged.map_or(true, |f| report.auto_flagged == f)
  }
}

/// Activity entry to append.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
  pub actor: String,
  pub action: String,
  pub description: String,
  pub origin: Option<String>,
  pub at: DateTime<Utc>,
}

/// Append-only audit record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
  pub id: Uuid,
  pub actor: String,
  pub action: String,
  pub description: String,
  pub origin: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Activity log query. `search` matches description or action, ignoring case.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityFilter {
  pub actor: Option<String>,
  pub action: Option<String>,
  pub since: Option<DateTime<Utc>>,
  pub until: Option<DateTime<Utc>>,
  pub search: Option<String>,
  pub limit: u32,
  pub offset: u32,
}

impl Default for ActivityFilter {
  fn default() -> Self {
    Self {
      actor: None,
      action: None,
      since: None,
      until: None,
      search: None,
      limit: 50,
      offset: 0,
    }
  }
}

impl ActivityFilter {
  pub fn matches(&self, entry: &ActivityEntry) -> bool {
    let search = self.search.as_ref().map(|s| s.to_lowercase());
    self.actor.as_ref().map_or(true, |a| entry.actor == *a)
      && self.action.as_ref().map_or(true, |a| entry.action == *a)
      && self.since.map_or(true, |t| entry.created_at >= t)
      && self.until.map_or(true, |t| entry.created_at <= t)
      && search.map_or(true, |needle| {
        entry.description.to_lowercase().contains(&needle) || entry.action.to_lowercase().contains(&needle)
      })
  }
}

/// One page of matching activity, newest first, plus the number of matches overall.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityPage {
  pub entries: Vec<ActivityEntry>,
  pub total: u64,
}

impl ActivityEntry {
  pub fn from_new(entry: &NewActivity) -> Self {
    Self {
      id: Uuid::new_v4(),
      actor: entry.actor.clone(),
      action: entry.action.clone(),
      description: entry.description.clone(),
      origin: entry.origin.clone(),
      created_at: entry.at,
    }
  }
}

/// Persistence operations the service needs. Implemented for Postgres and in memory.
pub trait ReportStore: Send + Sync + 'static {
  fn insert_report(&self, report: &Report) -> impl Future<Output = Result<(), StoreError>> + Send;

  /// Reports from `department` created at or after `since`, excluding `exclude`.
  fn count_department_reports_since(
    &self,
    department: &str,
    since: DateTime<Utc>,
    exclude: &ReportId,
  ) -> impl Future<Output = Result<u32, StoreError>> + Send;

  /// Accounts whose role is "admin" in any letter case.
  fn admin_accounts(&self) -> impl Future<Output = Result<Vec<AdminAccount>, StoreError>> + Send;

  /// Write the flag fields once. A second write fails with `StoreError::FlagsLocked`.
  fn save_flags(
    &self,
    id: &ReportId,
    evaluation: &FlagEvaluation,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), StoreError>> + Send;

  /// Newest first.
  fn list_reports(&self, filter: &ReportFilter) -> impl Future<Output = Result<Vec<StoredReport>, StoreError>> + Send;

  fn fetch_report(&self, id: &str) -> impl Future<Output = Result<Option<StoredReport>, StoreError>> + Send;

  /// Returns false when the report does not exist.
  fn update_status(
    &self,
    id: &str,
    status: ReportStatus,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, StoreError>> + Send;

  fn department_names(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

  /// Raw counts for one department; trend periods are `window_days` long and end at `now`.
  fn department_counts(
    &self,
    department: &str,
    now: DateTime<Utc>,
    window_days: i64,
  ) -> impl Future<Output = Result<DepartmentCounts, StoreError>> + Send;

  fn append_activity(&self, entry: &NewActivity) -> impl Future<Output = Result<(), StoreError>> + Send;

  fn activity(&self, filter: &ActivityFilter) -> impl Future<Output = Result<ActivityPage, StoreError>> + Send;
}
