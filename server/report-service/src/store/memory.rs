//! In-memory store used by tests and local runs without a database.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use flag_engine::{AdminAccount, FlagEvaluation, Report, ReportId};
use wellness_engine::{resolution, trend, DepartmentCounts};

use super::{
  ActivityEntry, ActivityFilter, ActivityPage, NewActivity, ReportFilter, ReportStatus, ReportStore, StoreError,
  StoredReport,
};

/// Account row; only what metrics and admin selection read.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRecord {
  pub id: i64,
  pub name: String,
  pub role: String,
  pub department: String,
  pub status: String,
  pub wellness_score: Option<i32>,
  pub created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
  reports: Vec<StoredReport>,
  employees: Vec<EmployeeRecord>,
  activity: Vec<ActivityEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
  /// When set, every operation after report insertion fails as if the database went away.
  degraded: AtomicBool,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_employee(&self, employee: EmployeeRecord) -> Result<(), StoreError> {
    self.lock()?.employees.push(employee);
    Ok(())
  }

  pub fn set_degraded(&self, degraded: bool) {
    self.degraded.store(degraded, Ordering::SeqCst);
  }

  /// Insert a report row directly, bypassing the submission flow.
  pub fn seed_report(&self, report: StoredReport) -> Result<(), StoreError> {
    self.lock()?.reports.push(report);
    Ok(())
  }

  fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
    self
      .inner
      .lock()
      .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
  }

  fn check_available(&self) -> Result<(), StoreError> {
    if self.degraded.load(Ordering::SeqCst) {
      return Err(StoreError::Unavailable("store degraded".into()));
    }
    Ok(())
  }
}

impl ReportStore for MemoryStore {
  async fn insert_report(&self, report: &Report) -> Result<(), StoreError> {
    let mut inner = self.lock()?;
    if inner.reports.iter().any(|r| r.id == report.id.0) {
      return Err(StoreError::Conflict(report.id.0.clone()));
    }
    inner.reports.push(StoredReport::from_report(report));
    Ok(())
  }

  async fn count_department_reports_since(
    &self,
    department: &str,
    since: DateTime<Utc>,
    exclude: &ReportId,
  ) -> Result<u32, StoreError> {
    self.check_available()?;
    let inner = self.lock()?;
    let count = inner
      .reports
      .iter()
      .filter(|r| r.department == department && r.submitted_at >= since && r.id != exclude.0)
      .count();
    Ok(count as u32)
  }

  async fn admin_accounts(&self) -> Result<Vec<AdminAccount>, StoreError> {
    self.check_available()?;
    let inner = self.lock()?;
    Ok(
      inner
        .employees
        .iter()
        .map(|e| AdminAccount {
          id: e.id,
          name: e.name.clone(),
          role: e.role.clone(),
          created_at: e.created_at,
        })
        .filter(AdminAccount::is_admin)
        .collect(),
    )
  }

  async fn save_flags(&self, id: &ReportId, evaluation: &FlagEvaluation, at: DateTime<Utc>) -> Result<(), StoreError> {
    self.check_available()?;
    let mut inner = self.lock()?;
    let row = inner
      .reports
      .iter_mut()
      .find(|r| r.id == id.0 && r.flagged_at.is_none())
      .ok_or_else(|| StoreError::FlagsLocked(id.0.clone()))?;
    row.auto_flagged = evaluation.auto_flagged;
    row.flag_score = evaluation.flag_score;
    row.flag_reason = evaluation.flag_reason.clone();
    if let Some(admin) = &evaluation.assign_to {
      row.assigned_to = Some(admin.id);
      row.assigned_name = Some(admin.name.clone());
    }
    row.flagged_at = Some(at);
    Ok(())
  }

  async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<StoredReport>, StoreError> {
    let inner = self.lock()?;
    let mut rows: Vec<StoredReport> = inner.reports.iter().filter(|r| filter.matches(r)).cloned().collect();
    rows.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then_with(|| a.id.cmp(&b.id)));
    Ok(rows)
  }

  async fn fetch_report(&self, id: &str) -> Result<Option<StoredReport>, StoreError> {
    let inner = self.lock()?;
    Ok(inner.reports.iter().find(|r| r.id == id).cloned())
  }

  async fn update_status(&self, id: &str, status: ReportStatus, at: DateTime<Utc>) -> Result<bool, StoreError> {
    let mut inner = self.lock()?;
    match inner.reports.iter_mut().find(|r| r.id == id) {
      Some(row) => {
        row.status = status.label().to_string();
        row.updated_at = at;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn department_names(&self) -> Result<Vec<String>, StoreError> {
    let inner = self.lock()?;
    let names: BTreeSet<String> = inner
      .employees
      .iter()
      .map(|e| e.department.clone())
      .chain(inner.reports.iter().map(|r| r.department.clone()))
      .collect();
    Ok(names.into_iter().collect())
  }

  async fn department_counts(
    &self,
    department: &str,
    now: DateTime<Utc>,
    window_days: i64,
  ) -> Result<DepartmentCounts, StoreError> {
    let inner = self.lock()?;

    let active_staff: Vec<&EmployeeRecord> = inner
      .employees
      .iter()
      .filter(|e| e.department == department && e.status == "Active")
      .collect();
    let scores: Vec<f64> = active_staff
      .iter()
      .filter_map(|e| e.wellness_score.map(f64::from))
      .collect();
    let avg_wellness = if scores.is_empty() {
      None
    } else {
      Some(scores.iter().sum::<f64>() / scores.len() as f64)
    };

    let reports: Vec<&StoredReport> = inner.reports.iter().filter(|r| r.department == department).collect();
    let resolved_label = ReportStatus::Resolved.label();
    let resolved: Vec<&&StoredReport> = reports.iter().filter(|r| r.status == resolved_label).collect();
    let timings: Vec<(DateTime<Utc>, DateTime<Utc>)> =
      resolved.iter().map(|r| (r.submitted_at, r.updated_at)).collect();
    let submitted: Vec<DateTime<Utc>> = reports.iter().map(|r| r.submitted_at).collect();
    let (recent_count, prior_count) = trend::period_counts(&submitted, now, window_days);

    Ok(DepartmentCounts {
      employee_count: active_staff.len() as u32,
      avg_wellness,
      total_reports: reports.len() as u32,
      active_reports: (reports.len() - resolved.len()) as u32,
      resolved_reports: resolved.len() as u32,
      critical_reports: reports.iter().filter(|r| r.severity == "Critical").count() as u32,
      recent_count,
      prior_count,
      avg_resolution_hours: resolution::average_resolution_hours(&timings),
    })
  }

  async fn append_activity(&self, entry: &NewActivity) -> Result<(), StoreError> {
    self.check_available()?;
    self.lock()?.activity.push(ActivityEntry::from_new(entry));
    Ok(())
  }

  async fn activity(&self, filter: &ActivityFilter) -> Result<ActivityPage, StoreError> {
    let inner = self.lock()?;
    let mut entries: Vec<ActivityEntry> = inner.activity.iter().filter(|e| filter.matches(e)).cloned().collect();
    // Stable sort keeps insertion order for equal timestamps; reverse makes it newest first.
    entries.sort_by_key(|e| e.created_at);
    entries.reverse();
    let total = entries.len() as u64;
    let entries = entries
      .into_iter()
      .skip(filter.offset as usize)
      .take(filter.limit as usize)
      .collect();
    Ok(ActivityPage { entries, total })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use flag_engine::AdminRef;

  fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, day, 9, 0, 0).unwrap()
  }

  fn account(id: i64, role: &str) -> EmployeeRecord {
    EmployeeRecord {
      id,
      name: format!("Account {}", id),
      role: role.into(),
      department: "HR".into(),
      status: "Active".into(),
      wellness_score: None,
      created_at: at(1),
    }
  }

  fn row(id: &str, department: &str, day: u32) -> StoredReport {
    StoredReport {
      id: id.into(),
      title: "t".into(),
      report_type: "Safety".into(),
      department: department.into(),
      severity: "Low".into(),
      status: "Pending".into(),
      description: "d".into(),
      location: String::new(),
      incident_date: None,
      is_anonymous: false,
      submitted_by: "EMP-1".into(),
      submitted_at: at(day),
      updated_at: at(day),
      has_attachments: false,
      auto_flagged: false,
      flag_reason: None,
      flag_score: 0,
      assigned_to: None,
      assigned_name: None,
      flagged_at: None,
    }
  }

  fn evaluation(score: u32) -> FlagEvaluation {
    FlagEvaluation {
      auto_flagged: score >= 30,
      flag_score: score,
      flag_reason: Some("Critical severity level".into()),
      assign_to: Some(AdminRef {
        id: 4,
        name: "Account 4".into(),
      }),
      triggered: Vec::new(),
    }
  }

  #[tokio::test]
  async fn admin_roles_match_in_any_case() {
    let store = MemoryStore::new();
    for (id, role) in [(1, "Admin"), (2, "employee"), (3, "ADMIN"), (4, "admin"), (5, "administrator")] {
      store.add_employee(account(id, role)).unwrap();
    }
    let ids: Vec<i64> = store.admin_accounts().await.unwrap().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![1, 3, 4]);
  }

  #[tokio::test]
  async fn flags_are_written_once() {
    let store = MemoryStore::new();
    store.seed_report(row("REP-1", "HR", 2)).unwrap();
    let id = ReportId("REP-1".into());

    store.save_flags(&id, &evaluation(40), at(2)).await.unwrap();
    let err = store.save_flags(&id, &evaluation(5), at(3)).await.unwrap_err();
    assert!(matches!(err, StoreError::FlagsLocked(_)));

    let stored = store.fetch_report("REP-1").await.unwrap().unwrap();
    assert_eq!(stored.flag_score, 40);
    assert_eq!(stored.flagged_at, Some(at(2)));
    assert_eq!(stored.assigned_to, Some(4));
  }

  #[tokio::test]
  async fn report_list_is_newest_first_and_filtered() {
    let store = MemoryStore::new();
    store.seed_report(row("REP-a", "HR", 2)).unwrap();
    store.seed_report(row("REP-b", "Kitchen", 4)).unwrap();
    store.seed_report(row("REP-c", "HR", 3)).unwrap();

    let all = store.list_reports(&ReportFilter::default()).await.unwrap();
    let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["REP-b", "REP-c", "REP-a"]);

    let hr = ReportFilter {
      department: Some("HR".into()),
      ..ReportFilter::default()
    };
    assert_eq!(store.list_reports(&hr).await.unwrap().len(), 2);

    let flagged = ReportFilter {
      flagged: Some(true),
      ..ReportFilter::default()
    };
    assert!(store.list_reports(&flagged).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn activity_pages_report_the_full_total() {
    let store = MemoryStore::new();
    for hour in 0..5 {
      store
        .append_activity(&NewActivity {
          actor: "system".into(),
          action: "Report Flagged".into(),
          description: format!("entry {}", hour),
          origin: None,
          at: Utc.with_ymd_and_hms(2025, 5, 2, hour, 0, 0).unwrap(),
        })
        .await
        .unwrap();
    }

    let page = store
      .activity(&ActivityFilter {
        limit: 2,
        offset: 1,
        ..ActivityFilter::default()
      })
      .await
      .unwrap();
    assert_eq!(page.total, 5);
    let descriptions: Vec<&str> = page.entries.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(descriptions, vec!["entry 3", "entry 2"]);
  }
}
