//! Postgres-backed store (schema in `schema.sql`).

use chrono::{DateTime, Duration, Utc};
use flag_engine::{AdminAccount, FlagEvaluation, Report, ReportId};
use sqlx_core::query::query;
use sqlx_core::row::Row;
use sqlx_postgres::{PgPool, PgPoolOptions, PgRow};
use wellness_engine::DepartmentCounts;

use super::{
  ActivityEntry, ActivityFilter, ActivityPage, NewActivity, ReportFilter, ReportStatus, ReportStore, StoreError,
  StoredReport,
};

pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await?;
    Ok(Self::new(pool))
  }
}

fn count(row: &PgRow, column: &str) -> Result<u32, StoreError> {
  // SUM over zero rows is NULL.
  let value: Option<i64> = row.try_get(column)?;
  Ok(value.unwrap_or(0).max(0) as u32)
}

// Every clause is inert when its parameter is NULL.
const ACTIVITY_WHERE: &str = r#"
  WHERE ($1::text IS NULL OR actor = $1)
    AND ($2::text IS NULL OR action = $2)
    AND ($3::timestamptz IS NULL OR created_at >= $3)
    AND ($4::timestamptz IS NULL OR created_at <= $4)
    AND ($5::text IS NULL OR description ILIKE $5 OR action ILIKE $5)
"#;

/// `%term%` with LIKE metacharacters escaped (backslash is the default escape).
fn like_pattern(term: &str) -> String {
  let mut escaped = String::with_capacity(term.len() + 2);
  escaped.push('%');
  for c in term.chars() {
    if matches!(c, '\\' | '%' | '_') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped.push('%');
  escaped
}

fn activity_from_row(row: &PgRow) -> Result<ActivityEntry, StoreError> {
  Ok(ActivityEntry {
    id: row.try_get("id")?,
    actor: row.try_get("actor")?,
    action: row.try_get("action")?,
    description: row.try_get("description")?,
    origin: row.try_get("ip_address")?,
    created_at: row.try_get("created_at")?,
  })
}

fn report_from_row(row: &PgRow) -> Result<StoredReport, StoreError> {
  let flag_score: i32 = row.try_get("flag_score")?;
  Ok(StoredReport {
    id: row.try_get("report_id")?,
    title: row.try_get("title")?,
    report_type: row.try_get("report_type")?,
    department: row.try_get("department")?,
    severity: row.try_get("severity")?,
    status: row.try_get("status")?,
    description: row.try_get("description")?,
    location: row.try_get("location")?,
    incident_date: row.try_get("incident_date")?,
    is_anonymous: row.try_get("is_anonymous")?,
    submitted_by: row.try_get("submitted_by")?,
    submitted_at: row.try_get("created_at")?,
    updated_at: row.try_get("updated_at")?,
    has_attachments: row.try_get("has_attachments")?,
    auto_flagged: row.try_get("auto_flagged")?,
    flag_reason: row.try_get("flag_reason")?,
    flag_score: flag_score.max(0) as u32,
    assigned_to: row.try_get("assigned_to")?,
    assigned_name: row.try_get("assigned_name")?,
    flagged_at: row.try_get("flagged_at")?,
  })
}

impl ReportStore for PgStore {
  async fn insert_report(&self, report: &Report) -> Result<(), StoreError> {
    let row = StoredReport::from_report(report);
    let result = query(
      r#"
      INSERT INTO reports (report_id, title, report_type, department, severity, status, description,
        location, incident_date, is_anonymous, submitted_by, has_attachments, created_at, updated_at)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
      ON CONFLICT (report_id) DO NOTHING
      "#,
    )
    .bind(&row.id)
    .bind(&row.title)
    .bind(&row.report_type)
    .bind(&row.department)
    .bind(&row.severity)
    .bind(&row.status)
    .bind(&row.description)
    .bind(&row.location)
    .bind(&row.incident_date)
    .bind(row.is_anonymous)
    .bind(&row.submitted_by)
    .bind(row.has_attachments)
    .bind(row.submitted_at)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      return Err(StoreError::Conflict(row.id));
    }
    Ok(())
  }

  async fn count_department_reports_since(
    &self,
    department: &str,
    since: DateTime<Utc>,
    exclude: &ReportId,
  ) -> Result<u32, StoreError> {
    let row = query(
      "SELECT COUNT(*) AS total FROM reports WHERE department = $1 AND created_at >= $2 AND report_id <> $3",
    )
    .bind(department)
    .bind(since)
    .bind(&exclude.0)
    .fetch_one(&self.pool)
    .await?;
    let total: i64 = row.try_get("total")?;
    Ok(total.max(0) as u32)
  }

  async fn admin_accounts(&self) -> Result<Vec<AdminAccount>, StoreError> {
    let rows = query("SELECT id, full_name, role, created_at FROM users WHERE lower(trim(role)) = 'admin' ORDER BY created_at, id")
      .fetch_all(&self.pool)
      .await?;
    rows
      .iter()
      .map(|row| -> Result<AdminAccount, StoreError> {
        Ok(AdminAccount {
          id: row.try_get("id")?,
          name: row.try_get("full_name")?,
          role: row.try_get("role")?,
          created_at: row.try_get("created_at")?,
        })
      })
      .collect()
  }

  async fn save_flags(&self, id: &ReportId, evaluation: &FlagEvaluation, at: DateTime<Utc>) -> Result<(), StoreError> {
    let result = query(
      r#"
      UPDATE reports SET
        auto_flagged = $2,
        flag_score = $3,
        flag_reason = $4,
        assigned_to = COALESCE($5, assigned_to),
        assigned_name = COALESCE($6, assigned_name),
        flagged_at = $7
      WHERE report_id = $1 AND flagged_at IS NULL
      "#,
    )
    .bind(&id.0)
    .bind(evaluation.auto_flagged)
    .bind(evaluation.flag_score.min(i32::MAX as u32) as i32)
    .bind(&evaluation.flag_reason)
    .bind(evaluation.assign_to.as_ref().map(|a| a.id))
    .bind(evaluation.assign_to.as_ref().map(|a| a.name.clone()))
    .bind(at)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      return Err(StoreError::FlagsLocked(id.0.clone()));
    }
    Ok(())
  }

  async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<StoredReport>, StoreError> {
    let rows = query(
      r#"
      SELECT * FROM reports
      WHERE ($1::text IS NULL OR department = $1)
        AND ($2::text IS NULL OR status = $2)
        AND ($3::boolean IS NULL OR auto_flagged = $3)
      ORDER BY created_at DESC, report_id
      "#,
    )
    .bind(filter.department.clone())
    .bind(filter.status.map(|s| s.label()))
    .bind(filter.flagged)
    .fetch_all(&self.pool)
    .await?;
    rows.iter().map(report_from_row).collect()
  }

  async fn fetch_report(&self, id: &str) -> Result<Option<StoredReport>, StoreError> {
    let row = query("SELECT * FROM reports WHERE report_id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    row.as_ref().map(report_from_row).transpose()
  }

  async fn update_status(&self, id: &str, status: ReportStatus, at: DateTime<Utc>) -> Result<bool, StoreError> {
    let result = query("UPDATE reports SET status = $2, updated_at = $3 WHERE report_id = $1")
      .bind(id)
      .bind(status.label())
      .bind(at)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn department_names(&self) -> Result<Vec<String>, StoreError> {
    let rows = query(
      r#"
      SELECT department FROM users WHERE department IS NOT NULL
      UNION
      SELECT department FROM reports
      ORDER BY department
      "#,
    )
    .fetch_all(&self.pool)
    .await?;
    rows
      .iter()
      .map(|row| row.try_get::<String, _>("department").map_err(StoreError::from))
      .collect()
  }

  async fn department_counts(
    &self,
    department: &str,
    now: DateTime<Utc>,
    window_days: i64,
  ) -> Result<DepartmentCounts, StoreError> {
    let staff = query(
      r#"
      SELECT COUNT(*) AS employees, AVG(wellness_score)::float8 AS avg_wellness
      FROM users
      WHERE department = $1 AND status = 'Active'
      "#,
    )
    .bind(department)
    .fetch_one(&self.pool)
    .await?;

    let recent_start = now - Duration::days(window_days);
    let prior_start = recent_start - Duration::days(window_days);
    let reports = query(
      r#"
      SELECT
        COUNT(*) AS total,
        SUM(CASE WHEN status <> 'Resolved' THEN 1 ELSE 0 END) AS active,
        SUM(CASE WHEN status = 'Resolved' THEN 1 ELSE 0 END) AS resolved,
        SUM(CASE WHEN severity = 'Critical' THEN 1 ELSE 0 END) AS critical,
        SUM(CASE WHEN created_at >= $2 THEN 1 ELSE 0 END) AS recent,
        SUM(CASE WHEN created_at >= $3 AND created_at < $2 THEN 1 ELSE 0 END) AS prior,
        AVG(CASE WHEN status = 'Resolved'
          THEN GREATEST(FLOOR(EXTRACT(EPOCH FROM (updated_at - created_at)) / 3600), 0)
        END)::float8 AS avg_resolution_hours
      FROM reports
      WHERE department = $1
      "#,
    )
    .bind(department)
    .bind(recent_start)
    .bind(prior_start)
    .fetch_one(&self.pool)
    .await?;

    let employees: i64 = staff.try_get("employees")?;
    let total: i64 = reports.try_get("total")?;
    Ok(DepartmentCounts {
      employee_count: employees.max(0) as u32,
      avg_wellness: staff.try_get("avg_wellness")?,
      total_reports: total.max(0) as u32,
      active_reports: count(&reports, "active")?,
      resolved_reports: count(&reports, "resolved")?,
      critical_reports: count(&reports, "critical")?,
      recent_count: count(&reports, "recent")?,
      prior_count: count(&reports, "prior")?,
      avg_resolution_hours: reports.try_get("avg_resolution_hours")?,
    })
  }

  async fn append_activity(&self, entry: &NewActivity) -> Result<(), StoreError> {
    let record = ActivityEntry::from_new(entry);
    query(
      r#"
      INSERT INTO activity_log (id, actor, action, description, ip_address, created_at)
      VALUES ($1, $2, $3, $4, $5, $6)
      "#,
    )
    .bind(record.id)
    .bind(&record.actor)
    .bind(&record.action)
    .bind(&record.description)
    .bind(&record.origin)
    .bind(record.created_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn activity(&self, filter: &ActivityFilter) -> Result<ActivityPage, StoreError> {
    let search = filter.search.as_deref().map(like_pattern);

    let count_sql = format!("SELECT COUNT(*) AS total FROM activity_log {}", ACTIVITY_WHERE);
    let counted = query(&count_sql)
      .bind(filter.actor.clone())
      .bind(filter.action.clone())
      .bind(filter.since)
      .bind(filter.until)
      .bind(search.clone())
      .fetch_one(&self.pool)
      .await?;
    let total: i64 = counted.try_get("total")?;

    let page_sql = format!(
      "SELECT id, actor, action, description, ip_address, created_at FROM activity_log {} \
       ORDER BY created_at DESC LIMIT $6 OFFSET $7",
      ACTIVITY_WHERE
    );
    let rows = query(&page_sql)
      .bind(filter.actor.clone())
      .bind(filter.action.clone())
      .bind(filter.since)
      .bind(filter.until)
      .bind(search)
      .bind(i64::from(filter.limit))
      .bind(i64::from(filter.offset))
      .fetch_all(&self.pool)
      .await?;

    Ok(ActivityPage {
      entries: rows.iter().map(activity_from_row).collect::<Result<_, _>>()?,
      total: total.max(0) as u64,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn like_pattern_escapes_metacharacters() {
    assert_eq!(like_pattern("flag"), "%flag%");
    assert_eq!(like_pattern("100%_done\\"), "%100\\%\\_done\\\\%");
  }
}
