//! HTTP handlers for the report service.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use flag_engine::InboundReport;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ServiceError;
use crate::ingest::{self, SubmittedReport};
use crate::metrics;
use crate::state::AppState;
use crate::store::{ActivityEntry, ActivityFilter, ReportFilter, ReportStatus, ReportStore, StoredReport};

const DEFAULT_ACTIVITY_LIMIT: u32 = 50;
const MAX_ACTIVITY_LIMIT: u32 = 500;

/// Success envelope shared by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
  pub success: bool,
  pub data: T,
}

impl<T> ApiResponse<T> {
  fn ok(data: T) -> Json<Self> {
    Json(Self { success: true, data })
  }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
  pub status: String,
  #[serde(default)]
  pub actor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportListQuery {
  pub department: Option<String>,
  pub status: Option<String>,
  pub flagged: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
  pub actor: Option<String>,
  pub action: Option<String>,
  /// RFC3339, inclusive.
  pub start: Option<String>,
  /// RFC3339, inclusive.
  pub end: Option<String>,
  pub search: Option<String>,
  pub limit: Option<u32>,
  pub offset: Option<u32>,
}

/// Activity envelope: one page plus paging metadata.
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
  pub success: bool,
  pub data: Vec<ActivityEntry>,
  pub total: u64,
  pub limit: u32,
  pub offset: u32,
}

type AppResult<T> = Result<Json<ApiResponse<T>>, ServiceError>;

fn parse_bound(field: &str, value: Option<String>) -> Result<Option<DateTime<Utc>>, ServiceError> {
  value
    .filter(|v| !v.trim().is_empty())
    .map(|v| {
      DateTime::parse_from_rfc3339(v.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ServiceError::validation(field, "expected an RFC3339 timestamp"))
    })
    .transpose()
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn origin(connect: Option<ConnectInfo<SocketAddr>>) -> Option<String> {
  connect.map(|ConnectInfo(addr)| addr.ip().to_string())
}

pub async fn health() -> Json<Value> {
  Json(json!({ "status": "ok" }))
}

pub async fn create_report<S: ReportStore>(
  State(state): State<Arc<AppState<S>>>,
  connect: Option<ConnectInfo<SocketAddr>>,
  Json(raw): Json<InboundReport>,
) -> Result<(StatusCode, Json<ApiResponse<SubmittedReport>>), ServiceError> {
  let submitted = ingest::submit_report(
    &state.store,
    &state.evaluator,
    &state.token_key,
    &raw,
    origin(connect),
    Utc::now(),
  )
  .await?;
  Ok((StatusCode::CREATED, ApiResponse::ok(submitted)))
}

pub async fn list_reports<S: ReportStore>(
  State(state): State<Arc<AppState<S>>>,
  Query(query): Query<ReportListQuery>,
) -> AppResult<Vec<StoredReport>> {
  let status = match non_empty(query.status) {
    Some(label) => Some(
      ReportStatus::from_label(&label)
        .ok_or_else(|| ServiceError::validation("status", "expected Pending|Under Review|Resolved"))?,
    ),
    None => None,
  };
  let filter = ReportFilter {
    department: non_empty(query.department),
    status,
    flagged: query.flagged,
  };
  let reports = state.store.list_reports(&filter).await?;
  Ok(ApiResponse::ok(reports))
}

pub async fn get_report<S: ReportStore>(
  State(state): State<Arc<AppState<S>>>,
  Path(id): Path<String>,
) -> AppResult<StoredReport> {
  match state.store.fetch_report(&id).await? {
    Some(report) => Ok(ApiResponse::ok(report)),
    None => Err(ServiceError::NotFound(format!("report {}", id))),
  }
}

pub async fn update_status<S: ReportStore>(
  State(state): State<Arc<AppState<S>>>,
  Path(id): Path<String>,
  connect: Option<ConnectInfo<SocketAddr>>,
  Json(update): Json<StatusUpdate>,
) -> AppResult<Value> {
  let status = ingest::change_status(
    &state.store,
    &id,
    &update.status,
    update.actor,
    origin(connect),
    Utc::now(),
  )
  .await?;
  Ok(ApiResponse::ok(json!({ "id": id, "status": status.label() })))
}

pub async fn department_metrics<S: ReportStore>(
  State(state): State<Arc<AppState<S>>>,
  Path(name): Path<String>,
) -> AppResult<wellness_engine::DepartmentMetricsSnapshot> {
  let snapshot = metrics::department_metrics(&state.store, &name, &state.wellness, Utc::now()).await?;
  Ok(ApiResponse::ok(snapshot))
}

pub async fn all_department_metrics<S: ReportStore>(
  State(state): State<Arc<AppState<S>>>,
) -> AppResult<Vec<wellness_engine::DepartmentMetricsSnapshot>> {
  let snapshots = metrics::all_department_metrics(&state.store, &state.wellness, Utc::now()).await?;
  Ok(ApiResponse::ok(snapshots))
}

pub async fn activity<S: ReportStore>(
  State(state): State<Arc<AppState<S>>>,
  Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityResponse>, ServiceError> {
  let filter = ActivityFilter {
    actor: non_empty(query.actor),
    action: non_empty(query.action),
    since: parse_bound("start", query.start)?,
    until: parse_bound("end", query.end)?,
    search: non_empty(query.search),
    limit: query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).clamp(1, MAX_ACTIVITY_LIMIT),
    offset: query.offset.unwrap_or(0),
  };
  let page = state.store.activity(&filter).await?;
  Ok(Json(ActivityResponse {
    success: true,
    data: page.entries,
    total: page.total,
    limit: filter.limit,
    offset: filter.offset,
  }))
}
