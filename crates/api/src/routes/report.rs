use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use dagboek_db::models::ChangeLogEntry;
use dagboek_services::{
    policy,
    report::{DashboardReport, ProgressReport, parse_report_date},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProgressReportResponse {
    pub tasks_created: u64,
    pub tasks_completed: u64,
    pub tasks_overdue: u64,
    pub tasks_in_progress: u64,
    pub member_stats: Vec<MemberStatsEntry>,
    pub pie_chart: PieChartEntry,
    pub bar_chart: Vec<DayCountEntry>,
    pub burndown: Vec<BurndownEntry>,
    pub changelog: Vec<ReportChangeLogEntry>,
}

#[derive(Debug, Serialize)]
pub struct MemberStatsEntry {
    pub user: String,
    pub name: String,
    pub tasks_assigned: u64,
    pub tasks_completed: u64,
}

#[derive(Debug, Serialize)]
pub struct PieChartEntry {
    pub done: u64,
    pub to_do: u64,
    pub in_progress: u64,
}

#[derive(Debug, Serialize)]
pub struct DayCountEntry {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct BurndownEntry {
    pub date: String,
    pub remaining: i64,
}

#[derive(Debug, Serialize)]
pub struct ReportChangeLogEntry {
    pub id: String,
    pub user: String,
    pub message: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub projects: u64,
    pub tasks_open: u64,
    pub tasks_completed: u64,
    pub tasks_overdue: u64,
    pub recent_changelog: Vec<ReportChangeLogEntry>,
}

fn changelog_entry(entry: ChangeLogEntry) -> ReportChangeLogEntry {
    ReportChangeLogEntry {
        id: super::id_hex(entry.id),
        user: entry.user.to_hex(),
        message: entry.message,
        entry_type: super::enum_str(&entry.entry_type),
        category: entry.category,
        created_at: super::rfc3339(entry.created_at),
    }
}

fn to_progress_response(report: ProgressReport) -> ProgressReportResponse {
    ProgressReportResponse {
        tasks_created: report.tasks_created,
        tasks_completed: report.tasks_completed,
        tasks_overdue: report.tasks_overdue,
        tasks_in_progress: report.tasks_in_progress,
        member_stats: report
            .member_stats
            .into_iter()
            .map(|m| MemberStatsEntry {
                user: m.user.to_hex(),
                name: m.name,
                tasks_assigned: m.tasks_assigned,
                tasks_completed: m.tasks_completed,
            })
            .collect(),
        pie_chart: PieChartEntry {
            done: report.pie_chart.done,
            to_do: report.pie_chart.to_do,
            in_progress: report.pie_chart.in_progress,
        },
        bar_chart: report
            .bar_chart
            .into_iter()
            .map(|d| DayCountEntry {
                date: d.date,
                count: d.count,
            })
            .collect(),
        burndown: report
            .burndown
            .into_iter()
            .map(|b| BurndownEntry {
                date: b.date,
                remaining: b.remaining,
            })
            .collect(),
        changelog: report.changelog.into_iter().map(changelog_entry).collect(),
    }
}

fn to_dashboard_response(report: DashboardReport) -> DashboardResponse {
    DashboardResponse {
        projects: report.projects,
        tasks_open: report.tasks_open,
        tasks_completed: report.tasks_completed,
        tasks_overdue: report.tasks_overdue,
        recent_changelog: report
            .recent_changelog
            .into_iter()
            .map(changelog_entry)
            .collect(),
    }
}

fn parse_query_date(raw: Option<&str>, what: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => parse_report_date(raw)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid {what}"))),
    }
}

pub async fn progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ProgressReportResponse>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let start = parse_query_date(query.start_date.as_deref(), "startDate")?;
    let end = parse_query_date(query.end_date.as_deref(), "endDate")?;

    let report = state.reports.progress_report(id, start, end).await?;
    Ok(Json(to_progress_response(report)))
}

pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let report = state.reports.dashboard(auth.user_id).await?;
    Ok(Json(to_dashboard_response(report)))
}
