use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::{DateTime, Document, oid::ObjectId};
use dagboek_db::models::TimeEntry;
use dagboek_services::policy;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateTimeEntryRequest {
    pub task: Option<String>,
    pub date: String,
    pub duration_minutes: i64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTimeEntryRequest {
    pub task: Option<String>,
    pub date: Option<String>,
    pub duration_minutes: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TimeEntryResponse {
    pub id: String,
    pub user: TimeEntryUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<TimeEntryTask>,
    pub project: String,
    pub date: String,
    pub duration_minutes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct TimeEntryUser {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TimeEntryTask {
    pub id: String,
    pub title: String,
}

fn to_response(
    entry: TimeEntry,
    user_names: &HashMap<ObjectId, String>,
    task_titles: &HashMap<ObjectId, String>,
) -> TimeEntryResponse {
    TimeEntryResponse {
        id: super::id_hex(entry.id),
        user: TimeEntryUser {
            id: entry.user.to_hex(),
            name: user_names.get(&entry.user).cloned().unwrap_or_default(),
        },
        task: entry.task.map(|t| TimeEntryTask {
            id: t.to_hex(),
            title: task_titles.get(&t).cloned().unwrap_or_default(),
        }),
        project: entry.project.to_hex(),
        date: super::rfc3339(entry.date),
        duration_minutes: entry.duration,
        note: entry.note,
        created_at: super::rfc3339(entry.created_at),
        updated_at: super::rfc3339(entry.updated_at),
    }
}

fn parse_date(raw: &str) -> Result<DateTime, ApiError> {
    dagboek_services::report::parse_report_date(raw)
        .map(DateTime::from_chrono)
        .ok_or_else(|| ApiError::BadRequest("Invalid date".to_string()))
}

async fn lookup_maps(
    state: &AppState,
    entries: &[TimeEntry],
) -> Result<(HashMap<ObjectId, String>, HashMap<ObjectId, String>), ApiError> {
    let user_ids: Vec<ObjectId> = entries.iter().map(|e| e.user).collect();
    let user_names = state
        .users
        .find_by_ids(&user_ids)
        .await?
        .into_iter()
        .filter_map(|u| u.id.map(|id| (id, u.name)))
        .collect();

    let task_ids: Vec<ObjectId> = entries.iter().filter_map(|e| e.task).collect();
    let task_titles = state
        .tasks
        .find_by_ids(&task_ids)
        .await?
        .into_iter()
        .filter_map(|t| t.id.map(|id| (id, t.title)))
        .collect();

    Ok((user_names, task_titles))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<TimeEntryResponse>>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let entries = state.time_entries.find_by_project(id).await?;
    let (user_names, task_titles) = lookup_maps(&state, &entries).await?;
    Ok(Json(
        entries
            .into_iter()
            .map(|e| to_response(e, &user_names, &task_titles))
            .collect(),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    Json(body): Json<CreateTimeEntryRequest>,
) -> Result<(StatusCode, Json<TimeEntryResponse>), ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    if body.duration_minutes <= 0 {
        return Err(ApiError::BadRequest(
            "Duration must be positive".to_string(),
        ));
    }
    let task = match body.task.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_object_id(raw, "task id")?),
    };
    let date = parse_date(&body.date)?;

    let entry = state
        .time_entries
        .create(id, auth.user_id, task, date, body.duration_minutes, body.note)
        .await?;
    let (user_names, task_titles) = lookup_maps(&state, std::slice::from_ref(&entry)).await?;
    Ok((
        StatusCode::CREATED,
        Json(to_response(entry, &user_names, &task_titles)),
    ))
}

async fn load_entry_owned(
    state: &AppState,
    auth: &AuthUser,
    entry_id: &str,
) -> Result<TimeEntry, ApiError> {
    let id = parse_object_id(entry_id, "time entry id")?;
    let entry = state.time_entries.base.find_by_id(id).await?;
    if entry.user != auth.user_id {
        return Err(ApiError::Forbidden(
            "You can only edit your own time entries".to_string(),
        ));
    }
    Ok(entry)
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<String>,
    Json(body): Json<UpdateTimeEntryRequest>,
) -> Result<Json<TimeEntryResponse>, ApiError> {
    let entry = load_entry_owned(&state, &auth, &entry_id).await?;
    let id = entry.id.ok_or_else(|| ApiError::Internal("Entry without id".to_string()))?;

    let mut set = Document::new();
    if let Some(date) = body.date.as_deref() {
        set.insert("date", parse_date(date)?);
    }
    if let Some(duration) = body.duration_minutes {
        if duration <= 0 {
            return Err(ApiError::BadRequest(
                "Duration must be positive".to_string(),
            ));
        }
        set.insert("duration", duration);
    }
    if let Some(note) = body.note {
        set.insert("note", note);
    }
    match body.task.as_deref() {
        Some("") => {
            set.insert("task", bson::Bson::Null);
        }
        Some(raw) => {
            set.insert("task", parse_object_id(raw, "task id")?);
        }
        None => {}
    }

    let entry = if set.is_empty() {
        entry
    } else {
        state.time_entries.update_fields(id, set).await?
    };
    let (user_names, task_titles) = lookup_maps(&state, std::slice::from_ref(&entry)).await?;
    Ok(Json(to_response(entry, &user_names, &task_titles)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entry = load_entry_owned(&state, &auth, &entry_id).await?;
    let id = entry.id.ok_or_else(|| ApiError::Internal("Entry without id".to_string()))?;

    state.time_entries.base.delete_by_id(id).await?;
    Ok(Json(serde_json::json!({ "message": "Time entry deleted" })))
}
