use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use dagboek_db::models::{ChangeLogEntry, ChangeLogType, User};
use dagboek_services::policy;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ChangeLogMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChangeLogResponse {
    pub id: String,
    pub project: String,
    pub user: ChangeLogUser,
    pub message: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub include_in_report: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct ChangeLogUser {
    pub id: String,
    pub name: String,
    pub username: String,
}

fn to_response(entry: ChangeLogEntry, users: &HashMap<ObjectId, User>) -> ChangeLogResponse {
    let (name, username) = users
        .get(&entry.user)
        .map(|u| (u.name.clone(), u.username.clone()))
        .unwrap_or_default();
    ChangeLogResponse {
        id: super::id_hex(entry.id),
        project: entry.project.to_hex(),
        user: ChangeLogUser {
            id: entry.user.to_hex(),
            name,
            username,
        },
        message: entry.message,
        entry_type: super::enum_str(&entry.entry_type),
        category: entry.category,
        include_in_report: entry.include_in_report,
        created_at: super::rfc3339(entry.created_at),
        updated_at: super::rfc3339(entry.updated_at),
    }
}

async fn users_of(
    state: &AppState,
    entries: &[ChangeLogEntry],
) -> Result<HashMap<ObjectId, User>, ApiError> {
    let ids: Vec<ObjectId> = entries.iter().map(|e| e.user).collect();
    Ok(state
        .users
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .filter_map(|u| u.id.map(|id| (id, u)))
        .collect())
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<ChangeLogResponse>>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let entries = state.change_log.find_by_project(id).await?;
    let users = users_of(&state, &entries).await?;
    Ok(Json(
        entries.into_iter().map(|e| to_response(e, &users)).collect(),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    Json(body): Json<ChangeLogMessageRequest>,
) -> Result<(StatusCode, Json<ChangeLogResponse>), ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    if body.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message is required".to_string()));
    }
    let entry = state.change_log.create_manual(id, auth.user_id, body.message).await?;
    let users = users_of(&state, std::slice::from_ref(&entry)).await?;
    Ok((StatusCode::CREATED, Json(to_response(entry, &users))))
}

/// Only the author may touch an entry, and only manual ones.
async fn load_own_manual_entry(
    state: &AppState,
    auth: &AuthUser,
    entry_id: &str,
) -> Result<(ObjectId, ChangeLogEntry), ApiError> {
    let id = parse_object_id(entry_id, "changelog id")?;
    let entry = state.change_log.base.find_by_id(id).await?;
    if entry.user != auth.user_id {
        return Err(ApiError::Forbidden(
            "You can only edit your own changelog entries".to_string(),
        ));
    }
    if entry.entry_type != ChangeLogType::Manual {
        return Err(ApiError::BadRequest(
            "Automatic entries cannot be edited".to_string(),
        ));
    }
    Ok((id, entry))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<String>,
    Json(body): Json<ChangeLogMessageRequest>,
) -> Result<Json<ChangeLogResponse>, ApiError> {
    let (id, _entry) = load_own_manual_entry(&state, &auth, &entry_id).await?;

    if body.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message is required".to_string()));
    }
    let entry = state.change_log.update_message(id, body.message).await?;
    let users = users_of(&state, std::slice::from_ref(&entry)).await?;
    Ok(Json(to_response(entry, &users)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (id, _entry) = load_own_manual_entry(&state, &auth, &entry_id).await?;
    state.change_log.base.delete_by_id(id).await?;
    Ok(Json(serde_json::json!({ "message": "Changelog entry deleted" })))
}

pub async fn toggle_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<String>,
) -> Result<Json<ChangeLogResponse>, ApiError> {
    let id = parse_object_id(&entry_id, "changelog id")?;
    let entry = state.change_log.base.find_by_id(id).await?;
    let project = state.projects.base.find_by_id(entry.project).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let entry = state.change_log.toggle_report(id).await?;
    let users = users_of(&state, std::slice::from_ref(&entry)).await?;
    Ok(Json(to_response(entry, &users)))
}
