use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::doc;
use dagboek_db::models::Project;
use dagboek_services::policy;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub members: Vec<MemberEntry>,
    pub boards: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct MemberEntry {
    pub user: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct TaskPickerEntry {
    pub id: String,
    pub title: String,
}

pub fn to_response(project: Project) -> ProjectResponse {
    ProjectResponse {
        id: super::id_hex(project.id),
        name: project.name,
        description: project.description,
        status: super::enum_str(&project.status),
        members: project
            .members
            .iter()
            .map(|m| MemberEntry {
                user: m.user.to_hex(),
                role: super::enum_str(&m.role),
            })
            .collect(),
        boards: project.boards.iter().map(|b| b.to_hex()).collect(),
        created_at: super::rfc3339(project.created_at),
        updated_at: super::rfc3339(project.updated_at),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let projects = state.projects.find_for_user(auth.user_id).await?;
    Ok(Json(projects.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Project name is required".to_string()));
    }
    let project = state
        .projects
        .create(body.name, body.description, auth.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(to_response(project))))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;
    Ok(Json(to_response(project)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    Json(body): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let mut set = bson::Document::new();
    if let Some(name) = body.name {
        set.insert("name", name);
    }
    if let Some(description) = body.description {
        set.insert("description", description);
    }
    if !set.is_empty() {
        state
            .projects
            .base
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
    }

    let project = state.projects.base.find_by_id(id).await?;
    Ok(Json(to_response(project)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    state.projects.soft_delete(id).await?;
    Ok(Json(serde_json::json!({ "message": "Project deleted" })))
}

/// Flat id/title listing across the project's boards, for pickers.
pub async fn tasks(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<TaskPickerEntry>>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let tasks = state.tasks.find_by_project(id).await?;
    Ok(Json(
        tasks
            .into_iter()
            .map(|t| TaskPickerEntry {
                id: super::id_hex(t.id),
                title: t.title,
            })
            .collect(),
    ))
}
