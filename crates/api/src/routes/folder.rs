use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use dagboek_db::models::Folder;
use dagboek_services::policy;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    pub parent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    /// Empty string moves the folder to the top level.
    pub parent: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FolderResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub project: String,
    pub user: String,
    pub created_at: String,
    pub updated_at: String,
}

fn to_response(folder: Folder) -> FolderResponse {
    FolderResponse {
        id: super::id_hex(folder.id),
        name: folder.name,
        parent: folder.parent.map(|p| p.to_hex()),
        project: folder.project.to_hex(),
        user: folder.user.to_hex(),
        created_at: super::rfc3339(folder.created_at),
        updated_at: super::rfc3339(folder.updated_at),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<FolderResponse>>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let folders = state.folders.find_by_project(id).await?;
    Ok(Json(folders.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    Json(body): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<FolderResponse>), ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Folder name is required".to_string()));
    }
    let parent = match body.parent.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_object_id(raw, "folder id")?),
    };
    let folder = state.folders.create(id, auth.user_id, body.name, parent).await?;
    Ok((StatusCode::CREATED, Json(to_response(folder))))
}

async fn load_folder_checked(
    state: &AppState,
    auth: &AuthUser,
    folder_id: &str,
) -> Result<Folder, ApiError> {
    let id = parse_object_id(folder_id, "folder id")?;
    let folder = state.folders.base.find_by_id(id).await?;
    let project = state.projects.base.find_by_id(folder.project).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;
    Ok(folder)
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(folder_id): Path<String>,
    Json(body): Json<UpdateFolderRequest>,
) -> Result<Json<FolderResponse>, ApiError> {
    let folder = load_folder_checked(&state, &auth, &folder_id).await?;
    let id = folder.id.ok_or_else(|| ApiError::Internal("Folder without id".to_string()))?;

    let parent = match body.parent.as_deref() {
        None => None,
        Some("") => Some(None),
        Some(raw) => Some(Some(parse_object_id(raw, "folder id")?)),
    };
    let folder = state.folders.update(id, body.name, parent).await?;
    Ok(Json(to_response(folder)))
}

/// Children are reparented to the deleted folder's parent; its notes
/// move there too (or become unfiled at the top level).
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(folder_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folder = load_folder_checked(&state, &auth, &folder_id).await?;
    state.folders.delete_reparent(&folder).await?;
    Ok(Json(serde_json::json!({ "message": "Folder deleted" })))
}
