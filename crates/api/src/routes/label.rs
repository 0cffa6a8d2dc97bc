use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use dagboek_db::models::Label;
use dagboek_services::policy;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::{AdminUser, AuthUser},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateLabelRequest {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLabelRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LabelResponse {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub fn to_response(label: Label) -> LabelResponse {
    LabelResponse {
        id: super::id_hex(label.id),
        name: label.name,
        color: label.color,
        project: label.project.map(|p| p.to_hex()),
        created_at: super::rfc3339(label.created_at),
        updated_at: super::rfc3339(label.updated_at),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<LabelResponse>>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let labels = state.labels.find_for_project(id).await?;
    Ok(Json(labels.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    Json(body): Json<CreateLabelRequest>,
) -> Result<(StatusCode, Json<LabelResponse>), ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Label name is required".to_string()));
    }
    let label = state.labels.create(Some(id), body.name, body.color).await?;
    Ok((StatusCode::CREATED, Json(to_response(label))))
}

/// Project labels are edited in place. Universal labels require admin
/// and are first localized into every project whose tasks use them.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(label_id): Path<String>,
    Json(body): Json<UpdateLabelRequest>,
) -> Result<Json<LabelResponse>, ApiError> {
    let id = parse_object_id(&label_id, "label id")?;
    let label = state.labels.base.find_by_id(id).await?;

    match label.project {
        Some(project_id) => {
            let project = state.projects.base.find_by_id(project_id).await?;
            policy::ensure_member(&project, auth.user_id, auth.role)?;
        }
        None => {
            if !auth.is_admin() {
                return Err(ApiError::Forbidden("Admin access required".to_string()));
            }
            state.labels.localize_universal(&label).await?;
        }
    }

    let label = state.labels.update(id, body.name, body.color).await?;
    Ok(Json(to_response(label)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(label_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_object_id(&label_id, "label id")?;
    let label = state.labels.base.find_by_id(id).await?;

    match label.project {
        Some(project_id) => {
            let project = state.projects.base.find_by_id(project_id).await?;
            policy::ensure_member(&project, auth.user_id, auth.role)?;
            state.labels.delete_project_label(&label).await?;
        }
        None => {
            if !auth.is_admin() {
                return Err(ApiError::Forbidden("Admin access required".to_string()));
            }
            state.labels.localize_universal(&label).await?;
            state.labels.base.delete_by_id(id).await?;
        }
    }

    Ok(Json(serde_json::json!({ "message": "Label deleted" })))
}

pub async fn admin_list(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<LabelResponse>>, ApiError> {
    let labels = state.labels.find_universal().await?;
    Ok(Json(labels.into_iter().map(to_response).collect()))
}

pub async fn admin_create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(body): Json<CreateLabelRequest>,
) -> Result<(StatusCode, Json<LabelResponse>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Label name is required".to_string()));
    }
    let label = state.labels.create(None, body.name, body.color).await?;
    Ok((StatusCode::CREATED, Json(to_response(label))))
}

pub async fn admin_update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(label_id): Path<String>,
    Json(body): Json<UpdateLabelRequest>,
) -> Result<Json<LabelResponse>, ApiError> {
    let id = parse_object_id(&label_id, "label id")?;
    let label = state.labels.base.find_by_id(id).await?;
    if !label.is_universal() {
        return Err(ApiError::NotFound("Universal label not found".to_string()));
    }

    state.labels.localize_universal(&label).await?;
    let label = state.labels.update(id, body.name, body.color).await?;
    Ok(Json(to_response(label)))
}

pub async fn admin_delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(label_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_object_id(&label_id, "label id")?;
    let label = state.labels.base.find_by_id(id).await?;
    if !label.is_universal() {
        return Err(ApiError::NotFound("Universal label not found".to_string()));
    }

    state.labels.localize_universal(&label).await?;
    state.labels.base.delete_by_id(id).await?;
    Ok(Json(serde_json::json!({ "message": "Label deleted" })))
}
