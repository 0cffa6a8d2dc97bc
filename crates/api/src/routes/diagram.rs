use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::Document;
use dagboek_db::models::Diagram;
use dagboek_services::policy;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateDiagramRequest {
    pub name: Option<String>,
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDiagramRequest {
    pub name: Option<String>,
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct DiagramResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub project: String,
    pub user: String,
    pub created_at: String,
    pub updated_at: String,
}

fn to_response(diagram: Diagram) -> DiagramResponse {
    DiagramResponse {
        id: super::id_hex(diagram.id),
        name: diagram.name,
        data: diagram.data.and_then(|d| serde_json::to_value(d).ok()),
        project: diagram.project.to_hex(),
        user: diagram.user.to_hex(),
        created_at: super::rfc3339(diagram.created_at),
        updated_at: super::rfc3339(diagram.updated_at),
    }
}

fn data_doc(value: serde_json::Value) -> Result<Document, ApiError> {
    bson::to_document(&value).map_err(|_| ApiError::BadRequest("Invalid diagram data".to_string()))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<DiagramResponse>>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let diagrams = state.diagrams.find_by_project(id).await?;
    Ok(Json(diagrams.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    Json(body): Json<CreateDiagramRequest>,
) -> Result<(StatusCode, Json<DiagramResponse>), ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let data = body.data.map(data_doc).transpose()?;
    let now = bson::DateTime::now();
    let diagram = state
        .diagrams
        .create(Diagram {
            id: None,
            name: body
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Untitled Diagram".to_string()),
            data,
            project: id,
            user: auth.user_id,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(to_response(diagram))))
}

async fn load_diagram_checked(
    state: &AppState,
    auth: &AuthUser,
    diagram_id: &str,
) -> Result<Diagram, ApiError> {
    let id = parse_object_id(diagram_id, "diagram id")?;
    let diagram = state.diagrams.base.find_by_id(id).await?;
    let project = state.projects.base.find_by_id(diagram.project).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;
    Ok(diagram)
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(diagram_id): Path<String>,
) -> Result<Json<DiagramResponse>, ApiError> {
    let diagram = load_diagram_checked(&state, &auth, &diagram_id).await?;
    Ok(Json(to_response(diagram)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(diagram_id): Path<String>,
    Json(body): Json<UpdateDiagramRequest>,
) -> Result<Json<DiagramResponse>, ApiError> {
    let diagram = load_diagram_checked(&state, &auth, &diagram_id).await?;
    let id = diagram.id.ok_or_else(|| ApiError::Internal("Diagram without id".to_string()))?;

    let mut set = Document::new();
    if let Some(name) = body.name {
        set.insert("name", name);
    }
    if let Some(data) = body.data {
        set.insert("data", data_doc(data)?);
    }

    if set.is_empty() {
        return Ok(Json(to_response(diagram)));
    }
    let diagram = state.diagrams.update_fields(id, set).await?;
    Ok(Json(to_response(diagram)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(diagram_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let diagram = load_diagram_checked(&state, &auth, &diagram_id).await?;
    let id = diagram.id.ok_or_else(|| ApiError::Internal("Diagram without id".to_string()))?;

    state.diagrams.base.delete_by_id(id).await?;
    Ok(Json(serde_json::json!({ "message": "Diagram deleted" })))
}
