use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::Document;
use dagboek_db::models::CodeSnippet;
use dagboek_services::policy;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateSnippetRequest {
    pub title: String,
    pub description: Option<String>,
    pub code: String,
    pub language: String,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSnippetRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct SnippetResponse {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub code: String,
    pub language: String,
    pub tags: Vec<String>,
    pub project: String,
    pub user: String,
    pub created_at: String,
    pub updated_at: String,
}

fn to_response(snippet: CodeSnippet) -> SnippetResponse {
    SnippetResponse {
        id: super::id_hex(snippet.id),
        title: snippet.title,
        description: snippet.description,
        code: snippet.code,
        language: snippet.language,
        tags: snippet.tags,
        project: snippet.project.to_hex(),
        user: snippet.user.to_hex(),
        created_at: super::rfc3339(snippet.created_at),
        updated_at: super::rfc3339(snippet.updated_at),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<SnippetResponse>>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let snippets = state.snippets.find_by_project(id).await?;
    Ok(Json(snippets.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    Json(body): Json<CreateSnippetRequest>,
) -> Result<(StatusCode, Json<SnippetResponse>), ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    if body.title.trim().is_empty() || body.code.is_empty() {
        return Err(ApiError::BadRequest(
            "Title and code are required".to_string(),
        ));
    }

    let now = bson::DateTime::now();
    let snippet = state
        .snippets
        .create(CodeSnippet {
            id: None,
            title: body.title,
            description: body.description,
            code: body.code,
            language: body.language,
            tags: body.tags.unwrap_or_default(),
            project: id,
            user: auth.user_id,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(to_response(snippet))))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, snippet_id)): Path<(String, String)>,
) -> Result<Json<SnippetResponse>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let snippet_id = parse_object_id(&snippet_id, "snippet id")?;
    let snippet = state.snippets.find_in_project(id, snippet_id).await?;
    Ok(Json(to_response(snippet)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, snippet_id)): Path<(String, String)>,
    Json(body): Json<UpdateSnippetRequest>,
) -> Result<Json<SnippetResponse>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;
    let snippet_id = parse_object_id(&snippet_id, "snippet id")?;

    let mut set = Document::new();
    if let Some(title) = body.title {
        set.insert("title", title);
    }
    if let Some(description) = body.description {
        set.insert("description", description);
    }
    if let Some(code) = body.code {
        set.insert("code", code);
    }
    if let Some(language) = body.language {
        set.insert("language", language);
    }
    if let Some(tags) = body.tags {
        set.insert("tags", tags);
    }

    if set.is_empty() {
        let snippet = state.snippets.find_in_project(id, snippet_id).await?;
        return Ok(Json(to_response(snippet)));
    }
    let snippet = state.snippets.update_fields(id, snippet_id, set).await?;
    Ok(Json(to_response(snippet)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, snippet_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;
    let snippet_id = parse_object_id(&snippet_id, "snippet id")?;

    if !state.snippets.delete_in_project(id, snippet_id).await? {
        return Err(ApiError::NotFound("Snippet not found".to_string()));
    }
    Ok(Json(serde_json::json!({ "message": "Snippet deleted" })))
}
