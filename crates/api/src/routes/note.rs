use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use bson::{Document, oid::ObjectId};
use dagboek_db::models::Note;
use dagboek_services::{dao::NoteFolderFilter, policy};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
    uploads,
};

use super::task_attachment::read_upload_field;

#[derive(Debug, Deserialize)]
pub struct NoteQuery {
    pub search: Option<String>,
    pub folder: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub drawing: Option<serde_json::Value>,
    pub tags: Option<Vec<String>>,
    pub folder: Option<String>,
    pub is_pinned: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub drawing: Option<serde_json::Value>,
    pub tags: Option<Vec<String>>,
    /// Empty string unfiles the note.
    pub folder: Option<String>,
    pub is_pinned: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawing: Option<serde_json::Value>,
    pub tags: Vec<String>,
    pub is_pinned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    pub project: String,
    pub user: String,
    pub created_at: String,
    pub updated_at: String,
}

fn to_response(note: Note) -> NoteResponse {
    NoteResponse {
        id: super::id_hex(note.id),
        title: note.title,
        content: note.content,
        drawing: note
            .drawing
            .and_then(|d| serde_json::to_value(d).ok()),
        tags: note.tags,
        is_pinned: note.is_pinned,
        folder: note.folder.map(|f| f.to_hex()),
        project: note.project.to_hex(),
        user: note.user.to_hex(),
        created_at: super::rfc3339(note.created_at),
        updated_at: super::rfc3339(note.updated_at),
    }
}

fn drawing_doc(value: serde_json::Value) -> Result<Document, ApiError> {
    bson::to_document(&value).map_err(|_| ApiError::BadRequest("Invalid drawing".to_string()))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    Query(query): Query<NoteQuery>,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let folder = match query.folder.as_deref() {
        None | Some("") => NoteFolderFilter::All,
        Some("none") => NoteFolderFilter::Unfiled,
        Some(raw) => NoteFolderFilter::Folder(parse_object_id(raw, "folder id")?),
    };
    let notes = state.notes.search(id, query.search.as_deref(), folder).await?;
    Ok(Json(notes.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    Json(body): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse>), ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let folder = match body.folder.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_object_id(raw, "folder id")?),
    };
    let drawing = body.drawing.map(drawing_doc).transpose()?;
    let now = bson::DateTime::now();

    let note = state
        .notes
        .create(Note {
            id: None,
            title: body.title.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| "Untitled Note".to_string()),
            content: body.content.unwrap_or_default(),
            drawing,
            tags: body.tags.unwrap_or_default(),
            is_pinned: body.is_pinned.unwrap_or(false),
            folder,
            project: id,
            user: auth.user_id,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(to_response(note))))
}

async fn load_note_checked(
    state: &AppState,
    auth: &AuthUser,
    note_id: &str,
) -> Result<(ObjectId, Note), ApiError> {
    let id = parse_object_id(note_id, "note id")?;
    let note = state.notes.base.find_by_id(id).await?;
    let project = state.projects.base.find_by_id(note.project).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;
    Ok((id, note))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(note_id): Path<String>,
    Json(body): Json<UpdateNoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    let (id, note) = load_note_checked(&state, &auth, &note_id).await?;

    let mut set = Document::new();
    if let Some(title) = body.title {
        set.insert("title", title);
    }
    if let Some(content) = body.content {
        set.insert("content", content);
    }
    if let Some(drawing) = body.drawing {
        set.insert("drawing", drawing_doc(drawing)?);
    }
    if let Some(tags) = body.tags {
        set.insert("tags", tags);
    }
    if let Some(pinned) = body.is_pinned {
        set.insert("is_pinned", pinned);
    }
    match body.folder.as_deref() {
        Some("") => {
            set.insert("folder", bson::Bson::Null);
        }
        Some(raw) => {
            set.insert("folder", parse_object_id(raw, "folder id")?);
        }
        None => {}
    }

    if set.is_empty() {
        return Ok(Json(to_response(note)));
    }
    let note = state.notes.update_fields(id, set).await?;
    Ok(Json(to_response(note)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(note_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (id, _note) = load_note_checked(&state, &auth, &note_id).await?;
    state.notes.base.delete_by_id(id).await?;
    Ok(Json(serde_json::json!({ "message": "Note deleted" })))
}

/// Inline image upload for the note editor.
pub async fn upload_image(
    State(state): State<AppState>,
    _auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file = read_upload_field(&mut multipart, "image").await?;
    let saved = uploads::save_upload(
        &state.settings.uploads.dir,
        "notes",
        &file.name,
        &file.bytes,
    )
    .await?;
    Ok(Json(serde_json::json!({ "image_url": saved.url_path })))
}
