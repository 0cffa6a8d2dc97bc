use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use bson::{DateTime, oid::ObjectId};
use dagboek_db::models::Attachment;

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
    uploads,
};

use super::{AttachmentResponse, task::load_task_checked};

pub(crate) struct UploadedFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Pulls the first field named `field_name` out of a multipart body.
pub(crate) async fn read_upload_field(
    multipart: &mut Multipart,
    field_name: &str,
) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let name = field
            .file_name()
            .map(|n| n.to_string())
            .unwrap_or_else(|| field_name.to_string());
        let mime_type = field.content_type().map(|c| c.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        return Ok(UploadedFile {
            name,
            mime_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::BadRequest(format!("No {field_name} uploaded")))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AttachmentResponse>), ApiError> {
    let task = load_task_checked(&state, &auth, &task_id).await?;
    let id = task.id.ok_or_else(|| ApiError::Internal("Task without id".to_string()))?;

    let file = read_upload_field(&mut multipart, "file").await?;
    let subdir = format!("projects/{}/{}", task.project.to_hex(), id.to_hex());
    let saved = uploads::save_upload(
        &state.settings.uploads.dir,
        &subdir,
        &file.name,
        &file.bytes,
    )
    .await?;

    let attachment = Attachment {
        id: ObjectId::new(),
        filename: saved.filename,
        original_name: file.name,
        url_path: saved.url_path,
        mime_type: file.mime_type,
        size: Some(file.bytes.len() as i64),
        created_by: auth.user_id,
        created_at: DateTime::now(),
    };
    state.tasks.push_attachment(id, &attachment).await?;

    Ok((StatusCode::CREATED, Json(super::attachment_response(&attachment))))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((task_id, attachment_id)): Path<(String, String)>,
) -> Result<Json<Vec<AttachmentResponse>>, ApiError> {
    let task = load_task_checked(&state, &auth, &task_id).await?;
    let id = task.id.ok_or_else(|| ApiError::Internal("Task without id".to_string()))?;
    let attachment_id = parse_object_id(&attachment_id, "attachment id")?;

    let attachment = task
        .attachments
        .iter()
        .find(|a| a.id == attachment_id)
        .ok_or_else(|| ApiError::NotFound("Attachment not found".to_string()))?;
    let url_path = attachment.url_path.clone();

    let task = state.tasks.pull_attachment(id, attachment_id).await?;
    uploads::remove_upload(&state.settings.uploads.dir, &url_path).await;

    Ok(Json(task.attachments.iter().map(super::attachment_response).collect()))
}
