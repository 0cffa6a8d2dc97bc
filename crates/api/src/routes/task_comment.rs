use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::doc;
use dagboek_db::models::{Task, TaskAction};
use serde::Deserialize;

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
};

use super::task::{CommentResponse, load_task_checked};

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

fn comments_response(task: &Task) -> Vec<CommentResponse> {
    task.comments
        .iter()
        .map(|c| CommentResponse {
            id: c.id.to_hex(),
            user: c.user.to_hex(),
            text: c.text.clone(),
            created_at: super::rfc3339(c.created_at),
            updated_at: super::rfc3339(c.updated_at),
        })
        .collect()
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<String>,
    Json(body): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Vec<CommentResponse>>), ApiError> {
    let task = load_task_checked(&state, &auth, &task_id).await?;
    let id = task.id.ok_or_else(|| ApiError::Internal("Task without id".to_string()))?;

    if body.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Comment text is required".to_string()));
    }

    let task = state.tasks.add_comment(id, auth.user_id, body.text.clone()).await?;
    state
        .activities
        .log(
            id,
            auth.user_id,
            TaskAction::AddComment,
            Some(doc! { "text": body.text }.into()),
        )
        .await;

    Ok((StatusCode::CREATED, Json(comments_response(&task))))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((task_id, comment_id)): Path<(String, String)>,
    Json(body): Json<CommentRequest>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let task = load_task_checked(&state, &auth, &task_id).await?;
    let id = task.id.ok_or_else(|| ApiError::Internal("Task without id".to_string()))?;
    let comment_id = parse_object_id(&comment_id, "comment id")?;

    let comment = task
        .comments
        .iter()
        .find(|c| c.id == comment_id)
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    if comment.user != auth.user_id {
        return Err(ApiError::Forbidden(
            "You can only edit your own comments".to_string(),
        ));
    }
    if body.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Comment text is required".to_string()));
    }

    let task = state.tasks.update_comment(id, comment_id, body.text).await?;
    Ok(Json(comments_response(&task)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((task_id, comment_id)): Path<(String, String)>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let task = load_task_checked(&state, &auth, &task_id).await?;
    let id = task.id.ok_or_else(|| ApiError::Internal("Task without id".to_string()))?;
    let comment_id = parse_object_id(&comment_id, "comment id")?;

    let comment = task
        .comments
        .iter()
        .find(|c| c.id == comment_id)
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    if comment.user != auth.user_id {
        return Err(ApiError::Forbidden(
            "You can only delete your own comments".to_string(),
        ));
    }

    let task = state.tasks.delete_comment(id, comment_id).await?;
    Ok(Json(comments_response(&task)))
}
