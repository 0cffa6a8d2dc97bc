use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use dagboek_db::models::Task;
use serde::Deserialize;

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
};

use super::task::{ChecklistItemResponse, load_task_checked};

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub text: Option<String>,
    pub done: Option<bool>,
}

fn checklist_response(task: &Task) -> Vec<ChecklistItemResponse> {
    task.checklist
        .iter()
        .map(|item| ChecklistItemResponse {
            id: item.id.to_hex(),
            text: item.text.clone(),
            done: item.done,
        })
        .collect()
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<String>,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<Vec<ChecklistItemResponse>>), ApiError> {
    let task = load_task_checked(&state, &auth, &task_id).await?;
    let id = task.id.ok_or_else(|| ApiError::Internal("Task without id".to_string()))?;

    if body.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Item text is required".to_string()));
    }

    let task = state.tasks.add_checklist_item(id, body.text).await?;
    Ok((StatusCode::CREATED, Json(checklist_response(&task))))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((task_id, item_id)): Path<(String, String)>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<Vec<ChecklistItemResponse>>, ApiError> {
    let task = load_task_checked(&state, &auth, &task_id).await?;
    let id = task.id.ok_or_else(|| ApiError::Internal("Task without id".to_string()))?;
    let item_id = parse_object_id(&item_id, "item id")?;

    let task = state
        .tasks
        .update_checklist_item(id, item_id, body.text, body.done)
        .await?;
    Ok(Json(checklist_response(&task)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((task_id, item_id)): Path<(String, String)>,
) -> Result<Json<Vec<ChecklistItemResponse>>, ApiError> {
    let task = load_task_checked(&state, &auth, &task_id).await?;
    let id = task.id.ok_or_else(|| ApiError::Internal("Task without id".to_string()))?;
    let item_id = parse_object_id(&item_id, "item id")?;

    let task = state.tasks.delete_checklist_item(id, item_id).await?;
    Ok(Json(checklist_response(&task)))
}
