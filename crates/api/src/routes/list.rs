use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use dagboek_db::models::List;
use dagboek_services::policy;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
};

use super::board::load_board_checked;

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameListRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub ordered_list_ids: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub id: String,
    pub name: String,
    pub board: String,
    pub position: i64,
    pub created_at: String,
    pub updated_at: String,
}

pub fn to_response(list: List) -> ListResponse {
    ListResponse {
        id: super::id_hex(list.id),
        name: list.name,
        board: list.board.to_hex(),
        position: list.position,
        created_at: super::rfc3339(list.created_at),
        updated_at: super::rfc3339(list.updated_at),
    }
}

async fn load_list_checked(
    state: &AppState,
    auth: &AuthUser,
    list_id: &str,
) -> Result<List, ApiError> {
    let id = parse_object_id(list_id, "list id")?;
    let list = state.lists.base.find_by_id(id).await?;
    let board = state.boards.base.find_by_id(list.board).await?;
    let project = state.projects.base.find_by_id(board.project).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;
    Ok(list)
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<String>,
    Json(body): Json<CreateListRequest>,
) -> Result<(StatusCode, Json<ListResponse>), ApiError> {
    let board = load_board_checked(&state, &auth, &board_id).await?;
    let id = board.id.ok_or_else(|| ApiError::Internal("Board without id".to_string()))?;

    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("List name is required".to_string()));
    }
    let list = state.lists.create(id, body.name).await?;
    Ok((StatusCode::CREATED, Json(to_response(list))))
}

pub async fn reorder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<String>,
    Json(body): Json<ReorderRequest>,
) -> Result<Json<Vec<ListResponse>>, ApiError> {
    let board = load_board_checked(&state, &auth, &board_id).await?;
    let id = board.id.ok_or_else(|| ApiError::Internal("Board without id".to_string()))?;

    let raw = body.ordered_list_ids.as_array().ok_or_else(|| {
        ApiError::BadRequest("ordered_list_ids must be an array".to_string())
    })?;
    let ordered: Vec<_> = raw
        .iter()
        .map(|v| {
            v.as_str()
                .ok_or_else(|| ApiError::BadRequest("Invalid list id".to_string()))
                .and_then(|s| parse_object_id(s, "list id"))
        })
        .collect::<Result<_, _>>()?;

    let lists = state.lists.reorder(id, &ordered).await?;
    Ok(Json(lists.into_iter().map(to_response).collect()))
}

pub async fn rename(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<String>,
    Json(body): Json<RenameListRequest>,
) -> Result<Json<ListResponse>, ApiError> {
    let list = load_list_checked(&state, &auth, &list_id).await?;
    let id = list.id.ok_or_else(|| ApiError::Internal("List without id".to_string()))?;

    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("List name is required".to_string()));
    }
    let list = state.lists.rename(id, body.name).await?;
    Ok(Json(to_response(list)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let list = load_list_checked(&state, &auth, &list_id).await?;
    let id = list.id.ok_or_else(|| ApiError::Internal("List without id".to_string()))?;

    state.lists.delete_with_tasks(id).await?;
    Ok(Json(serde_json::json!({ "message": "List deleted" })))
}
