use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::{doc, oid::ObjectId};
use dagboek_db::models::{Board, List};
use dagboek_services::policy;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
};

use super::task::TaskResponse;

#[derive(Debug, Deserialize)]
pub struct CreateBoardRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameBoardRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub id: String,
    pub name: String,
    pub project: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct BoardDetailResponse {
    pub id: String,
    pub name: String,
    pub project: String,
    pub lists: Vec<ListWithTasks>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct ListWithTasks {
    pub id: String,
    pub name: String,
    pub board: String,
    pub position: i64,
    pub tasks: Vec<TaskResponse>,
}

pub fn to_response(board: Board) -> BoardResponse {
    BoardResponse {
        id: super::id_hex(board.id),
        name: board.name,
        project: board.project.to_hex(),
        created_at: super::rfc3339(board.created_at),
        updated_at: super::rfc3339(board.updated_at),
    }
}

pub(crate) async fn load_board_checked(
    state: &AppState,
    auth: &AuthUser,
    board_id: &str,
) -> Result<Board, ApiError> {
    let id = parse_object_id(board_id, "board id")?;
    let board = state.boards.base.find_by_id(id).await?;
    let project = state.projects.base.find_by_id(board.project).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;
    Ok(board)
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<BoardResponse>>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let boards = state.boards.find_by_project(id).await?;
    Ok(Json(boards.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    Json(body): Json<CreateBoardRequest>,
) -> Result<(StatusCode, Json<BoardResponse>), ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Board name is required".to_string()));
    }

    let (board, _lists) = state.boards.create_with_defaults(id, body.name).await?;
    if let Some(board_id) = board.id {
        state.projects.push_board(id, board_id).await?;
    }
    state
        .change_log
        .log_change(
            id,
            auth.user_id,
            &format!("created the board \"{}\".", board.name),
            "board",
        )
        .await;

    Ok((StatusCode::CREATED, Json(to_response(board))))
}

/// Board with its lists and each list's tasks, both in position order.
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<String>,
) -> Result<Json<BoardDetailResponse>, ApiError> {
    let board = load_board_checked(&state, &auth, &board_id).await?;
    let id = board.id.ok_or_else(|| ApiError::Internal("Board without id".to_string()))?;

    let lists = state.lists.find_by_board(id).await?;
    let tasks = state.tasks.find_by_board(id).await?;

    let mut by_list: HashMap<ObjectId, Vec<TaskResponse>> = HashMap::new();
    for task in tasks {
        by_list
            .entry(task.list)
            .or_default()
            .push(super::task::to_response(task));
    }

    let lists = lists
        .into_iter()
        .map(|l: List| {
            let tasks = l.id.and_then(|lid| by_list.remove(&lid)).unwrap_or_default();
            ListWithTasks {
                id: super::id_hex(l.id),
                name: l.name,
                board: l.board.to_hex(),
                position: l.position,
                tasks,
            }
        })
        .collect();

    Ok(Json(BoardDetailResponse {
        id: id.to_hex(),
        name: board.name,
        project: board.project.to_hex(),
        lists,
        created_at: super::rfc3339(board.created_at),
        updated_at: super::rfc3339(board.updated_at),
    }))
}

pub async fn rename(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<String>,
    Json(body): Json<RenameBoardRequest>,
) -> Result<Json<BoardResponse>, ApiError> {
    let board = load_board_checked(&state, &auth, &board_id).await?;
    let id = board.id.ok_or_else(|| ApiError::Internal("Board without id".to_string()))?;

    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Board name is required".to_string()));
    }
    state
        .boards
        .base
        .update_one(doc! { "_id": id }, doc! { "$set": { "name": body.name } })
        .await?;

    let board = state.boards.base.find_by_id(id).await?;
    Ok(Json(to_response(board)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let board = load_board_checked(&state, &auth, &board_id).await?;
    let id = board.id.ok_or_else(|| ApiError::Internal("Board without id".to_string()))?;

    state.boards.delete_cascade(id).await?;
    state.projects.pull_board(board.project, id).await?;
    state
        .change_log
        .log_change(
            board.project,
            auth.user_id,
            &format!("deleted the board \"{}\".", board.name),
            "board",
        )
        .await;

    Ok(Json(serde_json::json!({ "message": "Board deleted" })))
}
