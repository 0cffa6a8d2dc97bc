use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::{DateTime, Document, doc, oid::ObjectId};
use dagboek_db::models::{Task, TaskPriority};
use dagboek_services::policy;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
};

use super::AttachmentResponse;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub list_id: String,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub labels: Option<Vec<String>>,
    pub assignees: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Empty string clears the due date.
    pub due_date: Option<String>,
    pub labels: Option<Vec<String>>,
    pub assignees: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct MoveTaskRequest {
    pub new_list_id: String,
    pub new_position: usize,
}

#[derive(Debug, Deserialize)]
pub struct CompleteTaskRequest {
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetPriorityRequest {
    pub priority: String,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub list: String,
    pub board: String,
    pub project: String,
    pub user: String,
    pub position: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub priority: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub checklist: Vec<ChecklistItemResponse>,
    pub comments: Vec<CommentResponse>,
    pub attachments: Vec<AttachmentResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct ChecklistItemResponse {
    pub id: String,
    pub text: String,
    pub done: bool,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub user: String,
    pub text: String,
    pub created_at: String,
    pub updated_at: String,
}

pub fn to_response(task: Task) -> TaskResponse {
    TaskResponse {
        id: super::id_hex(task.id),
        title: task.title,
        description: task.description,
        list: task.list.to_hex(),
        board: task.board.to_hex(),
        project: task.project.to_hex(),
        user: task.user.to_hex(),
        position: task.position,
        due_date: task.due_date.map(super::rfc3339),
        priority: super::enum_str(&task.priority),
        labels: task.labels.iter().map(|l| l.to_hex()).collect(),
        assignees: task.assignees.iter().map(|a| a.to_hex()).collect(),
        checklist: task
            .checklist
            .iter()
            .map(|item| ChecklistItemResponse {
                id: item.id.to_hex(),
                text: item.text.clone(),
                done: item.done,
            })
            .collect(),
        comments: task
            .comments
            .iter()
            .map(|c| CommentResponse {
                id: c.id.to_hex(),
                user: c.user.to_hex(),
                text: c.text.clone(),
                created_at: super::rfc3339(c.created_at),
                updated_at: super::rfc3339(c.updated_at),
            })
            .collect(),
        attachments: task.attachments.iter().map(super::attachment_response).collect(),
        completed_at: task.completed_at.map(super::rfc3339),
        created_at: super::rfc3339(task.created_at),
        updated_at: super::rfc3339(task.updated_at),
    }
}

/// Loads the task and checks project membership in one step.
pub(crate) async fn load_task_checked(
    state: &AppState,
    auth: &AuthUser,
    task_id: &str,
) -> Result<Task, ApiError> {
    let id = parse_object_id(task_id, "task id")?;
    let task = state.tasks.base.find_by_id(id).await?;
    let project = state.projects.base.find_by_id(task.project).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;
    Ok(task)
}

fn parse_date(raw: &str, what: &str) -> Result<DateTime, ApiError> {
    dagboek_services::report::parse_report_date(raw)
        .map(DateTime::from_chrono)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid {what}")))
}

fn parse_id_list(raw: Vec<String>, what: &str) -> Result<Vec<ObjectId>, ApiError> {
    raw.iter().map(|id| parse_object_id(id, what)).collect()
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Task title is required".to_string()));
    }
    let list_id = parse_object_id(&body.list_id, "list id")?;
    let list = state.lists.base.find_by_id(list_id).await?;
    let board = state.boards.base.find_by_id(list.board).await?;
    let project = state.projects.base.find_by_id(board.project).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let priority = match body.priority {
        Some(raw) => super::parse_enum::<TaskPriority>(&raw, "priority")?,
        None => TaskPriority::default(),
    };
    let due_date = match body.due_date.as_deref() {
        Some("") | None => None,
        Some(raw) => Some(parse_date(raw, "due date")?),
    };
    let labels = parse_id_list(body.labels.unwrap_or_default(), "label id")?;
    let assignees = parse_id_list(body.assignees.unwrap_or_default(), "assignee id")?;

    let now = DateTime::now();
    let task = state
        .tasks
        .create(Task {
            id: None,
            title: body.title,
            description: body.description.unwrap_or_default(),
            list: list_id,
            board: list.board,
            project: board.project,
            user: auth.user_id,
            position: 0,
            due_date,
            priority,
            labels,
            assignees,
            checklist: Vec::new(),
            comments: Vec::new(),
            attachments: Vec::new(),
            completed_at: None,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(to_response(task))))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = load_task_checked(&state, &auth, &task_id).await?;
    Ok(Json(to_response(task)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<String>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = load_task_checked(&state, &auth, &task_id).await?;
    let id = task.id.ok_or_else(|| ApiError::Internal("Task without id".to_string()))?;

    let mut set = Document::new();
    if let Some(title) = body.title {
        if title.trim().is_empty() {
            return Err(ApiError::BadRequest("Task title is required".to_string()));
        }
        set.insert("title", title);
    }
    if let Some(description) = body.description {
        set.insert("description", description);
    }
    match body.due_date.as_deref() {
        Some("") => {
            set.insert("due_date", bson::Bson::Null);
        }
        Some(raw) => {
            set.insert("due_date", parse_date(raw, "due date")?);
        }
        None => {}
    }
    if let Some(labels) = body.labels {
        set.insert("labels", parse_id_list(labels, "label id")?);
    }
    if let Some(assignees) = body.assignees {
        set.insert("assignees", parse_id_list(assignees, "assignee id")?);
    }

    if set.is_empty() {
        return Ok(Json(to_response(task)));
    }
    let task = state.tasks.update_fields(id, set).await?;
    Ok(Json(to_response(task)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let task = load_task_checked(&state, &auth, &task_id).await?;
    let id = task.id.ok_or_else(|| ApiError::Internal("Task without id".to_string()))?;
    state.tasks.delete_and_renumber(id).await?;
    Ok(Json(serde_json::json!({ "message": "Task deleted" })))
}

pub async fn move_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<String>,
    Json(body): Json<MoveTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = load_task_checked(&state, &auth, &task_id).await?;
    let id = task.id.ok_or_else(|| ApiError::Internal("Task without id".to_string()))?;
    let new_list_id = parse_object_id(&body.new_list_id, "list id")?;

    let task = state.tasks.move_task(id, new_list_id, body.new_position).await?;

    let list_name = state
        .lists
        .base
        .find_one(doc! { "_id": task.list })
        .await?
        .map(|l| l.name)
        .unwrap_or_default();
    state
        .change_log
        .log_change(
            task.project,
            auth.user_id,
            &format!("moved the task \"{}\" to {list_name}.", task.title),
            "task",
        )
        .await;

    Ok(Json(to_response(task)))
}

pub async fn complete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<String>,
    Json(body): Json<CompleteTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = load_task_checked(&state, &auth, &task_id).await?;
    let id = task.id.ok_or_else(|| ApiError::Internal("Task without id".to_string()))?;

    let task = state.tasks.set_completed(id, body.completed).await?;

    let verb = if body.completed { "completed" } else { "reopened" };
    state
        .change_log
        .log_change(
            task.project,
            auth.user_id,
            &format!("{verb} the task \"{}\".", task.title),
            "task",
        )
        .await;

    Ok(Json(to_response(task)))
}

pub async fn set_priority(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<String>,
    Json(body): Json<SetPriorityRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = load_task_checked(&state, &auth, &task_id).await?;
    let id = task.id.ok_or_else(|| ApiError::Internal("Task without id".to_string()))?;

    let priority = super::parse_enum::<TaskPriority>(&body.priority, "priority")?;
    let task = state.tasks.set_priority(id, priority).await?;
    Ok(Json(to_response(task)))
}
