use bson::{oid::ObjectId, Bson, DateTime};
use serde::{Deserialize, Serialize};

use super::attachment::Attachment;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub list: ObjectId,
    pub board: ObjectId,
    pub project: ObjectId,
    /// Creator.
    pub user: ObjectId,
    pub position: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub labels: Vec<ObjectId>,
    #[serde(default)]
    pub assignees: Vec<ObjectId>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    /// Newest first.
    #[serde(default)]
    pub comments: Vec<TaskComment>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskComment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user: ObjectId,
    pub text: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskActivity {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub task: ObjectId,
    pub user: ObjectId,
    pub action: TaskAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Bson>,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskAction {
    CreateTask,
    UpdateTitle,
    UpdateDescription,
    UpdatePriority,
    UpdateDueDate,
    AddAssignee,
    RemoveAssignee,
    AddLabel,
    RemoveLabel,
    MoveTask,
    CompleteTask,
    AddComment,
    DeleteTask,
}

impl Task {
    pub const COLLECTION: &'static str = "tasks";
}

impl TaskActivity {
    pub const COLLECTION: &'static str = "task_activities";
}
