use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    pub project: ObjectId,
    /// Manual entries may not be linked to a task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<ObjectId>,
    pub date: DateTime,
    /// Minutes.
    pub duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl TimeEntry {
    pub const COLLECTION: &'static str = "time_entries";
}
