use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub project: ObjectId,
    pub user: ObjectId,
    pub message: String,
    #[serde(rename = "type", default)]
    pub entry_type: ChangeLogType,
    /// Set on automatic entries ("task", "board", "team", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "bool_true")]
    pub include_in_report: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeLogType {
    #[default]
    Manual,
    Automatic,
}

fn bool_true() -> bool {
    true
}

impl ChangeLogEntry {
    pub const COLLECTION: &'static str = "change_log";
}
