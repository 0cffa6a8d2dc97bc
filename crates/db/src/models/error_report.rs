use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::attachment::Attachment;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: ErrorSeverity,
    #[serde(default)]
    pub status: ErrorStatus,
    pub project: ObjectId,
    pub created_by: ObjectId,
    #[serde(default)]
    pub assigned_to: Vec<ObjectId>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum ErrorSeverity {
    Critical,
    High,
    #[default]
    Medium,
    Low,
    Trivial,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum ErrorStatus {
    #[default]
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Verified,
    Closed,
}

impl ErrorReport {
    pub const COLLECTION: &'static str = "error_reports";
}
