use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// File attachment embedded in tasks and error reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Name of the file on disk (unique-prefixed).
    pub filename: String,
    pub original_name: String,
    /// Public path under /uploads, as served to clients.
    pub url_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    pub created_by: ObjectId,
    pub created_at: DateTime,
}
