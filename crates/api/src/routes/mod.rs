pub mod auth;
pub mod board;
pub mod change_log;
pub mod diagram;
pub mod error_report;
pub mod folder;
pub mod health;
pub mod label;
pub mod list;
pub mod member;
pub mod note;
pub mod notification;
pub mod project;
pub mod report;
pub mod settings;
pub mod snippet;
pub mod task;
pub mod task_attachment;
pub mod task_checklist;
pub mod task_comment;
pub mod time_entry;
pub mod user;

use bson::oid::ObjectId;
use dagboek_db::models::Attachment;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub url_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    pub created_by: String,
    pub created_at: String,
}

pub(crate) fn attachment_response(attachment: &Attachment) -> AttachmentResponse {
    AttachmentResponse {
        id: attachment.id.to_hex(),
        filename: attachment.filename.clone(),
        original_name: attachment.original_name.clone(),
        url_path: attachment.url_path.clone(),
        mime_type: attachment.mime_type.clone(),
        size: attachment.size,
        created_by: attachment.created_by.to_hex(),
        created_at: rfc3339(attachment.created_at),
    }
}

pub(crate) fn id_hex(id: Option<ObjectId>) -> String {
    id.map(|id| id.to_hex()).unwrap_or_default()
}

pub(crate) fn rfc3339(dt: bson::DateTime) -> String {
    dt.try_to_rfc3339_string().unwrap_or_default()
}

/// Serde is the single source of the wire names for model enums.
pub(crate) fn enum_str<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .unwrap_or_default()
}

pub(crate) fn parse_enum<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T, ApiError> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| ApiError::BadRequest(format!("Invalid {what}")))
}
