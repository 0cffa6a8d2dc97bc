use bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Opaque canvas payload from the drawing widget.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawing: Option<Document>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<ObjectId>,
    pub project: ObjectId,
    pub user: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn default_title() -> String {
    "Untitled Note".to_string()
}

impl Note {
    pub const COLLECTION: &'static str = "notes";
}
