use bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default = "default_name")]
    pub name: String,
    /// Opaque graph payload from the diagram editor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Document>,
    pub project: ObjectId,
    pub user: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn default_name() -> String {
    "Untitled Diagram".to_string()
}

impl Diagram {
    pub const COLLECTION: &'static str = "diagrams";
}
