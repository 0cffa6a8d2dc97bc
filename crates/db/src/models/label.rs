use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A label with no `project` is "universal" and visible in every project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Label {
    pub const COLLECTION: &'static str = "labels";

    pub fn is_universal(&self) -> bool {
        self.project.is_none()
    }
}
