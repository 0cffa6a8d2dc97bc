use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ObjectId>,
    pub project: ObjectId,
    pub user: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Folder {
    pub const COLLECTION: &'static str = "folders";
}
