use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub board: ObjectId,
    pub position: i64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl List {
    pub const COLLECTION: &'static str = "lists";
}
