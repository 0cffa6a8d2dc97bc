use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub project: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Board {
    pub const COLLECTION: &'static str = "boards";

    /// Lists created alongside every new board, in position order.
    pub const DEFAULT_LISTS: [&'static str; 4] = ["To-Do", "In Progress", "Done", "Optional"];
}
