use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Singleton document, auto-created on first read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default = "default_site_name")]
    pub site_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_logo: Option<String>,
    #[serde(default)]
    pub maintenance_mode: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn default_site_name() -> String {
    "Dagboek".to_string()
}

impl SiteSettings {
    pub const COLLECTION: &'static str = "site_settings";
}
