use bson::{doc, DateTime};
use dagboek_db::models::SiteSettings;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct SiteSettingsDao {
    pub base: BaseDao<SiteSettings>,
}

impl SiteSettingsDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, SiteSettings::COLLECTION),
        }
    }

    /// There is a single settings document; the first read creates it.
    pub async fn get_or_create(&self) -> DaoResult<SiteSettings> {
        if let Some(settings) = self.base.find_one(doc! {}).await? {
            return Ok(settings);
        }
        let now = DateTime::now();
        let settings = SiteSettings {
            id: None,
            site_name: "Dagboek".to_string(),
            site_logo: None,
            maintenance_mode: false,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&settings).await?;
        self.base.find_by_id(id).await
    }

    pub async fn update(
        &self,
        site_name: Option<String>,
        maintenance_mode: Option<bool>,
    ) -> DaoResult<SiteSettings> {
        let current = self.get_or_create().await?;
        let mut set = bson::Document::new();
        if let Some(site_name) = site_name {
            set.insert("site_name", site_name);
        }
        if let Some(maintenance_mode) = maintenance_mode {
            set.insert("maintenance_mode", maintenance_mode);
        }
        if !set.is_empty() {
            self.base
                .update_one(doc! { "_id": current.id }, doc! { "$set": set })
                .await?;
        }
        self.get_or_create().await
    }

    pub async fn set_logo(&self, url_path: String) -> DaoResult<SiteSettings> {
        let current = self.get_or_create().await?;
        self.base
            .update_one(
                doc! { "_id": current.id },
                doc! { "$set": { "site_logo": url_path } },
            )
            .await?;
        self.get_or_create().await
    }
}
