use bson::{doc, oid::ObjectId, DateTime, Document};
use dagboek_db::models::TimeEntry;
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct TimeEntryDao {
    pub base: BaseDao<TimeEntry>,
}

impl TimeEntryDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, TimeEntry::COLLECTION),
        }
    }

    pub async fn find_by_project(&self, project_id: ObjectId) -> DaoResult<Vec<TimeEntry>> {
        self.base
            .find_many(doc! { "project": project_id }, Some(doc! { "date": -1 }))
            .await
    }

    pub async fn create(
        &self,
        project_id: ObjectId,
        user_id: ObjectId,
        task: Option<ObjectId>,
        date: DateTime,
        duration: i64,
        note: Option<String>,
    ) -> DaoResult<TimeEntry> {
        let now = DateTime::now();
        let entry = TimeEntry {
            id: None,
            user: user_id,
            project: project_id,
            task,
            date,
            duration,
            note,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&entry).await?;
        self.base.find_by_id(id).await
    }

    pub async fn update_fields(&self, entry_id: ObjectId, set: Document) -> DaoResult<TimeEntry> {
        let updated = self
            .base
            .update_one(doc! { "_id": entry_id }, doc! { "$set": set })
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(entry_id).await
    }
}
