use bson::{doc, oid::ObjectId, DateTime};
use dagboek_db::models::{ChangeLogEntry, ChangeLogType};
use mongodb::Database;
use tracing::warn;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct ChangeLogDao {
    pub base: BaseDao<ChangeLogEntry>,
}

impl ChangeLogDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, ChangeLogEntry::COLLECTION),
        }
    }

    pub async fn find_by_project(&self, project_id: ObjectId) -> DaoResult<Vec<ChangeLogEntry>> {
        self.base
            .find_many(doc! { "project": project_id }, Some(doc! { "created_at": -1 }))
            .await
    }

    pub async fn create_manual(
        &self,
        project_id: ObjectId,
        user_id: ObjectId,
        message: String,
    ) -> DaoResult<ChangeLogEntry> {
        let now = DateTime::now();
        let entry = ChangeLogEntry {
            id: None,
            project: project_id,
            user: user_id,
            message,
            entry_type: ChangeLogType::Manual,
            category: None,
            include_in_report: true,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&entry).await?;
        self.base.find_by_id(id).await
    }

    /// Records an automatic entry as a side effect of some other change.
    /// Failures are logged and swallowed so the main operation never fails
    /// on changelog writes.
    pub async fn log_change(
        &self,
        project_id: ObjectId,
        user_id: ObjectId,
        message: &str,
        category: &str,
    ) {
        let now = DateTime::now();
        let entry = ChangeLogEntry {
            id: None,
            project: project_id,
            user: user_id,
            message: message.to_string(),
            entry_type: ChangeLogType::Automatic,
            category: Some(category.to_string()),
            include_in_report: true,
            created_at: now,
            updated_at: now,
        };
        if let Err(err) = self.base.insert_one(&entry).await {
            warn!(%err, %project_id, "Failed to record changelog entry");
        }
    }

    pub async fn update_message(&self, entry_id: ObjectId, message: String) -> DaoResult<ChangeLogEntry> {
        let updated = self
            .base
            .update_one(doc! { "_id": entry_id }, doc! { "$set": { "message": message } })
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(entry_id).await
    }

    pub async fn toggle_report(&self, entry_id: ObjectId) -> DaoResult<ChangeLogEntry> {
        let entry = self.base.find_by_id(entry_id).await?;
        self.base
            .update_one(
                doc! { "_id": entry_id },
                doc! { "$set": { "include_in_report": !entry.include_in_report } },
            )
            .await?;
        self.base.find_by_id(entry_id).await
    }

    /// Reportable entries inside a window, oldest first.
    pub async fn find_for_report(
        &self,
        project_id: ObjectId,
        start: Option<DateTime>,
        end: Option<DateTime>,
    ) -> DaoResult<Vec<ChangeLogEntry>> {
        let mut filter = doc! { "project": project_id, "include_in_report": true };
        let mut range = bson::Document::new();
        if let Some(start) = start {
            range.insert("$gte", start);
        }
        if let Some(end) = end {
            range.insert("$lte", end);
        }
        if !range.is_empty() {
            filter.insert("created_at", range);
        }
        self.base
            .find_many(filter, Some(doc! { "created_at": 1 }))
            .await
    }

    pub async fn find_recent_for_projects(
        &self,
        project_ids: &[ObjectId],
        limit: i64,
    ) -> DaoResult<Vec<ChangeLogEntry>> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut cursor = self
            .base
            .collection()
            .find(doc! { "project": { "$in": project_ids } })
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .await?;
        let mut entries = Vec::new();
        use futures::TryStreamExt;
        while let Some(entry) = cursor.try_next().await? {
            entries.push(entry);
        }
        Ok(entries)
    }
}
