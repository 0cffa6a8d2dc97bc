use bson::{oid::ObjectId, Bson, DateTime};
use dagboek_db::models::{TaskAction, TaskActivity};
use mongodb::Database;
use tracing::warn;

use super::base::BaseDao;

pub struct ActivityDao {
    pub base: BaseDao<TaskActivity>,
}

impl ActivityDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, TaskActivity::COLLECTION),
        }
    }

    /// Best-effort activity record; failures never surface to the caller.
    pub async fn log(
        &self,
        task_id: ObjectId,
        user_id: ObjectId,
        action: TaskAction,
        details: Option<Bson>,
    ) {
        let activity = TaskActivity {
            id: None,
            task: task_id,
            user: user_id,
            action,
            details,
            created_at: DateTime::now(),
        };
        if let Err(err) = self.base.insert_one(&activity).await {
            warn!(%err, %task_id, "Failed to record task activity");
        }
    }
}
