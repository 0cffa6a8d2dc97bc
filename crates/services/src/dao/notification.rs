use bson::{doc, oid::ObjectId, DateTime};
use dagboek_db::models::{Notification, NotificationStatus, NotificationType};
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct NotificationDao {
    pub base: BaseDao<Notification>,
}

impl NotificationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Notification::COLLECTION),
        }
    }

    pub async fn find_for_user(&self, user_id: ObjectId) -> DaoResult<Vec<Notification>> {
        self.base
            .find_many(doc! { "recipient": user_id }, Some(doc! { "created_at": -1 }))
            .await
    }

    /// An unread invitation for the same project counts as pending.
    pub async fn has_pending_invitation(
        &self,
        recipient: ObjectId,
        project_id: ObjectId,
    ) -> DaoResult<bool> {
        let type_value = bson::ser::to_bson(&NotificationType::ProjectInvitation)?;
        let status_value = bson::ser::to_bson(&NotificationStatus::Unread)?;
        let existing = self
            .base
            .find_one(doc! {
                "recipient": recipient,
                "project": project_id,
                "type": type_value,
                "status": status_value,
            })
            .await?;
        Ok(existing.is_some())
    }

    pub async fn create_invitation(
        &self,
        sender: ObjectId,
        recipient: ObjectId,
        project_id: ObjectId,
    ) -> DaoResult<Notification> {
        let now = DateTime::now();
        let notification = Notification {
            id: None,
            recipient,
            sender,
            notification_type: NotificationType::ProjectInvitation,
            project: Some(project_id),
            status: NotificationStatus::Unread,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&notification).await?;
        self.base.find_by_id(id).await
    }

    pub async fn mark_all_read(&self, user_id: ObjectId) -> DaoResult<u64> {
        let unread = bson::ser::to_bson(&NotificationStatus::Unread)?;
        let read = bson::ser::to_bson(&NotificationStatus::Read)?;
        let result = self
            .base
            .collection()
            .update_many(
                doc! { "recipient": user_id, "status": unread },
                doc! { "$set": { "status": read, "updated_at": DateTime::now() } },
            )
            .await?;
        Ok(result.modified_count)
    }

    pub async fn mark_read(&self, notification_id: ObjectId) -> DaoResult<()> {
        let read = bson::ser::to_bson(&NotificationStatus::Read)?;
        let updated = self
            .base
            .update_one(
                doc! { "_id": notification_id },
                doc! { "$set": { "status": read } },
            )
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }
}
