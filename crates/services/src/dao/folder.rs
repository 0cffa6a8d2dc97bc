use bson::{doc, oid::ObjectId, DateTime};
use dagboek_db::models::{Folder, Note};
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct FolderDao {
    pub base: BaseDao<Folder>,
    pub notes: BaseDao<Note>,
}

impl FolderDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Folder::COLLECTION),
            notes: BaseDao::new(db, Note::COLLECTION),
        }
    }

    pub async fn find_by_project(&self, project_id: ObjectId) -> DaoResult<Vec<Folder>> {
        self.base
            .find_many(doc! { "project": project_id }, Some(doc! { "name": 1 }))
            .await
    }

    pub async fn create(
        &self,
        project_id: ObjectId,
        user_id: ObjectId,
        name: String,
        parent: Option<ObjectId>,
    ) -> DaoResult<Folder> {
        let now = DateTime::now();
        let folder = Folder {
            id: None,
            name,
            parent,
            project: project_id,
            user: user_id,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&folder).await?;
        self.base.find_by_id(id).await
    }

    pub async fn update(
        &self,
        folder_id: ObjectId,
        name: Option<String>,
        parent: Option<Option<ObjectId>>,
    ) -> DaoResult<Folder> {
        let mut set = bson::Document::new();
        let mut unset = bson::Document::new();
        if let Some(name) = name {
            set.insert("name", name);
        }
        match parent {
            Some(Some(parent_id)) => {
                set.insert("parent", parent_id);
            }
            Some(None) => {
                unset.insert("parent", "");
            }
            None => {}
        }

        let mut update = doc! { "$set": set };
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }
        let updated = self.base.update_one(doc! { "_id": folder_id }, update).await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(folder_id).await
    }

    /// Deletes the folder. Its subfolders and notes move up to the deleted
    /// folder's parent, or become top-level/unfiled when there is none.
    pub async fn delete_reparent(&self, folder: &Folder) -> DaoResult<()> {
        let folder_id = folder.id.ok_or(DaoError::NotFound)?;

        let child_update = match folder.parent {
            Some(parent) => doc! { "$set": { "parent": parent } },
            None => doc! { "$unset": { "parent": "" } },
        };
        self.base
            .collection()
            .update_many(doc! { "parent": folder_id }, child_update)
            .await?;

        let note_update = match folder.parent {
            Some(parent) => doc! { "$set": { "folder": parent } },
            None => doc! { "$unset": { "folder": "" } },
        };
        self.notes
            .collection()
            .update_many(doc! { "folder": folder_id }, note_update)
            .await?;

        self.base.delete_by_id(folder_id).await?;
        Ok(())
    }
}
