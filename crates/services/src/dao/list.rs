use bson::{doc, oid::ObjectId, DateTime};
use dagboek_db::models::{List, Task};
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct ListDao {
    pub base: BaseDao<List>,
    pub tasks: BaseDao<Task>,
}

impl ListDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, List::COLLECTION),
            tasks: BaseDao::new(db, Task::COLLECTION),
        }
    }

    /// New lists go to the end of the board.
    pub async fn create(&self, board_id: ObjectId, name: String) -> DaoResult<List> {
        let position = self.base.count(doc! { "board": board_id }).await?;
        let now = DateTime::now();
        let list = List {
            id: None,
            name,
            board: board_id,
            position: position as i64,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&list).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_board(&self, board_id: ObjectId) -> DaoResult<Vec<List>> {
        self.base
            .find_many(doc! { "board": board_id }, Some(doc! { "position": 1 }))
            .await
    }

    pub async fn rename(&self, list_id: ObjectId, name: String) -> DaoResult<List> {
        let updated = self
            .base
            .update_one(doc! { "_id": list_id }, doc! { "$set": { "name": name } })
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(list_id).await
    }

    /// Rewrites list positions to match the given order. Lists the caller
    /// left out keep their stored position.
    pub async fn reorder(&self, board_id: ObjectId, ordered_ids: &[ObjectId]) -> DaoResult<Vec<List>> {
        let current = self.find_by_board(board_id).await?;
        for (index, list_id) in ordered_ids.iter().enumerate() {
            let position = index as i64;
            let unchanged = current
                .iter()
                .any(|l| l.id == Some(*list_id) && l.position == position);
            if unchanged {
                continue;
            }
            self.base
                .update_one(
                    doc! { "_id": list_id, "board": board_id },
                    doc! { "$set": { "position": position } },
                )
                .await?;
        }
        self.find_by_board(board_id).await
    }

    /// Removes the list and every task on it.
    pub async fn delete_with_tasks(&self, list_id: ObjectId) -> DaoResult<()> {
        self.tasks.delete_many(doc! { "list": list_id }).await?;
        self.base.delete_by_id(list_id).await?;
        Ok(())
    }
}
