use bson::{doc, oid::ObjectId, DateTime};
use dagboek_db::models::{Board, List, Task};
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct BoardDao {
    pub base: BaseDao<Board>,
    pub lists: BaseDao<List>,
    pub tasks: BaseDao<Task>,
}

impl BoardDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Board::COLLECTION),
            lists: BaseDao::new(db, List::COLLECTION),
            tasks: BaseDao::new(db, Task::COLLECTION),
        }
    }

    /// Creates a board together with its default lists.
    pub async fn create_with_defaults(
        &self,
        project_id: ObjectId,
        name: String,
    ) -> DaoResult<(Board, Vec<List>)> {
        let now = DateTime::now();
        let board = Board {
            id: None,
            name,
            project: project_id,
            created_at: now,
            updated_at: now,
        };
        let board_id = self.base.insert_one(&board).await?;

        for (position, list_name) in Board::DEFAULT_LISTS.iter().enumerate() {
            let list = List {
                id: None,
                name: list_name.to_string(),
                board: board_id,
                position: position as i64,
                created_at: now,
                updated_at: now,
            };
            self.lists.insert_one(&list).await?;
        }

        let board = self.base.find_by_id(board_id).await?;
        let lists = self
            .lists
            .find_many(doc! { "board": board_id }, Some(doc! { "position": 1 }))
            .await?;
        Ok((board, lists))
    }

    pub async fn find_by_project(&self, project_id: ObjectId) -> DaoResult<Vec<Board>> {
        self.base
            .find_many(doc! { "project": project_id }, Some(doc! { "created_at": 1 }))
            .await
    }

    /// Deletes the board and everything under it.
    pub async fn delete_cascade(&self, board_id: ObjectId) -> DaoResult<()> {
        self.tasks.delete_many(doc! { "board": board_id }).await?;
        self.lists.delete_many(doc! { "board": board_id }).await?;
        self.base.delete_by_id(board_id).await?;
        Ok(())
    }
}
