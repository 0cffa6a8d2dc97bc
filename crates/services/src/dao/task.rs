use bson::{doc, oid::ObjectId, DateTime, Document};
use dagboek_db::models::{Attachment, ChecklistItem, List, Task, TaskComment, TaskPriority};
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct TaskDao {
    pub base: BaseDao<Task>,
    pub lists: BaseDao<List>,
}

impl TaskDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Task::COLLECTION),
            lists: BaseDao::new(db, List::COLLECTION),
        }
    }

    /// New tasks go to the end of their list.
    pub async fn create(&self, mut task: Task) -> DaoResult<Task> {
        let position = self.base.count(doc! { "list": task.list }).await?;
        task.position = position as i64;
        let id = self.base.insert_one(&task).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_list(&self, list_id: ObjectId) -> DaoResult<Vec<Task>> {
        self.base
            .find_many(doc! { "list": list_id }, Some(doc! { "position": 1 }))
            .await
    }

    pub async fn find_by_board(&self, board_id: ObjectId) -> DaoResult<Vec<Task>> {
        self.base
            .find_many(doc! { "board": board_id }, Some(doc! { "position": 1 }))
            .await
    }

    pub async fn find_by_project(&self, project_id: ObjectId) -> DaoResult<Vec<Task>> {
        self.base
            .find_many(doc! { "project": project_id }, Some(doc! { "created_at": -1 }))
            .await
    }

    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> DaoResult<Vec<Task>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base.find_many(doc! { "_id": { "$in": ids } }, None).await
    }

    pub async fn update_fields(&self, task_id: ObjectId, set: Document) -> DaoResult<Task> {
        let updated = self
            .base
            .update_one(doc! { "_id": task_id }, doc! { "$set": set })
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(task_id).await
    }

    /// Deletes the task and closes the gap in its list. Returns the
    /// deleted task so callers can log it.
    pub async fn delete_and_renumber(&self, task_id: ObjectId) -> DaoResult<Task> {
        let task = self.base.find_by_id(task_id).await?;
        self.base.delete_by_id(task_id).await?;
        let remaining = self.find_by_list(task.list).await?;
        self.write_positions(&remaining).await?;
        Ok(task)
    }

    /// Repositions a task inside its list or across lists. Positions past
    /// the end are clamped; moving a task onto its own slot writes nothing.
    ///
    /// Each sibling shift is an individual update, so a concurrent reader
    /// can observe an intermediate ordering.
    pub async fn move_task(
        &self,
        task_id: ObjectId,
        new_list_id: ObjectId,
        new_position: usize,
    ) -> DaoResult<Task> {
        let task = self.base.find_by_id(task_id).await?;

        if task.list == new_list_id {
            let mut tasks = self.find_by_list(task.list).await?;
            let from = tasks
                .iter()
                .position(|t| t.id == Some(task_id))
                .ok_or(DaoError::NotFound)?;
            let moved = tasks.remove(from);
            let at = new_position.min(tasks.len());
            tasks.insert(at, moved);
            self.write_positions(&tasks).await?;
        } else {
            let dest_list = self.lists.find_by_id(new_list_id).await?;

            let mut source = self.find_by_list(task.list).await?;
            source.retain(|t| t.id != Some(task_id));
            self.write_positions(&source).await?;

            let mut dest = self.find_by_list(new_list_id).await?;
            let at = new_position.min(dest.len());
            self.base
                .update_one(
                    doc! { "_id": task_id },
                    doc! { "$set": {
                        "list": new_list_id,
                        "board": dest_list.board,
                        "position": at as i64,
                    } },
                )
                .await?;
            dest.insert(at, task);
            for (index, t) in dest.iter().enumerate() {
                if t.id == Some(task_id) {
                    continue;
                }
                self.write_position(t, index as i64).await?;
            }
        }

        self.base.find_by_id(task_id).await
    }

    pub async fn set_completed(&self, task_id: ObjectId, completed: bool) -> DaoResult<Task> {
        let update = if completed {
            doc! { "$set": { "completed_at": DateTime::now() } }
        } else {
            doc! { "$unset": { "completed_at": "" } }
        };
        let updated = self.base.update_one(doc! { "_id": task_id }, update).await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(task_id).await
    }

    pub async fn set_priority(&self, task_id: ObjectId, priority: TaskPriority) -> DaoResult<Task> {
        let value = bson::ser::to_bson(&priority)?;
        self.update_fields(task_id, doc! { "priority": value }).await
    }

    /// Prepends the comment; the array stays newest first.
    pub async fn add_comment(
        &self,
        task_id: ObjectId,
        user_id: ObjectId,
        text: String,
    ) -> DaoResult<Task> {
        let now = DateTime::now();
        let comment = TaskComment {
            id: ObjectId::new(),
            user: user_id,
            text,
            created_at: now,
            updated_at: now,
        };
        let value = bson::ser::to_bson(&comment)?;
        let updated = self
            .base
            .update_one(
                doc! { "_id": task_id },
                doc! { "$push": { "comments": { "$each": [value], "$position": 0 } } },
            )
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(task_id).await
    }

    pub async fn update_comment(
        &self,
        task_id: ObjectId,
        comment_id: ObjectId,
        text: String,
    ) -> DaoResult<Task> {
        let updated = self
            .base
            .update_one(
                doc! { "_id": task_id, "comments._id": comment_id },
                doc! { "$set": {
                    "comments.$.text": text,
                    "comments.$.updated_at": DateTime::now(),
                } },
            )
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(task_id).await
    }

    pub async fn delete_comment(&self, task_id: ObjectId, comment_id: ObjectId) -> DaoResult<Task> {
        let updated = self
            .base
            .update_one(
                doc! { "_id": task_id },
                doc! { "$pull": { "comments": { "_id": comment_id } } },
            )
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(task_id).await
    }

    pub async fn add_checklist_item(&self, task_id: ObjectId, text: String) -> DaoResult<Task> {
        let item = ChecklistItem {
            id: ObjectId::new(),
            text,
            done: false,
        };
        let value = bson::ser::to_bson(&item)?;
        let updated = self
            .base
            .update_one(doc! { "_id": task_id }, doc! { "$push": { "checklist": value } })
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(task_id).await
    }

    pub async fn update_checklist_item(
        &self,
        task_id: ObjectId,
        item_id: ObjectId,
        text: Option<String>,
        done: Option<bool>,
    ) -> DaoResult<Task> {
        let mut set = Document::new();
        if let Some(text) = text {
            set.insert("checklist.$.text", text);
        }
        if let Some(done) = done {
            set.insert("checklist.$.done", done);
        }
        if set.is_empty() {
            return self.base.find_by_id(task_id).await;
        }
        let updated = self
            .base
            .update_one(
                doc! { "_id": task_id, "checklist._id": item_id },
                doc! { "$set": set },
            )
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(task_id).await
    }

    pub async fn delete_checklist_item(&self, task_id: ObjectId, item_id: ObjectId) -> DaoResult<Task> {
        let updated = self
            .base
            .update_one(
                doc! { "_id": task_id },
                doc! { "$pull": { "checklist": { "_id": item_id } } },
            )
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(task_id).await
    }

    pub async fn push_attachment(&self, task_id: ObjectId, attachment: &Attachment) -> DaoResult<Task> {
        let value = bson::ser::to_bson(attachment)?;
        let updated = self
            .base
            .update_one(doc! { "_id": task_id }, doc! { "$push": { "attachments": value } })
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(task_id).await
    }

    pub async fn pull_attachment(&self, task_id: ObjectId, attachment_id: ObjectId) -> DaoResult<Task> {
        let updated = self
            .base
            .update_one(
                doc! { "_id": task_id },
                doc! { "$pull": { "attachments": { "_id": attachment_id } } },
            )
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(task_id).await
    }

    async fn write_positions(&self, tasks: &[Task]) -> DaoResult<()> {
        for (index, task) in tasks.iter().enumerate() {
            self.write_position(task, index as i64).await?;
        }
        Ok(())
    }

    async fn write_position(&self, task: &Task, position: i64) -> DaoResult<()> {
        if task.position == position {
            return Ok(());
        }
        if let Some(id) = task.id {
            self.base
                .update_one(doc! { "_id": id }, doc! { "$set": { "position": position } })
                .await?;
        }
        Ok(())
    }
}
