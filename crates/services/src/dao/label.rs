use std::collections::HashMap;

use bson::{doc, oid::ObjectId, DateTime};
use dagboek_db::models::{Label, Project, Task};
use mongodb::Database;
use tracing::info;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct LabelDao {
    pub base: BaseDao<Label>,
    pub tasks: BaseDao<Task>,
    pub projects: BaseDao<Project>,
}

impl LabelDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Label::COLLECTION),
            tasks: BaseDao::new(db, Task::COLLECTION),
            projects: BaseDao::new(db, Project::COLLECTION),
        }
    }

    /// Project labels plus universal ones. `project: null` also matches
    /// documents without the field.
    pub async fn find_for_project(&self, project_id: ObjectId) -> DaoResult<Vec<Label>> {
        self.base
            .find_many(
                doc! { "$or": [ { "project": project_id }, { "project": null } ] },
                Some(doc! { "name": 1 }),
            )
            .await
    }

    pub async fn find_universal(&self) -> DaoResult<Vec<Label>> {
        self.base
            .find_many(doc! { "project": null }, Some(doc! { "name": 1 }))
            .await
    }

    pub async fn create(
        &self,
        project_id: Option<ObjectId>,
        name: String,
        color: String,
    ) -> DaoResult<Label> {
        let now = DateTime::now();
        let label = Label {
            id: None,
            name,
            color,
            project: project_id,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&label).await?;
        self.base.find_by_id(id).await
    }

    pub async fn update(
        &self,
        label_id: ObjectId,
        name: Option<String>,
        color: Option<String>,
    ) -> DaoResult<Label> {
        let mut set = bson::Document::new();
        if let Some(name) = name {
            set.insert("name", name);
        }
        if let Some(color) = color {
            set.insert("color", color);
        }
        if !set.is_empty() {
            let updated = self
                .base
                .update_one(doc! { "_id": label_id }, doc! { "$set": set })
                .await?;
            if !updated {
                return Err(DaoError::NotFound);
            }
        }
        self.base.find_by_id(label_id).await
    }

    /// Deletes a project-scoped label, detaching it from the project's
    /// tasks first.
    pub async fn delete_project_label(&self, label: &Label) -> DaoResult<()> {
        let label_id = label.id.ok_or(DaoError::NotFound)?;
        if let Some(project_id) = label.project {
            self.tasks
                .collection()
                .update_many(
                    doc! { "project": project_id },
                    doc! { "$pull": { "labels": label_id } },
                )
                .await?;
        }
        self.base.delete_by_id(label_id).await?;
        Ok(())
    }

    /// Replaces a universal label's usages with per-project copies.
    ///
    /// For every project whose tasks carry the label, a project-scoped copy
    /// of the label's current name and color is created and the tasks are
    /// repointed to it. Tasks whose project no longer resolves keep the
    /// universal label id. The label itself is left to the caller, so an
    /// update or delete that follows only touches the universal record.
    pub async fn localize_universal(&self, label: &Label) -> DaoResult<u64> {
        let label_id = label.id.ok_or(DaoError::NotFound)?;
        let tagged = self
            .tasks
            .find_many(doc! { "labels": label_id }, None)
            .await?;

        let mut by_project: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
        for task in &tagged {
            if let Some(task_id) = task.id {
                by_project.entry(task.project).or_default().push(task_id);
            }
        }

        let mut localized = 0u64;
        for (project_id, task_ids) in by_project {
            let project = self.projects.find_one(doc! { "_id": project_id }).await?;
            if project.is_none() {
                continue;
            }

            let copy = self
                .create(Some(project_id), label.name.clone(), label.color.clone())
                .await?;
            let copy_id = copy.id.ok_or(DaoError::NotFound)?;

            let filter = doc! { "_id": { "$in": &task_ids } };
            self.tasks
                .collection()
                .update_many(filter.clone(), doc! { "$pull": { "labels": label_id } })
                .await?;
            self.tasks
                .collection()
                .update_many(filter, doc! { "$addToSet": { "labels": copy_id } })
                .await?;
            localized += 1;
        }

        if localized > 0 {
            info!(label = %label.name, projects = localized, "Localized universal label");
        }
        Ok(localized)
    }
}
