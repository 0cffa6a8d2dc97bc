use bson::{doc, oid::ObjectId, DateTime, Document};
use dagboek_db::models::CodeSnippet;
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct SnippetDao {
    pub base: BaseDao<CodeSnippet>,
}

impl SnippetDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, CodeSnippet::COLLECTION),
        }
    }

    pub async fn find_by_project(&self, project_id: ObjectId) -> DaoResult<Vec<CodeSnippet>> {
        self.base
            .find_many(doc! { "project": project_id }, Some(doc! { "created_at": -1 }))
            .await
    }

    /// Snippet routes are nested under the project, so lookups are scoped
    /// to both ids.
    pub async fn find_in_project(
        &self,
        project_id: ObjectId,
        snippet_id: ObjectId,
    ) -> DaoResult<CodeSnippet> {
        self.base
            .find_one(doc! { "_id": snippet_id, "project": project_id })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn create(&self, mut snippet: CodeSnippet) -> DaoResult<CodeSnippet> {
        let now = DateTime::now();
        snippet.created_at = now;
        snippet.updated_at = now;
        let id = self.base.insert_one(&snippet).await?;
        self.base.find_by_id(id).await
    }

    pub async fn update_fields(
        &self,
        project_id: ObjectId,
        snippet_id: ObjectId,
        set: Document,
    ) -> DaoResult<CodeSnippet> {
        let updated = self
            .base
            .update_one(
                doc! { "_id": snippet_id, "project": project_id },
                doc! { "$set": set },
            )
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(snippet_id).await
    }

    pub async fn delete_in_project(
        &self,
        project_id: ObjectId,
        snippet_id: ObjectId,
    ) -> DaoResult<bool> {
        let result = self
            .base
            .collection()
            .delete_one(doc! { "_id": snippet_id, "project": project_id })
            .await?;
        Ok(result.deleted_count > 0)
    }
}
