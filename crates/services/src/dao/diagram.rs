use bson::{doc, oid::ObjectId, DateTime, Document};
use dagboek_db::models::Diagram;
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct DiagramDao {
    pub base: BaseDao<Diagram>,
}

impl DiagramDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Diagram::COLLECTION),
        }
    }

    pub async fn find_by_project(&self, project_id: ObjectId) -> DaoResult<Vec<Diagram>> {
        self.base
            .find_many(doc! { "project": project_id }, Some(doc! { "updated_at": -1 }))
            .await
    }

    pub async fn create(&self, mut diagram: Diagram) -> DaoResult<Diagram> {
        let now = DateTime::now();
        diagram.created_at = now;
        diagram.updated_at = now;
        let id = self.base.insert_one(&diagram).await?;
        self.base.find_by_id(id).await
    }

    pub async fn update_fields(&self, diagram_id: ObjectId, set: Document) -> DaoResult<Diagram> {
        let updated = self
            .base
            .update_one(doc! { "_id": diagram_id }, doc! { "$set": set })
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(diagram_id).await
    }
}
