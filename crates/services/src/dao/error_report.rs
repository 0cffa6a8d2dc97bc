use bson::{doc, oid::ObjectId, DateTime, Document};
use dagboek_db::models::{Attachment, ErrorReport, ErrorSeverity, ErrorStatus};
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct ErrorReportDao {
    pub base: BaseDao<ErrorReport>,
}

impl ErrorReportDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, ErrorReport::COLLECTION),
        }
    }

    pub async fn find_by_project(&self, project_id: ObjectId) -> DaoResult<Vec<ErrorReport>> {
        self.base
            .find_many(doc! { "project": project_id }, Some(doc! { "created_at": -1 }))
            .await
    }

    pub async fn create(
        &self,
        project_id: ObjectId,
        created_by: ObjectId,
        title: String,
        description: String,
        severity: ErrorSeverity,
        assigned_to: Vec<ObjectId>,
    ) -> DaoResult<ErrorReport> {
        let now = DateTime::now();
        let report = ErrorReport {
            id: None,
            title,
            description,
            severity,
            status: ErrorStatus::New,
            project: project_id,
            created_by,
            assigned_to,
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&report).await?;
        self.base.find_by_id(id).await
    }

    pub async fn update_fields(&self, report_id: ObjectId, set: Document) -> DaoResult<ErrorReport> {
        let updated = self
            .base
            .update_one(doc! { "_id": report_id }, doc! { "$set": set })
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(report_id).await
    }

    pub async fn push_attachment(
        &self,
        report_id: ObjectId,
        attachment: &Attachment,
    ) -> DaoResult<ErrorReport> {
        let value = bson::ser::to_bson(attachment)?;
        let updated = self
            .base
            .update_one(doc! { "_id": report_id }, doc! { "$push": { "attachments": value } })
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(report_id).await
    }

    pub async fn pull_attachment(
        &self,
        report_id: ObjectId,
        attachment_id: ObjectId,
    ) -> DaoResult<ErrorReport> {
        let updated = self
            .base
            .update_one(
                doc! { "_id": report_id },
                doc! { "$pull": { "attachments": { "_id": attachment_id } } },
            )
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(report_id).await
    }
}
