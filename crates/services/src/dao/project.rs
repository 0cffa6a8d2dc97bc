use bson::{doc, oid::ObjectId, DateTime};
use dagboek_db::models::{MemberRole, Project, ProjectMember, ProjectStatus};
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct ProjectDao {
    pub base: BaseDao<Project>,
}

impl ProjectDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Project::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        name: String,
        description: Option<String>,
        creator: ObjectId,
    ) -> DaoResult<Project> {
        let now = DateTime::now();
        let project = Project {
            id: None,
            name,
            description,
            status: ProjectStatus::Active,
            user: Some(creator),
            members: vec![ProjectMember {
                user: creator,
                role: MemberRole::Owner,
            }],
            boards: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&project).await?;
        self.base.find_by_id(id).await
    }

    /// Active projects where the user is a member or the legacy creator.
    pub async fn find_for_user(&self, user_id: ObjectId) -> DaoResult<Vec<Project>> {
        self.base
            .find_many(
                doc! {
                    "status": "active",
                    "$or": [
                        { "members.user": user_id },
                        { "user": user_id },
                    ],
                },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }

    pub async fn soft_delete(&self, id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(id, doc! { "$set": { "status": "deleted" } })
            .await
    }

    pub async fn add_member(
        &self,
        project_id: ObjectId,
        user_id: ObjectId,
        role: MemberRole,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                project_id,
                doc! {
                    "$push": {
                        "members": { "user": user_id, "role": bson::ser::to_bson(&role)? },
                    },
                },
            )
            .await
    }

    pub async fn remove_member(
        &self,
        project_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                project_id,
                doc! { "$pull": { "members": { "user": user_id } } },
            )
            .await
    }

    pub async fn set_member_role(
        &self,
        project_id: ObjectId,
        user_id: ObjectId,
        role: MemberRole,
    ) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": project_id, "members.user": user_id },
                doc! { "$set": { "members.$.role": bson::ser::to_bson(&role)? } },
            )
            .await
    }

    pub async fn push_board(&self, project_id: ObjectId, board_id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(project_id, doc! { "$push": { "boards": board_id } })
            .await
    }

    pub async fn pull_board(&self, project_id: ObjectId, board_id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(project_id, doc! { "$pull": { "boards": board_id } })
            .await
    }
}
