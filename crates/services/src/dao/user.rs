use bson::{doc, oid::ObjectId, DateTime};
use dagboek_db::models::{User, UserRole, UserStatus};
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        name: String,
        username: String,
        email: String,
        password_hash: String,
    ) -> DaoResult<User> {
        let now = DateTime::now();
        let user = User {
            id: None,
            name,
            username: username.trim().to_lowercase(),
            email: email.trim().to_lowercase(),
            password: Some(password_hash),
            role: UserRole::User,
            status: UserStatus::Pending,
            theme: "light".to_string(),
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<User>> {
        self.base
            .find_one(doc! { "email": email.trim().to_lowercase() })
            .await
    }

    pub async fn find_by_username(&self, username: &str) -> DaoResult<Option<User>> {
        self.base
            .find_one(doc! { "username": username.trim().to_lowercase() })
            .await
    }

    pub async fn find_all(&self) -> DaoResult<Vec<User>> {
        self.base
            .find_many(doc! {}, Some(doc! { "created_at": -1 }))
            .await
    }

    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> DaoResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_many(doc! { "_id": { "$in": ids } }, None)
            .await
    }

    pub async fn set_status(&self, id: ObjectId, status: UserStatus) -> DaoResult<bool> {
        self.base
            .update_by_id(id, doc! { "$set": { "status": bson::ser::to_bson(&status)? } })
            .await
    }

    pub async fn set_role(&self, id: ObjectId, role: UserRole) -> DaoResult<bool> {
        self.base
            .update_by_id(id, doc! { "$set": { "role": bson::ser::to_bson(&role)? } })
            .await
    }

    pub async fn set_password(&self, id: ObjectId, password_hash: &str) -> DaoResult<bool> {
        self.base
            .update_by_id(id, doc! { "$set": { "password": password_hash } })
            .await
    }
}
