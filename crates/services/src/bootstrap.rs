use bson::{doc, DateTime, Document};
use dagboek_config::Settings;
use dagboek_db::models::{MemberRole, Project, ProjectMember, User, UserRole, UserStatus};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use tracing::{info, warn};

use crate::auth::AuthService;
use crate::dao::base::{BaseDao, DaoResult};

/// Startup chores: seed the admin account and run the data migrations the
/// schema has accumulated. Each step logs and swallows its own failures so
/// a bad legacy document cannot keep the server from booting.
///
/// The migrations read raw documents because the documents they repair
/// predate the current schema and would not deserialize.
pub async fn run(db: &Database, settings: &Settings, auth: &AuthService) {
    if let Err(err) = migrate_legacy_admin_role(db).await {
        warn!(%err, "Failed to migrate legacy admin roles");
    }
    if let Err(err) = backfill_usernames(db).await {
        warn!(%err, "Failed to backfill usernames");
    }
    if let Err(err) = seed_admin_user(db, settings, auth).await {
        warn!(%err, "Failed to seed admin user");
    }
    if let Err(err) = backfill_project_owners(db).await {
        warn!(%err, "Failed to backfill project owners");
    }
}

fn raw_users(db: &Database) -> Collection<Document> {
    db.collection::<Document>(User::COLLECTION)
}

/// Creates the configured admin account, or repairs its role if an earlier
/// deployment left it as a plain user.
async fn seed_admin_user(
    db: &Database,
    settings: &Settings,
    auth: &AuthService,
) -> DaoResult<()> {
    let admin = &settings.admin;
    let raw = raw_users(db);

    match raw.find_one(doc! { "email": &admin.email }).await? {
        Some(existing) => {
            if existing.get_str("role") != Ok("system_admin") {
                raw.update_one(
                    doc! { "email": &admin.email },
                    doc! { "$set": { "role": "system_admin", "updated_at": DateTime::now() } },
                )
                .await?;
                info!(email = %admin.email, "Admin user role repaired");
            }
        }
        None => {
            let password = match auth.hash_password(&admin.password) {
                Ok(hash) => hash,
                Err(err) => {
                    warn!(%err, "Failed to hash admin password");
                    return Ok(());
                }
            };
            let users: BaseDao<User> = BaseDao::new(db, User::COLLECTION);
            let now = DateTime::now();
            let user = User {
                id: None,
                name: admin.name.clone(),
                username: admin.username.clone(),
                email: admin.email.clone(),
                password: Some(password),
                role: UserRole::SystemAdmin,
                status: UserStatus::Approved,
                theme: "light".to_string(),
                created_at: now,
                updated_at: now,
            };
            users.insert_one(&user).await?;
            info!(email = %admin.email, "Default admin user created");
        }
    }
    Ok(())
}

async fn migrate_legacy_admin_role(db: &Database) -> DaoResult<()> {
    let result = raw_users(db)
        .update_many(
            doc! { "role": "admin" },
            doc! { "$set": { "role": "system_admin", "updated_at": DateTime::now() } },
        )
        .await?;
    if result.modified_count > 0 {
        info!(count = result.modified_count, "Migrated legacy admin roles");
    }
    Ok(())
}

/// Users predating usernames get one derived from their email local part,
/// suffixed with a counter until unique.
async fn backfill_usernames(db: &Database) -> DaoResult<()> {
    let raw = raw_users(db);
    let mut cursor = raw.find(doc! { "username": { "$exists": false } }).await?;

    while let Some(doc) = cursor.try_next().await? {
        let Ok(id) = doc.get_object_id("_id") else {
            continue;
        };
        let email = doc.get_str("email").unwrap_or_default();
        let base = email.split('@').next().unwrap_or("user").to_string();

        let mut candidate = base.clone();
        let mut counter = 1;
        while raw
            .find_one(doc! { "username": &candidate })
            .await?
            .is_some()
        {
            candidate = format!("{base}{counter}");
            counter += 1;
        }

        raw.update_one(
            doc! { "_id": id },
            doc! { "$set": { "username": &candidate, "updated_at": DateTime::now() } },
        )
        .await?;
        info!(%email, username = %candidate, "Backfilled username");
    }
    Ok(())
}

/// Projects created before the members array existed only carry the legacy
/// creator reference; give those creators an owner membership.
async fn backfill_project_owners(db: &Database) -> DaoResult<()> {
    let projects: BaseDao<Project> = BaseDao::new(db, Project::COLLECTION);
    let candidates = projects
        .find_many(doc! { "members.role": { "$ne": "owner" } }, None)
        .await?;

    let mut migrated = 0u64;
    for project in candidates {
        let has_owner = project.members.iter().any(|m| m.role == MemberRole::Owner);
        if has_owner {
            continue;
        }
        let (Some(project_id), Some(creator)) = (project.id, project.user) else {
            continue;
        };
        let member = bson::ser::to_bson(&ProjectMember {
            user: creator,
            role: MemberRole::Owner,
        })?;
        projects
            .update_one(
                doc! { "_id": project_id },
                doc! { "$push": { "members": member } },
            )
            .await?;
        migrated += 1;
    }
    if migrated > 0 {
        info!(migrated, "Backfilled project owner memberships");
    }
    Ok(())
}
