use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Users
    create_indexes(
        db,
        "users",
        vec![
            index_unique(bson::doc! { "email": 1 }),
            index_unique(bson::doc! { "username": 1 }),
        ],
    )
    .await?;

    // Projects
    create_indexes(
        db,
        "projects",
        vec![
            index(bson::doc! { "members.user": 1, "status": 1 }),
            index(bson::doc! { "user": 1, "status": 1 }),
        ],
    )
    .await?;

    // Boards
    create_indexes(db, "boards", vec![index(bson::doc! { "project": 1 })]).await?;

    // Lists
    create_indexes(
        db,
        "lists",
        vec![index(bson::doc! { "board": 1, "position": 1 })],
    )
    .await?;

    // Tasks
    create_indexes(
        db,
        "tasks",
        vec![
            index(bson::doc! { "list": 1, "position": 1 }),
            index(bson::doc! { "board": 1 }),
            index(bson::doc! { "project": 1, "completed_at": 1 }),
            index(bson::doc! { "labels": 1 }),
        ],
    )
    .await?;

    // Labels
    create_indexes(db, "labels", vec![index(bson::doc! { "project": 1 })]).await?;

    // Notes
    create_indexes(
        db,
        "notes",
        vec![
            index(bson::doc! { "project": 1, "is_pinned": -1, "updated_at": -1 }),
            index(bson::doc! { "folder": 1 }),
        ],
    )
    .await?;

    // Folders
    create_indexes(db, "folders", vec![index(bson::doc! { "project": 1 })]).await?;

    // Snippets
    create_indexes(db, "snippets", vec![index(bson::doc! { "project": 1 })]).await?;

    // Diagrams
    create_indexes(db, "diagrams", vec![index(bson::doc! { "project": 1 })]).await?;

    // Error Reports
    create_indexes(
        db,
        "error_reports",
        vec![index(bson::doc! { "project": 1, "created_at": -1 })],
    )
    .await?;

    // Change Log
    create_indexes(
        db,
        "change_log",
        vec![index(bson::doc! { "project": 1, "created_at": -1 })],
    )
    .await?;

    // Notifications
    create_indexes(
        db,
        "notifications",
        vec![index(
            bson::doc! { "recipient": 1, "status": 1, "created_at": -1 },
        )],
    )
    .await?;

    // Time Entries
    create_indexes(
        db,
        "time_entries",
        vec![
            index(bson::doc! { "project": 1, "date": -1 }),
            index(bson::doc! { "user": 1 }),
        ],
    )
    .await?;

    // Task Activities
    create_indexes(
        db,
        "task_activities",
        vec![index(bson::doc! { "task": 1, "created_at": -1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
