use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use dagboek_db::models::Note;
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};

/// Folder constraint for note queries.
pub enum NoteFolderFilter {
    All,
    Unfiled,
    Folder(ObjectId),
}

pub struct NoteDao {
    pub base: BaseDao<Note>,
}

impl NoteDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Note::COLLECTION),
        }
    }

    /// Pinned notes first, then most recently updated. The search term is
    /// used as-is as a case-insensitive regex over title, content and tags.
    pub async fn search(
        &self,
        project_id: ObjectId,
        search: Option<&str>,
        folder: NoteFolderFilter,
    ) -> DaoResult<Vec<Note>> {
        let mut filter = doc! { "project": project_id };

        if let Some(term) = search {
            let regex = Bson::RegularExpression(bson::Regex {
                pattern: term.to_string(),
                options: "i".to_string(),
            });
            filter.insert(
                "$or",
                vec![
                    doc! { "title": regex.clone() },
                    doc! { "content": regex.clone() },
                    doc! { "tags": regex },
                ],
            );
        }

        match folder {
            NoteFolderFilter::All => {}
            NoteFolderFilter::Unfiled => {
                filter.insert("folder", Bson::Null);
            }
            NoteFolderFilter::Folder(folder_id) => {
                filter.insert("folder", folder_id);
            }
        }

        self.base
            .find_many(filter, Some(doc! { "is_pinned": -1, "updated_at": -1 }))
            .await
    }

    pub async fn create(&self, mut note: Note) -> DaoResult<Note> {
        let now = DateTime::now();
        note.created_at = now;
        note.updated_at = now;
        let id = self.base.insert_one(&note).await?;
        self.base.find_by_id(id).await
    }

    pub async fn update_fields(&self, note_id: ObjectId, set: Document) -> DaoResult<Note> {
        let updated = self
            .base
            .update_one(doc! { "_id": note_id }, doc! { "$set": set })
            .await?;
        if !updated {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(note_id).await
    }
}
