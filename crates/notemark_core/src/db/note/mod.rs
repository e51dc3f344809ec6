//! Note storage operations backed by redb.

mod helpers;

use crate::{db::tables::*, error::AppError, models::note::*};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

pub(crate) use self::helpers::reverse_timestamp_key;
use self::helpers::{apply_note_update, deserialize_content, deserialize_meta};

/// Accessor for note-related redb tables.
pub struct NoteDb {
    db: Arc<redb::Database>,
}

impl NoteDb {
    /// Initialize note tables if they do not exist yet.
    ///
    /// # Returns
    /// A new [`NoteDb`] accessor bound to `db`.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(NOTES_META)?;
        write_txn.open_table(NOTES_CONTENT)?;
        write_txn.open_table(NOTES_BY_SLUG)?;
        write_txn.open_table(NOTES_BY_PUBLISHED)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a note's metadata, body, slug index, and recency index rows
    /// atomically.
    ///
    /// The slug uniqueness check runs inside the write transaction, so two
    /// racing inserts with the same slug cannot both commit.
    ///
    /// # Arguments
    /// - `meta`: Metadata row to persist.
    /// - `content`: Raw Markdown body.
    ///
    /// # Returns
    /// `Ok(())` when the insert commits.
    ///
    /// # Errors
    /// Returns [`AppError::Conflict`] when the slug is already taken, or an
    /// error when serialization/storage operations fail.
    pub fn create(&self, meta: &NoteMeta, content: &str) -> Result<(), AppError> {
        let encoded_meta = bincode::serialize(meta)?;
        let encoded_content = bincode::serialize(&NoteContent {
            note_id: meta.id.clone(),
            content: content.to_string(),
        })?;
        let recency_key = reverse_timestamp_key(meta.publish_date);

        let write_txn = self.db.begin_write()?;
        {
            let mut metas = write_txn.open_table(NOTES_META)?;
            let mut contents = write_txn.open_table(NOTES_CONTENT)?;
            let mut slugs = write_txn.open_table(NOTES_BY_SLUG)?;
            let mut published = write_txn.open_table(NOTES_BY_PUBLISHED)?;

            if slugs.get(meta.slug.as_str())?.is_some() {
                return Err(AppError::Conflict(
                    "A note with this title already exists".to_string(),
                ));
            }
            if metas.get(meta.id.as_str())?.is_some() {
                return Err(AppError::StorageMessage(format!(
                    "Note id '{}' already exists",
                    meta.id
                )));
            }

            metas.insert(meta.id.as_str(), encoded_meta.as_slice())?;
            contents.insert(meta.id.as_str(), encoded_content.as_slice())?;
            slugs.insert(meta.slug.as_str(), meta.id.as_str())?;
            published.insert((recency_key, meta.id.as_str()), ())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a note's metadata by id.
    ///
    /// # Returns
    /// `Ok(Some(meta))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get_meta(&self, id: &str) -> Result<Option<NoteMeta>, AppError> {
        let read_txn = self.db.begin_read()?;
        let metas = read_txn.open_table(NOTES_META)?;
        match metas.get(id)? {
            Some(value) => Ok(Some(deserialize_meta(value.value())?)),
            None => Ok(None),
        }
    }

    /// Fetch a note's metadata by slug.
    ///
    /// Ownership is not checked here; callers compare `user_id` and decide
    /// between not-found and forbidden.
    ///
    /// # Returns
    /// `Ok(Some(meta))` when the slug resolves, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get_meta_by_slug(&self, slug: &str) -> Result<Option<NoteMeta>, AppError> {
        let read_txn = self.db.begin_read()?;
        let slugs = read_txn.open_table(NOTES_BY_SLUG)?;
        let Some(id_guard) = slugs.get(slug)? else {
            return Ok(None);
        };
        let id = id_guard.value().to_string();
        drop(id_guard);

        let metas = read_txn.open_table(NOTES_META)?;
        match metas.get(id.as_str())? {
            Some(value) => Ok(Some(deserialize_meta(value.value())?)),
            None => Err(AppError::StorageMessage(format!(
                "Slug '{}' resolves to missing note id '{}'",
                slug, id
            ))),
        }
    }

    /// Fetch a note's metadata and raw Markdown body by slug in one read
    /// transaction.
    ///
    /// # Returns
    /// `Ok(Some((meta, content)))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails, or when
    /// the body row is missing for an existing metadata row.
    pub fn get_with_content(&self, slug: &str) -> Result<Option<(NoteMeta, String)>, AppError> {
        let read_txn = self.db.begin_read()?;
        let slugs = read_txn.open_table(NOTES_BY_SLUG)?;
        let Some(id_guard) = slugs.get(slug)? else {
            return Ok(None);
        };
        let id = id_guard.value().to_string();
        drop(id_guard);

        let metas = read_txn.open_table(NOTES_META)?;
        let contents = read_txn.open_table(NOTES_CONTENT)?;
        let Some(meta_guard) = metas.get(id.as_str())? else {
            return Err(AppError::StorageMessage(format!(
                "Slug '{}' resolves to missing note id '{}'",
                slug, id
            )));
        };
        let meta = deserialize_meta(meta_guard.value())?;
        drop(meta_guard);

        let Some(content_guard) = contents.get(id.as_str())? else {
            return Err(AppError::StorageMessage(format!(
                "Note '{}' has metadata but no body row",
                id
            )));
        };
        let body = deserialize_content(content_guard.value())?;
        Ok(Some((meta, body.content)))
    }

    /// Check whether a slug is already taken.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        let read_txn = self.db.begin_read()?;
        let slugs = read_txn.open_table(NOTES_BY_SLUG)?;
        Ok(slugs.get(slug)?.is_some())
    }

    /// Apply a patch to a note, rewriting the slug index when the slug
    /// changes.
    ///
    /// All affected rows are written in one transaction; a slug collision
    /// detected inside the transaction aborts the whole update.
    ///
    /// # Arguments
    /// - `id`: Note id to update.
    /// - `update`: Patch to apply; `None` fields keep stored values.
    ///
    /// # Returns
    /// `Ok(Some(meta))` with the updated row, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when the new slug is taken by another note or when
    /// storage/serialization operations fail.
    pub fn update(&self, id: &str, update: &NoteUpdate) -> Result<Option<NoteMeta>, AppError> {
        let write_txn = self.db.begin_write()?;
        let updated_meta = {
            let mut metas = write_txn.open_table(NOTES_META)?;
            let mut contents = write_txn.open_table(NOTES_CONTENT)?;
            let mut slugs = write_txn.open_table(NOTES_BY_SLUG)?;
            let mut published = write_txn.open_table(NOTES_BY_PUBLISHED)?;

            let Some(old_guard) = metas.get(id)? else {
                return Ok(None);
            };
            let mut meta = deserialize_meta(old_guard.value())?;
            let old_slug = meta.slug.clone();
            let old_recency_key = reverse_timestamp_key(meta.publish_date);
            drop(old_guard);

            apply_note_update(&mut meta, update);

            if meta.slug != old_slug {
                if let Some(existing) = slugs.get(meta.slug.as_str())? {
                    if existing.value() != id {
                        return Err(AppError::StorageMessage(format!(
                            "Slug '{}' already exists",
                            meta.slug
                        )));
                    }
                }
                let _ = slugs.remove(old_slug.as_str())?;
                slugs.insert(meta.slug.as_str(), id)?;
            }

            if let Some(content) = update.content.as_deref() {
                let encoded_content = bincode::serialize(&NoteContent {
                    note_id: meta.id.clone(),
                    content: content.to_string(),
                })?;
                contents.insert(id, encoded_content.as_slice())?;
            }

            let encoded_meta = bincode::serialize(&meta)?;
            let new_recency_key = reverse_timestamp_key(meta.publish_date);
            metas.insert(id, encoded_meta.as_slice())?;
            if old_recency_key != new_recency_key {
                let _ = published.remove((old_recency_key, id))?;
                published.insert((new_recency_key, id), ())?;
            }

            Some(meta)
        };

        write_txn.commit()?;
        Ok(updated_meta)
    }

    /// Delete a note and return the deleted metadata row.
    ///
    /// Removes metadata, body, slug index, and recency index rows in one
    /// transaction.
    ///
    /// # Returns
    /// `Ok(Some(meta))` when deleted, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn delete_and_return(&self, id: &str) -> Result<Option<NoteMeta>, AppError> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut metas = write_txn.open_table(NOTES_META)?;
            let mut contents = write_txn.open_table(NOTES_CONTENT)?;
            let mut slugs = write_txn.open_table(NOTES_BY_SLUG)?;
            let mut published = write_txn.open_table(NOTES_BY_PUBLISHED)?;

            let Some(old_guard) = metas.get(id)? else {
                return Ok(None);
            };
            let meta = deserialize_meta(old_guard.value())?;
            let recency_key = reverse_timestamp_key(meta.publish_date);
            drop(old_guard);

            let _ = metas.remove(id)?;
            let _ = contents.remove(id)?;
            let _ = slugs.remove(meta.slug.as_str())?;
            let _ = published.remove((recency_key, id))?;
            Some(meta)
        };

        write_txn.commit()?;
        Ok(deleted)
    }

    /// List a user's note metadata sorted by publish date descending.
    ///
    /// Walks the recency index, so ordering comes from the index keys rather
    /// than a post-sort. Returns the full set; store initialization needs a
    /// complete snapshot.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<NoteMeta>, AppError> {
        let read_txn = self.db.begin_read()?;
        let published = read_txn.open_table(NOTES_BY_PUBLISHED)?;
        let metas = read_txn.open_table(NOTES_META)?;
        let mut notes = Vec::new();

        for item in published.iter()? {
            let (key, _) = item?;
            let (_, note_id) = key.value();
            let Some(meta_guard) = metas.get(note_id)? else {
                continue;
            };
            let meta = deserialize_meta(meta_guard.value())?;
            if meta.user_id == user_id {
                notes.push(meta);
            }
        }

        Ok(notes)
    }
}

#[cfg(test)]
mod tests;
