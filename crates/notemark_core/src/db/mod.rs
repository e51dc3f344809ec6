//! Database layer for notemark, backed by redb.

/// Note storage helpers.
pub mod note;
/// Session storage helpers.
pub mod session;
/// Shared table definitions.
pub mod tables;
/// User storage helpers.
pub mod user;

use crate::error::AppError;
use std::path::Path;
use std::sync::Arc;

use self::tables::REDB_FILE_NAME;

/// Database handle with access to the underlying redb instance.
///
/// All sub-accessors share one [`redb::Database`], so cross-table writes can
/// run inside a single write transaction.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub notes: note::NoteDb,
    pub users: user::UserDb,
    pub sessions: session::SessionDb,
}

impl Database {
    /// Open the database directory and initialize all tables.
    ///
    /// `path` names a directory; the redb file lives inside it so backups can
    /// copy the directory wholesale.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns an error when the directory cannot be created or redb cannot
    /// open/initialize the database file.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|e| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                path, e
            ))
        })?;

        let db = Arc::new(redb::Database::create(dir.join(REDB_FILE_NAME))?);
        Ok(Self {
            notes: note::NoteDb::new(db.clone())?,
            users: user::UserDb::new(db.clone())?,
            sessions: session::SessionDb::new(db.clone())?,
            db,
        })
    }
}
