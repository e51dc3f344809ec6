//! User storage operations backed by redb.

use crate::db::tables::{USERS, USERS_BY_NAME};
use crate::error::AppError;
use crate::models::user::User;
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for user-related redb tables.
pub struct UserDb {
    db: Arc<redb::Database>,
}

impl UserDb {
    /// Initialize user tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(USERS)?;
        write_txn.open_table(USERS_BY_NAME)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a user row and its username index entry atomically.
    ///
    /// Username uniqueness is checked inside the write transaction.
    ///
    /// # Errors
    /// Returns [`AppError::Conflict`] when the username is taken, or an error
    /// when serialization/storage operations fail.
    pub fn create(&self, user: &User) -> Result<(), AppError> {
        let encoded = bincode::serialize(user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let mut names = write_txn.open_table(USERS_BY_NAME)?;

            if names.get(user.username.as_str())?.is_some() {
                return Err(AppError::Conflict("Username already taken".to_string()));
            }

            users.insert(user.id.as_str(), encoded.as_slice())?;
            names.insert(user.username.as_str(), user.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a user by id.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: &str) -> Result<Option<User>, AppError> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        match users.get(id)? {
            Some(value) => Ok(Some(bincode::deserialize(value.value())?)),
            None => Ok(None),
        }
    }

    /// Fetch a user by exact username.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let read_txn = self.db.begin_read()?;
        let names = read_txn.open_table(USERS_BY_NAME)?;
        let Some(id_guard) = names.get(username)? else {
            return Ok(None);
        };
        let id = id_guard.value().to_string();
        drop(id_guard);

        let users = read_txn.open_table(USERS)?;
        match users.get(id.as_str())? {
            Some(value) => Ok(Some(bincode::deserialize(value.value())?)),
            None => Err(AppError::StorageMessage(format!(
                "Username '{}' resolves to missing user id '{}'",
                username, id
            ))),
        }
    }
}
