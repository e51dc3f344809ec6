//! Session storage operations backed by redb.

use crate::db::tables::SESSIONS;
use crate::error::AppError;
use crate::models::user::Session;
use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for the session table.
pub struct SessionDb {
    db: Arc<redb::Database>,
}

impl SessionDb {
    /// Initialize the session table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(SESSIONS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a session row.
    ///
    /// # Errors
    /// Returns an error when serialization or storage operations fail.
    pub fn insert(&self, session: &Session) -> Result<(), AppError> {
        let encoded = bincode::serialize(session)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut sessions = write_txn.open_table(SESSIONS)?;
            sessions.insert(session.token.as_str(), encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a session by token, treating expired rows as absent.
    ///
    /// Expired rows are deleted opportunistically on lookup.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get_valid(&self, token: &str) -> Result<Option<Session>, AppError> {
        let session = {
            let read_txn = self.db.begin_read()?;
            let sessions = read_txn.open_table(SESSIONS)?;
            match sessions.get(token)? {
                Some(value) => Some(bincode::deserialize::<Session>(value.value())?),
                None => None,
            }
        };

        match session {
            Some(session) if session.is_expired() => {
                self.delete(token)?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Delete a session by token.
    ///
    /// # Returns
    /// `true` when a row was deleted, otherwise `false`.
    ///
    /// # Errors
    /// Returns an error when storage operations fail.
    pub fn delete(&self, token: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut sessions = write_txn.open_table(SESSIONS)?;
            let removed = sessions.remove(token)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(deleted)
    }

    /// Delete every expired session row.
    ///
    /// # Returns
    /// Number of rows removed.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn prune_expired(&self) -> Result<usize, AppError> {
        let now = Utc::now();
        let write_txn = self.db.begin_write()?;
        let pruned = {
            let mut sessions = write_txn.open_table(SESSIONS)?;

            let mut expired_tokens = Vec::new();
            for item in sessions.iter()? {
                let (key, value) = item?;
                let session: Session = bincode::deserialize(value.value())?;
                if session.expires_at <= now {
                    expired_tokens.push(key.value().to_string());
                }
            }

            for token in &expired_tokens {
                let _ = sessions.remove(token.as_str())?;
            }
            expired_tokens.len()
        };
        write_txn.commit()?;
        Ok(pruned)
    }
}
