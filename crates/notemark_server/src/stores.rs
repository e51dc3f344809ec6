//! In-memory per-user note stores shared across API handlers.
//!
//! Each authenticated user gets one [`UserStore`] holding their
//! [`NoteStore`] views and a fuzzy [`SearchIndex`] wired to invalidate on
//! every store mutation. Stores are created lazily and populated from the
//! database on first use.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};

use notemark_core::db::Database;
use notemark_core::models::note::NormalizedNoteMeta;
use notemark_core::search::SearchIndex;
use notemark_core::{AppError, NoteStore};

/// Store-registry runtime errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAccessError {
    /// Internal mutex state is poisoned.
    Poisoned,
}

impl fmt::Display for StoreAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poisoned => write!(f, "note store registry state is poisoned"),
        }
    }
}

impl std::error::Error for StoreAccessError {}

/// One user's cached note views and search index.
pub struct UserStore {
    user_id: String,
    pub store: NoteStore,
    index: SearchIndex,
    loaded: bool,
}

impl UserStore {
    fn new(user_id: &str) -> Self {
        let mut store = NoteStore::new();
        let index = SearchIndex::new();
        let dirty = index.dirty_flag();
        store.subscribe(Box::new(move |_| dirty.store(true, Ordering::SeqCst)));
        Self {
            user_id: user_id.to_string(),
            store,
            index,
            loaded: false,
        }
    }

    /// Populate the store from the database on first use.
    ///
    /// Later calls are no-ops, so handlers can call this unconditionally
    /// before reading or mutating the views.
    ///
    /// # Errors
    /// Returns an error if the snapshot query fails.
    pub fn ensure_loaded(&mut self, db: &Database) -> Result<(), AppError> {
        if self.loaded {
            return Ok(());
        }
        let notes = db.notes.list_for_user(&self.user_id)?;
        tracing::debug!(
            "loading note store for user {} ({} notes)",
            self.user_id,
            notes.len()
        );
        self.store.initialize(notes);
        self.loaded = true;
        Ok(())
    }

    /// Fuzzy-search this user's notes, best matches first.
    pub fn search(&mut self, query: &str, limit: usize) -> Vec<NormalizedNoteMeta> {
        self.index.search(&self.store, query, limit)
    }
}

/// Registry of per-user stores keyed by user id.
#[derive(Default)]
pub struct SessionStores {
    inner: Mutex<HashMap<String, Arc<Mutex<UserStore>>>>,
}

impl SessionStores {
    fn registry(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<String, Arc<Mutex<UserStore>>>>, StoreAccessError> {
        self.inner.lock().map_err(|_| StoreAccessError::Poisoned)
    }

    /// Fetch the store for `user_id`, creating an empty one if absent.
    ///
    /// # Returns
    /// A shared handle; callers lock it for the duration of one request.
    ///
    /// # Errors
    /// Returns [`StoreAccessError::Poisoned`] when registry state is poisoned.
    pub fn for_user(&self, user_id: &str) -> Result<Arc<Mutex<UserStore>>, StoreAccessError> {
        let mut registry = self.registry()?;
        let entry = registry
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(UserStore::new(user_id))));
        Ok(Arc::clone(entry))
    }

    /// Drop the cached store for `user_id`.
    ///
    /// Called on logout; the next request rebuilds the store from the
    /// database.
    ///
    /// # Returns
    /// Whether a store existed for the user.
    ///
    /// # Errors
    /// Returns [`StoreAccessError::Poisoned`] when registry state is poisoned.
    pub fn evict(&self, user_id: &str) -> Result<bool, StoreAccessError> {
        let mut registry = self.registry()?;
        Ok(registry.remove(user_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use notemark_core::models::note::NoteMeta;
    use notemark_core::store::StoreState;
    use std::thread;
    use tempfile::TempDir;

    use super::*;

    fn open_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir");
        let db_path = temp_dir.path().join("db");
        let db = Database::new(db_path.to_str().expect("db path")).expect("open db");
        (db, temp_dir)
    }

    fn seed_note(db: &Database, user_id: &str, slug: &str, title: &str) -> NoteMeta {
        let meta = NoteMeta::new(user_id.to_string(), slug.to_string(), title.to_string());
        db.notes
            .create(&meta, &format!("Body of {title}."))
            .expect("create note");
        meta
    }

    #[test]
    fn ensure_loaded_populates_once_from_the_database() {
        let (db, _temp) = open_db();
        seed_note(&db, "user-1", "first", "First");

        let stores = SessionStores::default();
        let handle = stores.for_user("user-1").expect("store handle");
        let mut guard = handle.lock().expect("store lock");

        guard.ensure_loaded(&db).expect("load");
        assert_eq!(guard.store.len(), 1);
        assert_eq!(guard.store.state(), StoreState::Populated);

        // A second load must not re-read the snapshot.
        seed_note(&db, "user-1", "second", "Second");
        guard.ensure_loaded(&db).expect("reload is a no-op");
        assert_eq!(guard.store.len(), 1);
    }

    #[test]
    fn stores_are_scoped_per_user() {
        let (db, _temp) = open_db();
        seed_note(&db, "user-1", "mine", "Mine");
        seed_note(&db, "user-2", "theirs", "Theirs");

        let stores = SessionStores::default();
        let mine = stores.for_user("user-1").expect("store handle");
        let mut mine_guard = mine.lock().expect("store lock");
        mine_guard.ensure_loaded(&db).expect("load");

        assert_eq!(mine_guard.store.len(), 1);
        assert_eq!(mine_guard.store.list()[0].slug, "mine");
    }

    #[test]
    fn for_user_returns_the_same_store_handle() {
        let stores = SessionStores::default();
        let first = stores.for_user("user-1").expect("store handle");
        let second = stores.for_user("user-1").expect("store handle");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn search_sees_store_mutations() {
        let (db, _temp) = open_db();
        let stores = SessionStores::default();
        let handle = stores.for_user("user-1").expect("store handle");
        let mut guard = handle.lock().expect("store lock");
        guard.ensure_loaded(&db).expect("load");

        assert!(guard.search("rust", 10).is_empty());

        let meta = seed_note(&db, "user-1", "rust-tips", "Rust tips");
        guard.store.add(meta);
        assert_eq!(
            guard.search("rust", 10).len(),
            1,
            "store mutation should invalidate the index"
        );
    }

    #[test]
    fn evict_drops_the_cached_store() {
        let stores = SessionStores::default();
        let before_evict = stores.for_user("user-1").expect("store handle");

        assert!(stores.evict("user-1").expect("evict"));
        assert!(!stores.evict("user-1").expect("second evict is a no-op"));

        let after_evict = stores.for_user("user-1").expect("store handle");
        assert!(!Arc::ptr_eq(&before_evict, &after_evict));
    }

    #[test]
    fn registry_reports_poisoning_instead_of_panicking() {
        let stores = Arc::new(SessionStores::default());
        let poison_target = Arc::clone(&stores);
        let _ = thread::spawn(move || {
            let _guard = poison_target.inner.lock().expect("inner lock");
            panic!("poison store registry");
        })
        .join();

        assert!(matches!(
            stores.for_user("user-1"),
            Err(StoreAccessError::Poisoned)
        ));
        assert!(matches!(
            stores.evict("user-1"),
            Err(StoreAccessError::Poisoned)
        ));
    }
}
