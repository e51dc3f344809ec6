//! Shared helpers for reaching a request's per-user note store.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::stores::{StoreAccessError, UserStore};
use crate::AppState;
use notemark_core::AppError;

pub(super) fn store_access_error(err: StoreAccessError) -> AppError {
    AppError::StorageMessage(err.to_string())
}

/// Fetch the store handle for the authenticated user, creating it on first use.
pub(super) fn user_store(
    state: &AppState,
    user_id: &str,
) -> Result<Arc<Mutex<UserStore>>, AppError> {
    state.sessions.for_user(user_id).map_err(store_access_error)
}

/// Lock a user store for the duration of one request's mutation or read.
pub(super) fn lock_store(
    handle: &Arc<Mutex<UserStore>>,
) -> Result<MutexGuard<'_, UserStore>, AppError> {
    handle
        .lock()
        .map_err(|_| store_access_error(StoreAccessError::Poisoned))
}
