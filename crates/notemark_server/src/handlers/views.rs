//! Derived-view HTTP handlers: note list, sidebar, and search.

use super::access::{lock_store, user_store};
use crate::{auth, error::HttpError, AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use notemark_core::constants::DEFAULT_SEARCH_LIMIT;
use notemark_core::models::note::{NormalizedNoteMeta, NoteMeta, SearchQuery, SidebarQuery};
use notemark_core::sidebar::{sort_categories, CategoryGroup, SortMode};

fn normalized_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(100)
}

/// List the authenticated user's notes, newest first.
///
/// # Arguments
/// - `state`: Application state.
/// - `jar`: Incoming cookie jar.
///
/// # Returns
/// Note metadata rows as JSON, ordered by publish date descending.
///
/// # Errors
/// Returns an error if authentication fails or the store cannot be loaded.
pub async fn list_notes(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Vec<NoteMeta>>, HttpError> {
    let user = auth::authenticate(&state.db, &jar)?;

    let handle = user_store(&state, &user.id)?;
    let mut stores = lock_store(&handle)?;
    stores.ensure_loaded(&state.db)?;
    Ok(Json(stores.store.list().to_vec()))
}

/// Build the category sidebar for the authenticated user.
///
/// # Arguments
/// - `state`: Application state.
/// - `query`: Optional `sort` parameter (`alphaAsc`, `alphaDesc`, `recent`).
/// - `jar`: Incoming cookie jar.
///
/// # Returns
/// Category groups as JSON, ordered per the requested sort mode.
///
/// # Errors
/// Returns [`AppError::BadRequest`] for an unknown sort mode, or an error if
/// authentication fails or the store cannot be loaded.
///
/// [`AppError::BadRequest`]: notemark_core::AppError::BadRequest
pub async fn sidebar(
    State(state): State<AppState>,
    Query(query): Query<SidebarQuery>,
    jar: CookieJar,
) -> Result<Json<Vec<CategoryGroup>>, HttpError> {
    let user = auth::authenticate(&state.db, &jar)?;
    let mode = match query.sort.as_deref() {
        Some(raw) => raw.parse::<SortMode>()?,
        None => SortMode::default(),
    };

    let handle = user_store(&state, &user.id)?;
    let mut stores = lock_store(&handle)?;
    stores.ensure_loaded(&state.db)?;
    Ok(Json(sort_categories(stores.store.categorized(), mode)))
}

/// Fuzzy-search the authenticated user's notes.
///
/// # Arguments
/// - `state`: Application state.
/// - `query`: Search string `q` and optional result `limit`.
/// - `jar`: Incoming cookie jar.
///
/// # Returns
/// Matching normalized note rows as JSON, best score first. Queries shorter
/// than the minimum length return an empty list.
///
/// # Errors
/// Returns an error if authentication fails or the store cannot be loaded.
pub async fn search_notes(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    jar: CookieJar,
) -> Result<Json<Vec<NormalizedNoteMeta>>, HttpError> {
    let user = auth::authenticate(&state.db, &jar)?;
    let limit = normalized_limit(query.limit);

    let handle = user_store(&state, &user.id)?;
    let mut stores = lock_store(&handle)?;
    stores.ensure_loaded(&state.db)?;
    Ok(Json(stores.search(&query.q, limit)))
}
