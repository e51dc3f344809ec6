//! Note CRUD HTTP handlers.

use super::access::{lock_store, user_store};
use crate::{auth, error::HttpError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use notemark_core::constants::DEFAULT_CATEGORY;
use notemark_core::describe::generate_description;
use notemark_core::markdown::{render_html, split_frontmatter, FrontmatterMeta};
use notemark_core::models::note::{
    CreateNoteRequest, NoteDetail, NoteMeta, NoteUpdate, UpdateNoteRequest,
};
use notemark_core::slug::generate_unique_slug;
use notemark_core::AppError;

fn normalized_field(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn ensure_within_size_limit(state: &AppState, content: &str) -> Result<(), AppError> {
    if content.len() > state.config.max_note_size {
        return Err(AppError::BadRequest(format!(
            "Note size exceeds maximum of {} bytes",
            state.config.max_note_size
        )));
    }
    Ok(())
}

fn ownership_forbidden() -> AppError {
    AppError::Forbidden("You do not own this note".to_string())
}

/// Create a new note.
///
/// Metadata comes from the request's explicit `metadata` block first, then
/// from YAML frontmatter in `content`, then from derived defaults: the
/// description is generated from the body and the category falls back to the
/// default bucket. The slug is derived from the title and suffixed until it
/// is unique.
///
/// # Arguments
/// - `state`: Application state.
/// - `jar`: Incoming cookie jar.
/// - `req`: Note creation payload.
///
/// # Returns
/// `201 Created` with the stored note metadata as JSON.
///
/// # Errors
/// Returns an error if authentication, validation, or persistence fails.
pub async fn create_note(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteMeta>), HttpError> {
    let user = auth::authenticate(&state.db, &jar)?;
    ensure_within_size_limit(&state, &req.content)?;

    let (frontmatter, body) = split_frontmatter(&req.content);
    let frontmatter = frontmatter.unwrap_or_default();

    let Some(title) = req
        .metadata
        .trimmed_title()
        .map(str::to_string)
        .or(frontmatter.title)
    else {
        return Err(AppError::BadRequest("Title is required".to_string()).into());
    };
    let description = normalized_field(req.metadata.description)
        .or(frontmatter.description)
        .unwrap_or_else(|| generate_description(body));
    let category = normalized_field(req.metadata.category)
        .or(frontmatter.category)
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    let slug = generate_unique_slug(&title, |candidate| state.db.notes.slug_exists(candidate))?;

    let mut meta = NoteMeta::new(user.id.clone(), slug, title);
    meta.description = Some(description);
    meta.category = Some(category);

    let handle = user_store(&state, &user.id)?;
    let mut stores = lock_store(&handle)?;
    // Snapshot the existing notes before the insert so the new row is not
    // loaded twice.
    stores.ensure_loaded(&state.db)?;
    state.db.notes.create(&meta, body)?;
    stores.store.add(meta.clone());

    tracing::debug!("Created note '{}' for user '{}'", meta.slug, user.username);
    Ok((StatusCode::CREATED, Json(meta)))
}

/// Fetch a note by slug with its rendered HTML body.
///
/// # Arguments
/// - `state`: Application state.
/// - `slug`: Note slug from the path.
/// - `jar`: Incoming cookie jar.
///
/// # Returns
/// Note metadata plus rendered HTML as JSON.
///
/// # Errors
/// Returns [`AppError::NotFound`] when the slug does not exist or belongs to
/// another user; reads never reveal other users' notes.
pub async fn get_note(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    jar: CookieJar,
) -> Result<Json<NoteDetail>, HttpError> {
    let user = auth::authenticate(&state.db, &jar)?;

    let Some((metadata, content)) = state.db.notes.get_with_content(&slug)? else {
        return Err(AppError::NotFound.into());
    };
    if metadata.user_id != user.id {
        return Err(AppError::NotFound.into());
    }

    let html_content = render_html(&content);
    Ok(Json(NoteDetail {
        metadata,
        html_content,
    }))
}

/// Update an existing note.
///
/// Absent metadata fields keep their stored values. A changed title re-derives
/// the slug (collision-suffixed against the full slug set); an unchanged title
/// leaves the slug alone. New content without an explicit description
/// re-derives the description from the body.
///
/// # Arguments
/// - `state`: Application state.
/// - `slug`: Note slug from the path.
/// - `jar`: Incoming cookie jar.
/// - `req`: Note update payload.
///
/// # Returns
/// Updated note metadata as JSON.
///
/// # Errors
/// Returns an error if authentication or validation fails, the note does not
/// exist, or it belongs to another user.
pub async fn update_note(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    jar: CookieJar,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<NoteMeta>, HttpError> {
    let user = auth::authenticate(&state.db, &jar)?;

    let Some(existing) = state.db.notes.get_meta_by_slug(&slug)? else {
        return Err(AppError::NotFound.into());
    };
    if existing.user_id != user.id {
        return Err(ownership_forbidden().into());
    }

    if req.metadata.title.is_some() && req.metadata.trimmed_title().is_none() {
        return Err(AppError::BadRequest("Title cannot be empty".to_string()).into());
    }
    if let Some(ref content) = req.content {
        ensure_within_size_limit(&state, content)?;
    }

    // Replacement content may open with its own frontmatter block.
    let (frontmatter, body) = match req.content.as_deref() {
        Some(content) => {
            let (meta, body) = split_frontmatter(content);
            (meta.unwrap_or_default(), Some(body.to_string()))
        }
        None => (FrontmatterMeta::default(), None),
    };

    let mut update = NoteUpdate::default();

    if let Some(title) = req
        .metadata
        .trimmed_title()
        .map(str::to_string)
        .or(frontmatter.title)
    {
        // The collision probe scans every slug, the note's own included, so
        // skip it when the title is unchanged.
        if title != existing.title {
            let new_slug =
                generate_unique_slug(&title, |candidate| state.db.notes.slug_exists(candidate))?;
            update.slug = Some(new_slug);
            update.title = Some(title);
        }
    }

    if let Some(description) = normalized_field(req.metadata.description).or(frontmatter.description)
    {
        update.description = Some(description);
    } else if let Some(ref body) = body {
        // New content without an explicit description: re-derive it.
        update.description = Some(generate_description(body));
    }

    if let Some(category) = normalized_field(req.metadata.category).or(frontmatter.category) {
        update.category = Some(category);
    }
    update.content = body;

    let handle = user_store(&state, &user.id)?;
    let mut stores = lock_store(&handle)?;
    stores.ensure_loaded(&state.db)?;
    let updated = state
        .db
        .notes
        .update(&existing.id, &update)?
        .ok_or(AppError::NotFound)?;
    stores.store.update(updated.clone());

    Ok(Json(updated))
}

/// Delete a note by slug.
///
/// # Arguments
/// - `state`: Application state.
/// - `slug`: Note slug from the path.
/// - `jar`: Incoming cookie jar.
///
/// # Returns
/// `204 No Content` on success.
///
/// # Errors
/// Returns an error if authentication fails, the note does not exist, or it
/// belongs to another user.
pub async fn delete_note(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    jar: CookieJar,
) -> Result<StatusCode, HttpError> {
    let user = auth::authenticate(&state.db, &jar)?;

    let Some(existing) = state.db.notes.get_meta_by_slug(&slug)? else {
        return Err(AppError::NotFound.into());
    };
    if existing.user_id != user.id {
        return Err(ownership_forbidden().into());
    }

    let handle = user_store(&state, &user.id)?;
    let mut stores = lock_store(&handle)?;
    stores.ensure_loaded(&state.db)?;
    state
        .db
        .notes
        .delete_and_return(&existing.id)?
        .ok_or(AppError::NotFound)?;
    stores.store.remove(&slug);

    tracing::debug!("Deleted note '{}' for user '{}'", slug, user.username);
    Ok(StatusCode::NO_CONTENT)
}
