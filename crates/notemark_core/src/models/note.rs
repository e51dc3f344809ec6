//! Note-related data models and API payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::DEFAULT_CATEGORY;

/// Note metadata stored in the database and returned by the API.
///
/// The Markdown body lives in a separate [`NoteContent`] row so list and
/// sidebar paths never deserialize full bodies. Serialized with camelCase
/// keys on the wire (`userId`, `publishDate`); bincode rows are positional
/// and unaffected by the rename.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoteMeta {
    pub id: String,
    pub user_id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub publish_date: DateTime<Utc>,
}

/// Raw Markdown body for a note, keyed 1:1 with its [`NoteMeta`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteContent {
    pub note_id: String,
    pub content: String,
}

/// Flattened projection of [`NoteMeta`] used for search indexing.
///
/// Optional fields are collapsed to plain strings so matchers never deal
/// with absence: missing descriptions become empty, missing categories the
/// default bucket name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedNoteMeta {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub category: String,
}

/// Metadata block of a create/update request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteMetaPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request payload for creating a note.
///
/// `content` may open with a YAML frontmatter block; frontmatter fields fill
/// any metadata the explicit block leaves empty.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub metadata: NoteMetaPayload,
    #[serde(default)]
    pub content: String,
}

/// Request payload for updating a note.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub metadata: NoteMetaPayload,
    pub content: Option<String>,
}

/// Storage-level patch applied to an existing note.
///
/// Built by the update handler after frontmatter merging and slug
/// re-derivation; `None` fields leave the stored value untouched. Empty
/// `description`/`category` strings clear the field.
#[derive(Debug, Clone, Default)]
pub struct NoteUpdate {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
}

/// Query parameters for the sidebar endpoint.
#[derive(Debug, Deserialize)]
pub struct SidebarQuery {
    pub sort: Option<String>,
}

/// Query parameters for searching notes.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

/// Response payload for a single-note fetch: metadata plus rendered HTML.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDetail {
    pub metadata: NoteMeta,
    pub html_content: String,
}

impl NoteMeta {
    /// Create metadata for a new note stamped with the current time.
    ///
    /// # Arguments
    /// - `user_id`: Owning user's id.
    /// - `slug`: Unique URL-safe identifier (collision-checked by the caller).
    /// - `title`: Note display title.
    ///
    /// # Returns
    /// A new [`NoteMeta`] with a fresh id and `publish_date` of now.
    pub fn new(user_id: String, slug: String, title: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            slug,
            title,
            description: None,
            category: None,
            publish_date: Utc::now(),
        }
    }

    /// Category name with the default bucket applied for uncategorized notes.
    pub fn effective_category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }
}

impl From<&NoteMeta> for NormalizedNoteMeta {
    fn from(value: &NoteMeta) -> Self {
        Self {
            id: value.id.clone(),
            slug: value.slug.clone(),
            title: value.title.clone(),
            description: value.description.clone().unwrap_or_default(),
            category: value.effective_category().to_string(),
        }
    }
}

impl NoteMetaPayload {
    /// Title with surrounding whitespace removed, `None` when empty.
    pub fn trimmed_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}
