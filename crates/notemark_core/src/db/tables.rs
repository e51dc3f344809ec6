//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Note metadata rows (`NoteMeta`, bincode-encoded), keyed by note id.
pub const NOTES_META: TableDefinition<&str, &[u8]> = TableDefinition::new("notes_meta");
/// Note bodies (`NoteContent`, bincode-encoded), keyed by note id.
pub const NOTES_CONTENT: TableDefinition<&str, &[u8]> = TableDefinition::new("notes_content");
/// Unique slug index mapping slug to note id.
pub const NOTES_BY_SLUG: TableDefinition<&str, &str> = TableDefinition::new("notes_by_slug");
/// Publish-recency index ordered by reverse-millis then note id.
pub const NOTES_BY_PUBLISHED: TableDefinition<(u64, &str), ()> =
    TableDefinition::new("notes_by_published");

/// User rows (`User`, bincode-encoded), keyed by user id.
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
/// Unique username index mapping username to user id.
pub const USERS_BY_NAME: TableDefinition<&str, &str> = TableDefinition::new("users_by_name");
/// Session rows (`Session`, bincode-encoded), keyed by token.
pub const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");
