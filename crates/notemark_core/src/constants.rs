//! Shared constants used across Notemark crates.

/// Default API port for Notemark.
pub const DEFAULT_PORT: u16 = 38652;

/// Default maximum note body size accepted by the API layer.
pub const DEFAULT_MAX_NOTE_SIZE: usize = 2 * 1024 * 1024;

/// Default session lifetime in hours.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Category assigned to notes created without one.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Description used when a note body yields no extractable paragraph.
pub const FALLBACK_DESCRIPTION: &str = "Please add some content at least ;)";

/// Upper bound on slug collision-suffix attempts before giving up.
pub const SLUG_MAX_ATTEMPTS: u32 = 5_000;

/// Length of generated session tokens.
pub const SESSION_TOKEN_LEN: usize = 32;

/// Minimum query length for fuzzy search.
pub const SEARCH_MIN_QUERY_LEN: usize = 2;

/// Upper bound on fuzzy search result sets.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;
