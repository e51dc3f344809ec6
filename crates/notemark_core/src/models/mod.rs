//! Data models for API requests and persistence.

/// Note metadata, content, and note-related API payloads.
pub mod note;
/// User accounts and session records.
pub mod user;
