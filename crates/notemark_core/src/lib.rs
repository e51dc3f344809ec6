//! Core domain library for Notemark (config, storage, models, note views).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across Notemark crates.
pub mod constants;
/// Database access layer and transactions.
pub mod db;
/// Markdown description extraction.
pub mod describe;
/// Process-global environment mutation helpers.
pub mod env;
/// Application error types (storage/domain).
pub mod error;
/// Frontmatter parsing and Markdown-to-HTML rendering.
pub mod markdown;
/// Data models for API requests and persistence.
pub mod models;
/// Fuzzy search over the normalized note view.
pub mod search;
/// Category projections for the sidebar.
pub mod sidebar;
/// Slug derivation and collision handling.
pub mod slug;
/// In-memory note store with derived views.
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::DEFAULT_PORT;
pub use db::Database;
pub use error::AppError;
pub use store::NoteStore;
