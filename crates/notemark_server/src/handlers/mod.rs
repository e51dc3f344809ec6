//! HTTP request handlers.

pub(crate) mod access;
/// Authentication endpoints.
pub mod auth;
/// Note CRUD endpoints.
pub mod note;
/// Derived-view endpoints (list, sidebar, search).
pub mod views;
