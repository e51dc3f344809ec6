//! Slug derivation and collision handling for note titles.

use crate::constants::SLUG_MAX_ATTEMPTS;
use crate::error::AppError;

/// Derive a URL-safe slug from a title.
///
/// Lower-cases the input, collapses every run of non-alphanumeric characters
/// to a single `-`, and trims leading/trailing separators.
///
/// # Returns
/// The slugified title; empty when the title has no alphanumeric characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// Generate a unique slug for a title, with collision handling.
///
/// Tries the slugified title first, then appends `-1`, `-2`, … until
/// `exists_check` reports the candidate free. The loop is bounded so a
/// pathological data set cannot spin forever.
///
/// # Arguments
/// - `title`: Note title to slugify.
/// - `exists_check`: Probe returning whether a candidate slug is taken.
///
/// # Returns
/// A slug that does not collide according to `exists_check`.
///
/// # Errors
/// Returns [`AppError::SlugExhausted`] when every candidate within the
/// attempt bound is taken, or propagates probe errors.
pub fn generate_unique_slug<F>(title: &str, exists_check: F) -> Result<String, AppError>
where
    F: Fn(&str) -> Result<bool, AppError>,
{
    let base = slugify(title);
    let mut candidate = base.clone();

    for counter in 1..=SLUG_MAX_ATTEMPTS {
        if !exists_check(&candidate)? {
            return Ok(candidate);
        }
        candidate = format!("{}-{}", base, counter);
    }

    Err(AppError::SlugExhausted(SLUG_MAX_ATTEMPTS))
}
