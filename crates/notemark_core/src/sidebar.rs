//! Sidebar projection: orders category buckets for display.
//!
//! A pure view over [`NoteStore::categorized`](crate::store::NoteStore) —
//! sorting here never touches the store itself.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::models::note::NoteMeta;

/// Display order for sidebar categories.
///
/// Cycled in a fixed order by the UI toggle: alphabetical ascending,
/// alphabetical descending, most recently updated first, back to ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    AlphaAsc,
    AlphaDesc,
    Recent,
}

impl SortMode {
    /// Next mode in the display cycle.
    pub fn next(self) -> Self {
        match self {
            SortMode::AlphaAsc => SortMode::AlphaDesc,
            SortMode::AlphaDesc => SortMode::Recent,
            SortMode::Recent => SortMode::AlphaAsc,
        }
    }

    /// Wire name of the mode, as accepted by the sidebar endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::AlphaAsc => "alphaAsc",
            SortMode::AlphaDesc => "alphaDesc",
            SortMode::Recent => "recent",
        }
    }
}

impl FromStr for SortMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "alphaAsc" => Ok(SortMode::AlphaAsc),
            "alphaDesc" => Ok(SortMode::AlphaDesc),
            "recent" => Ok(SortMode::Recent),
            other => Err(AppError::BadRequest(format!(
                "unknown sort mode '{other}', expected alphaAsc, alphaDesc, or recent"
            ))),
        }
    }
}

/// One sidebar section: a category, its notes, and its freshest publish date.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    pub category: String,
    pub last_updated: DateTime<Utc>,
    pub notes: Vec<NoteMeta>,
}

/// Project category buckets into a sorted sequence of [`CategoryGroup`]s.
///
/// `last_updated` is the maximum publish date within each bucket. Name
/// comparison lowercases both sides, so "apple" sorts next to "Apple".
/// Ties keep the input bucket order.
pub fn sort_categories(
    categorized: &BTreeMap<String, Vec<NoteMeta>>,
    mode: SortMode,
) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = categorized
        .iter()
        .map(|(category, notes)| CategoryGroup {
            category: category.clone(),
            last_updated: notes
                .iter()
                .map(|note| note.publish_date)
                .max()
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            notes: notes.clone(),
        })
        .collect();

    match mode {
        SortMode::AlphaAsc => {
            groups.sort_by(|a, b| a.category.to_lowercase().cmp(&b.category.to_lowercase()));
        }
        SortMode::AlphaDesc => {
            groups.sort_by(|a, b| b.category.to_lowercase().cmp(&a.category.to_lowercase()));
        }
        SortMode::Recent => {
            groups.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        }
    }
    groups
}
