//! Fuzzy search over note metadata.
//!
//! The index holds a copy of the store's normalized view and rebuilds it
//! lazily: a store subscription flips the shared dirty flag on every
//! mutation, and the next search pulls a fresh snapshot before matching.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::constants::SEARCH_MIN_QUERY_LEN;
use crate::models::note::NormalizedNoteMeta;
use crate::store::NoteStore;

const TITLE_WEIGHT: f64 = 2.0;
const DESCRIPTION_WEIGHT: f64 = 1.0;
const CATEGORY_WEIGHT: f64 = 0.5;

/// Fuzzy matcher over the note set, ranked by weighted field scores.
pub struct SearchIndex {
    matcher: SkimMatcherV2,
    entries: Vec<NormalizedNoteMeta>,
    dirty: Arc<AtomicBool>,
}

impl SearchIndex {
    /// Create an index with no entries. The first search populates it.
    pub fn new() -> Self {
        Self {
            matcher: SkimMatcherV2::default(),
            entries: Vec::new(),
            dirty: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Shared flag that schedules a rebuild when set.
    ///
    /// Hand this to a store subscription so mutations invalidate the index:
    ///
    /// ```
    /// use std::sync::atomic::Ordering;
    /// use notemark_core::search::SearchIndex;
    /// use notemark_core::store::NoteStore;
    ///
    /// let mut store = NoteStore::new();
    /// let index = SearchIndex::new();
    /// let dirty = index.dirty_flag();
    /// store.subscribe(Box::new(move |_| dirty.store(true, Ordering::SeqCst)));
    /// ```
    pub fn dirty_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.dirty)
    }

    /// Match `query` against the store's notes, best scores first.
    ///
    /// Queries shorter than [`SEARCH_MIN_QUERY_LEN`] characters return no
    /// results. A note's score is its best weighted field match: title
    /// counts double, category half. Notes with no matching field are
    /// excluded entirely.
    pub fn search(
        &mut self,
        store: &NoteStore,
        query: &str,
        limit: usize,
    ) -> Vec<NormalizedNoteMeta> {
        if query.chars().count() < SEARCH_MIN_QUERY_LEN {
            return Vec::new();
        }
        if self.dirty.swap(false, Ordering::SeqCst) {
            self.entries = store.normalized().to_vec();
        }

        let mut scored: Vec<(f64, &NormalizedNoteMeta)> = self
            .entries
            .iter()
            .filter_map(|entry| self.score(entry, query).map(|score| (score, entry)))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        scored
            .into_iter()
            .take(limit)
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    fn score(&self, entry: &NormalizedNoteMeta, query: &str) -> Option<f64> {
        let fields = [
            (entry.title.as_str(), TITLE_WEIGHT),
            (entry.description.as_str(), DESCRIPTION_WEIGHT),
            (entry.category.as_str(), CATEGORY_WEIGHT),
        ];
        let mut best: Option<f64> = None;
        for (text, weight) in fields {
            if let Some(score) = self.matcher.fuzzy_match(text, query) {
                let weighted = score as f64 * weight;
                if best.map_or(true, |current| weighted > current) {
                    best = Some(weighted);
                }
            }
        }
        best
    }
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new()
    }
}
