//! In-memory note store backing the list, search, and sidebar views.
//!
//! The store holds three views of the same note set: `list` (sorted by
//! publish date descending), `normalized` (a parallel projection for search
//! indexing), and `categorized` (notes grouped by category). Every mutation
//! updates all three before subscribers run, so observers never see the
//! views disagree.

use std::collections::BTreeMap;

use crate::models::note::{NormalizedNoteMeta, NoteMeta};

/// Callback invoked with the store after every mutation.
pub type Subscriber = Box<dyn FnMut(&NoteStore) + Send>;

/// Handle returned by [`NoteStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Lifecycle state of the store.
///
/// `Populated` means the store holds at least one note. [`NoteStore::initialize`]
/// only runs against an `Empty` store, so a session snapshot never clobbers
/// notes added since.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Empty,
    Populated,
}

struct SubscriberEntry {
    id: u64,
    callback: Subscriber,
}

/// Single source of truth for a session's note metadata.
pub struct NoteStore {
    state: StoreState,
    list: Vec<NoteMeta>,
    normalized: Vec<NormalizedNoteMeta>,
    categorized: BTreeMap<String, Vec<NoteMeta>>,
    subscribers: Vec<SubscriberEntry>,
    next_subscriber_id: u64,
}

impl NoteStore {
    /// Create an empty store with no subscribers.
    pub fn new() -> Self {
        Self {
            state: StoreState::Empty,
            list: Vec::new(),
            normalized: Vec::new(),
            categorized: BTreeMap::new(),
            subscribers: Vec::new(),
            next_subscriber_id: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Notes sorted by publish date descending.
    pub fn list(&self) -> &[NoteMeta] {
        &self.list
    }

    /// Search projection, parallel to [`NoteStore::list`].
    pub fn normalized(&self) -> &[NormalizedNoteMeta] {
        &self.normalized
    }

    /// Notes grouped by category, list order preserved within each bucket.
    pub fn categorized(&self) -> &BTreeMap<String, Vec<NoteMeta>> {
        &self.categorized
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Populate the store from a snapshot of the user's notes.
    ///
    /// Sorts by publish date descending (stable for ties) and derives the
    /// other two views from the sorted order. Skipped entirely when the
    /// store is already populated, so repeated session bootstraps cannot
    /// clobber notes added in between.
    pub fn initialize(&mut self, notes: Vec<NoteMeta>) {
        if self.state == StoreState::Populated {
            tracing::debug!("note store already populated, skipping initialize");
            return;
        }
        let mut list = notes;
        sort_by_publish_date_desc(&mut list);
        self.normalized = normalized_projection(&list);
        self.categorized = categorize(&list);
        self.list = list;
        self.sync_state();
        self.notify();
    }

    /// Prepend a freshly created note to all three views.
    ///
    /// The note lands at the head of `list` and `normalized` and at the head
    /// of its category bucket (creating the bucket if new). Subscribers run
    /// once, after all three views are in place.
    pub fn add(&mut self, note: NoteMeta) {
        self.normalized.insert(0, NormalizedNoteMeta::from(&note));
        let bucket = self
            .categorized
            .entry(note.effective_category().to_string())
            .or_default();
        bucket.insert(0, note.clone());
        self.list.insert(0, note);
        self.sync_state();
        self.notify();
    }

    /// Drop the note with `slug` from every view.
    ///
    /// `categorized` is recomputed from the filtered list rather than edited
    /// in place, so emptied buckets disappear instead of lingering. Unknown
    /// slugs leave the views unchanged.
    pub fn remove(&mut self, slug: &str) {
        self.list.retain(|note| note.slug != slug);
        self.normalized.retain(|note| note.slug != slug);
        self.categorized = categorize(&self.list);
        self.sync_state();
        self.notify();
    }

    /// Replace the entry matching `note.id` and re-derive every view.
    ///
    /// The supplied metadata is the authoritative post-update row, so the
    /// matched entry is replaced wholesale. The list is re-sorted (the
    /// update may have changed the slug or category) and the derived views
    /// rebuilt from the new order. A missing id leaves the set unchanged.
    pub fn update(&mut self, note: NoteMeta) {
        if let Some(existing) = self.list.iter_mut().find(|entry| entry.id == note.id) {
            *existing = note;
        }
        sort_by_publish_date_desc(&mut self.list);
        self.normalized = normalized_projection(&self.list);
        self.categorized = categorize(&self.list);
        self.notify();
    }

    /// Register a callback invoked with the store after every mutation.
    pub fn subscribe(&mut self, callback: Subscriber) -> SubscriptionId {
        let id = self.next_subscriber_id;
        self.next_subscriber_id += 1;
        self.subscribers.push(SubscriberEntry { id, callback });
        SubscriptionId(id)
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|entry| entry.id != id.0);
        self.subscribers.len() != before
    }

    fn sync_state(&mut self) {
        self.state = if self.list.is_empty() {
            StoreState::Empty
        } else {
            StoreState::Populated
        };
    }

    fn notify(&mut self) {
        // Subscribers get a shared borrow of the store, so the list is moved
        // out for the duration of the calls.
        let mut subscribers = std::mem::take(&mut self.subscribers);
        for entry in &mut subscribers {
            (entry.callback)(self);
        }
        self.subscribers = subscribers;
    }
}

impl Default for NoteStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_by_publish_date_desc(list: &mut [NoteMeta]) {
    list.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
}

fn normalized_projection(list: &[NoteMeta]) -> Vec<NormalizedNoteMeta> {
    list.iter().map(NormalizedNoteMeta::from).collect()
}

fn categorize(list: &[NoteMeta]) -> BTreeMap<String, Vec<NoteMeta>> {
    let mut buckets: BTreeMap<String, Vec<NoteMeta>> = BTreeMap::new();
    for note in list {
        buckets
            .entry(note.effective_category().to_string())
            .or_default()
            .push(note.clone());
    }
    buckets
}
