//! Helper functions shared by note storage operations.

use crate::models::note::{NoteContent, NoteMeta, NoteUpdate};
use chrono::{DateTime, Utc};

pub(crate) fn reverse_timestamp_key(publish_date: DateTime<Utc>) -> u64 {
    // Pre-epoch timestamps are clamped to preserve total ordering semantics for
    // expected runtime data while avoiding negative->u64 underflow.
    let millis = publish_date.timestamp_millis().max(0) as u64;
    u64::MAX.saturating_sub(millis)
}

pub(super) fn apply_note_update(meta: &mut NoteMeta, update: &NoteUpdate) {
    if let Some(slug) = &update.slug {
        meta.slug = slug.clone();
    }
    if let Some(title) = &update.title {
        meta.title = title.clone();
    }
    if let Some(description) = &update.description {
        meta.description = normalize_optional_field(description);
    }
    if let Some(category) = &update.category {
        meta.category = normalize_optional_field(category);
    }
}

fn normalize_optional_field(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(super) fn deserialize_meta(bytes: &[u8]) -> Result<NoteMeta, bincode::Error> {
    bincode::deserialize(bytes)
}

pub(super) fn deserialize_content(bytes: &[u8]) -> Result<NoteContent, bincode::Error> {
    bincode::deserialize(bytes)
}

#[cfg(test)]
mod tests {
    use super::{apply_note_update, reverse_timestamp_key};
    use crate::models::note::{NoteMeta, NoteUpdate};
    use chrono::{TimeZone, Utc};

    #[test]
    fn reverse_timestamp_key_clamps_pre_epoch_values() {
        let pre_epoch = Utc
            .with_ymd_and_hms(1960, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(reverse_timestamp_key(pre_epoch), u64::MAX);
    }

    #[test]
    fn reverse_timestamp_key_orders_newer_first() {
        let older = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        let newer = Utc
            .with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        assert!(reverse_timestamp_key(newer) < reverse_timestamp_key(older));
    }

    #[test]
    fn apply_note_update_merges_present_fields_only() {
        let mut meta = NoteMeta::new(
            "user-1".to_string(),
            "old-slug".to_string(),
            "Old Title".to_string(),
        );
        meta.description = Some("old description".to_string());
        meta.category = Some("Old".to_string());
        let publish_date = meta.publish_date;

        apply_note_update(
            &mut meta,
            &NoteUpdate {
                slug: Some("new-slug".to_string()),
                title: Some("New Title".to_string()),
                description: None,
                category: Some("New".to_string()),
                content: None,
            },
        );

        assert_eq!(meta.slug, "new-slug");
        assert_eq!(meta.title, "New Title");
        assert_eq!(meta.description.as_deref(), Some("old description"));
        assert_eq!(meta.category.as_deref(), Some("New"));
        assert_eq!(meta.publish_date, publish_date);
    }

    #[test]
    fn apply_note_update_clears_fields_on_empty_strings() {
        let mut meta = NoteMeta::new(
            "user-1".to_string(),
            "slug".to_string(),
            "Title".to_string(),
        );
        meta.description = Some("something".to_string());
        meta.category = Some("Ideas".to_string());

        apply_note_update(
            &mut meta,
            &NoteUpdate {
                description: Some(String::new()),
                category: Some("   ".to_string()),
                ..NoteUpdate::default()
            },
        );

        assert!(meta.description.is_none());
        assert!(meta.category.is_none());
    }
}
