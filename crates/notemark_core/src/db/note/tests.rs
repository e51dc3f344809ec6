//! Unit tests for note storage operations.

use crate::models::note::{NoteMeta, NoteUpdate};
use crate::test_support::setup_temp_db;
use crate::AppError;
use chrono::{TimeZone, Utc};

fn meta_at(user_id: &str, slug: &str, title: &str, year: i32, month: u32) -> NoteMeta {
    let mut meta = NoteMeta::new(user_id.to_string(), slug.to_string(), title.to_string());
    meta.publish_date = Utc
        .with_ymd_and_hms(year, month, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    meta
}

#[test]
fn create_and_fetch_round_trip() {
    let (db, _dir) = setup_temp_db();
    let meta = meta_at("user-1", "first-note", "First Note", 2024, 3);
    db.notes
        .create(&meta, "# First Note\n\nHello there.")
        .expect("create note");

    let fetched = db
        .notes
        .get_meta_by_slug("first-note")
        .expect("get by slug")
        .expect("note should exist");
    assert_eq!(fetched, meta);

    let (joined_meta, content) = db
        .notes
        .get_with_content("first-note")
        .expect("get with content")
        .expect("note should exist");
    assert_eq!(joined_meta.id, meta.id);
    assert_eq!(content, "# First Note\n\nHello there.");

    assert!(db.notes.slug_exists("first-note").expect("slug probe"));
    assert!(!db.notes.slug_exists("other-note").expect("slug probe"));
}

#[test]
fn create_rejects_duplicate_slug() {
    let (db, _dir) = setup_temp_db();
    let first = meta_at("user-1", "shared-slug", "Shared", 2024, 1);
    db.notes.create(&first, "body one").expect("create first");

    let second = meta_at("user-2", "shared-slug", "Shared Again", 2024, 2);
    let err = db
        .notes
        .create(&second, "body two")
        .expect_err("duplicate slug must be rejected");
    assert!(
        matches!(err, AppError::Conflict(ref message)
            if message == "A note with this title already exists"),
        "unexpected create error: {}",
        err
    );
}

#[test]
fn failed_create_leaves_no_partial_rows() {
    let (db, _dir) = setup_temp_db();
    let first = meta_at("user-1", "taken", "Taken", 2024, 1);
    db.notes.create(&first, "original body").expect("create");

    let second = meta_at("user-1", "taken", "Taken Again", 2024, 2);
    let second_id = second.id.clone();
    db.notes
        .create(&second, "conflicting body")
        .expect_err("duplicate slug must be rejected");

    assert!(
        db.notes
            .get_meta(second_id.as_str())
            .expect("get meta")
            .is_none(),
        "rejected create must not leave a metadata row"
    );
    let (_meta, content) = db
        .notes
        .get_with_content("taken")
        .expect("get with content")
        .expect("original should remain");
    assert_eq!(content, "original body");
    assert_eq!(
        db.notes.list_for_user("user-1").expect("list").len(),
        1,
        "rejected create must not leave index rows"
    );
}

#[test]
fn update_merges_fields_and_keeps_body() {
    let (db, _dir) = setup_temp_db();
    let mut meta = meta_at("user-1", "my-note", "My Note", 2024, 4);
    meta.description = Some("old summary".to_string());
    db.notes.create(&meta, "the body").expect("create");

    let updated = db
        .notes
        .update(
            meta.id.as_str(),
            &NoteUpdate {
                category: Some("Ideas".to_string()),
                ..NoteUpdate::default()
            },
        )
        .expect("update")
        .expect("note should exist");

    assert_eq!(updated.category.as_deref(), Some("Ideas"));
    assert_eq!(updated.description.as_deref(), Some("old summary"));
    assert_eq!(updated.title, "My Note");

    let (_meta, content) = db
        .notes
        .get_with_content("my-note")
        .expect("get with content")
        .expect("note should exist");
    assert_eq!(content, "the body", "patch without content must keep body");
}

#[test]
fn update_rewrites_slug_index_when_slug_changes() {
    let (db, _dir) = setup_temp_db();
    let meta = meta_at("user-1", "old-slug", "Old Title", 2024, 5);
    db.notes.create(&meta, "body").expect("create");

    let updated = db
        .notes
        .update(
            meta.id.as_str(),
            &NoteUpdate {
                slug: Some("new-slug".to_string()),
                title: Some("New Title".to_string()),
                ..NoteUpdate::default()
            },
        )
        .expect("update")
        .expect("note should exist");
    assert_eq!(updated.slug, "new-slug");

    assert!(!db.notes.slug_exists("old-slug").expect("slug probe"));
    let (fetched, content) = db
        .notes
        .get_with_content("new-slug")
        .expect("get with content")
        .expect("note should resolve under new slug");
    assert_eq!(fetched.id, meta.id);
    assert_eq!(content, "body");
}

#[test]
fn update_rejects_slug_taken_by_another_note() {
    let (db, _dir) = setup_temp_db();
    let first = meta_at("user-1", "first", "First", 2024, 1);
    let second = meta_at("user-1", "second", "Second", 2024, 2);
    db.notes.create(&first, "first body").expect("create first");
    db.notes
        .create(&second, "second body")
        .expect("create second");

    let err = db
        .notes
        .update(
            second.id.as_str(),
            &NoteUpdate {
                slug: Some("first".to_string()),
                ..NoteUpdate::default()
            },
        )
        .expect_err("slug collision must abort the update");
    assert!(
        matches!(err, AppError::StorageMessage(ref message) if message.contains("already exists")),
        "unexpected update error: {}",
        err
    );

    let unchanged = db
        .notes
        .get_meta_by_slug("second")
        .expect("get by slug")
        .expect("second note must keep its slug");
    assert_eq!(unchanged.id, second.id);
}

#[test]
fn delete_removes_every_row() {
    let (db, _dir) = setup_temp_db();
    let meta = meta_at("user-1", "doomed", "Doomed", 2024, 6);
    db.notes.create(&meta, "body").expect("create");

    let deleted = db
        .notes
        .delete_and_return(meta.id.as_str())
        .expect("delete")
        .expect("note should exist");
    assert_eq!(deleted.slug, "doomed");

    assert!(db
        .notes
        .get_meta(meta.id.as_str())
        .expect("get meta")
        .is_none());
    assert!(!db.notes.slug_exists("doomed").expect("slug probe"));
    assert!(db.notes.list_for_user("user-1").expect("list").is_empty());
}

#[test]
fn delete_missing_returns_none() {
    let (db, _dir) = setup_temp_db();
    assert!(db
        .notes
        .delete_and_return("no-such-id")
        .expect("delete")
        .is_none());
}

#[test]
fn list_for_user_orders_by_publish_date_desc_and_filters_owner() {
    let (db, _dir) = setup_temp_db();
    let january = meta_at("user-1", "january", "January", 2024, 1);
    let june = meta_at("user-1", "june", "June", 2024, 6);
    let march = meta_at("user-1", "march", "March", 2024, 3);
    let foreign = meta_at("user-2", "foreign", "Foreign", 2024, 12);
    for (meta, body) in [
        (&january, "jan"),
        (&june, "jun"),
        (&march, "mar"),
        (&foreign, "other"),
    ] {
        db.notes.create(meta, body).expect("create");
    }

    let listed = db.notes.list_for_user("user-1").expect("list");
    let slugs: Vec<&str> = listed.iter().map(|meta| meta.slug.as_str()).collect();
    assert_eq!(slugs, vec!["june", "march", "january"]);
}
