#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use common::{signed_in, signed_out};
use sitecontent_core::model::ContactContent;
use sitecontent_core::{
    fields, Collection, Consistency, ContentManager, ExError, ExErrorKind, MemoryStore,
    NotificationLevel, SectionContent, SectionRecord,
};

fn store_with_rows() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert_raw(
        Collection::Hero,
        SectionRecord::new("hero", fields! { "title" => "Reviving" }),
    );
    store.insert_raw(
        Collection::Stats,
        SectionRecord::new("stats", fields! { "villages" => 120 }),
    );
    store
}

#[tokio::test]
async fn test_mount_syncs_drafts_from_store() {
    // GIVEN stored hero and stats rows
    let mut manager = ContentManager::new(store_with_rows(), signed_in());

    // WHEN the manager mounts
    manager.mount().await;

    // THEN drafts hold stored values over empty form defaults
    let hero = manager.draft(Collection::Hero).as_hero().unwrap();
    assert_eq!(hero.title, "Reviving");
    assert_eq!(hero.subtitle, "");
    let stats = manager.draft(Collection::Stats).as_stats().unwrap();
    assert_eq!(stats.villages, 120);
    assert_eq!(stats.women_skilled, 0);
    assert_eq!(
        manager.draft(Collection::Contact),
        &SectionContent::Contact(ContactContent::default())
    );
    assert!(!manager.is_loading());
}

#[tokio::test]
async fn test_save_writes_draft_and_reports_success() {
    let store = store_with_rows();
    let mut manager = ContentManager::new(store.clone(), signed_in());
    manager.mount().await;

    if let SectionContent::Stats(stats) = manager.draft_mut(Collection::Stats) {
        assert!(stats.set_from_input("women_skilled", "2500"));
        assert!(stats.set_from_input("programs_active", "not a number"));
    }
    let note = manager.save(Collection::Stats).await;

    assert_eq!(note.level, NotificationLevel::Success);
    assert_eq!(note.message, "Statistics updated successfully");

    let stored = manager
        .accessor(Collection::Stats)
        .fetch()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.integer("villages"), Some(120));
    assert_eq!(stored.integer("women_skilled"), Some(2500));
    assert_eq!(stored.integer("programs_active"), Some(0));
}

#[tokio::test]
async fn test_save_messages_per_section() {
    let manager = ContentManager::new(Arc::new(MemoryStore::new()), signed_in());

    let cases = [
        (Collection::Hero, "Hero section updated successfully"),
        (Collection::Mission, "Mission section updated successfully"),
        (Collection::Stats, "Statistics updated successfully"),
        (Collection::Contact, "Contact information updated successfully"),
    ];
    for (collection, expected) in cases {
        let note = manager.save(collection).await;
        assert!(note.is_success(), "{:?}", collection);
        assert_eq!(note.message, expected);
    }
}

#[tokio::test]
async fn test_save_without_session_reports_failure() {
    let store = Arc::new(MemoryStore::new());
    let manager = ContentManager::new(store.clone(), signed_out());

    let cases = [
        (Collection::Hero, "Failed to update hero section"),
        (Collection::Mission, "Failed to update mission section"),
        (Collection::Stats, "Failed to update statistics"),
        (Collection::Contact, "Failed to update contact information"),
    ];
    for (collection, expected) in cases {
        let note = manager.save(collection).await;
        assert_eq!(note.level, NotificationLevel::Error);
        assert_eq!(note.message, expected);
    }
    assert_eq!(store.write_count(), 0);
    assert_eq!(
        manager.accessor(Collection::Hero).error().as_deref(),
        Some("Authentication required")
    );
}

#[tokio::test]
async fn test_refresh_keeps_draft_of_failed_section() {
    let store = store_with_rows();
    let mut manager = ContentManager::new(store.clone(), signed_in());
    manager.mount().await;

    // Local edit, then a refresh against a failing store
    if let SectionContent::Hero(hero) = manager.draft_mut(Collection::Hero) {
        hero.title = "Unsaved edit".to_string();
    }
    store.fail_with(ExError::new(ExErrorKind::ExternalService).with_message("503"));
    manager.refresh_all().await;

    assert_eq!(
        manager.draft(Collection::Hero).as_hero().unwrap().title,
        "Unsaved edit"
    );
    assert!(manager.accessor(Collection::Hero).error().is_some());

    // A successful refresh re-syncs from the store
    store.clear_failure();
    manager.refresh_all().await;
    assert_eq!(
        manager.draft(Collection::Hero).as_hero().unwrap().title,
        "Reviving"
    );
}

#[tokio::test]
async fn test_refresh_with_no_row_keeps_unsaved_draft() {
    // GIVEN a contact section that has never been saved
    let mut manager = ContentManager::new(Arc::new(MemoryStore::new()), signed_in());
    manager.mount().await;

    // WHEN the editor types into it and refreshes everything
    if let SectionContent::Contact(contact) = manager.draft_mut(Collection::Contact) {
        contact.email = "typed@example.org".to_string();
    }
    manager.refresh_all().await;

    // THEN the fetch found no row and the typed value survives
    assert_eq!(manager.accessor(Collection::Contact).content(), None);
    assert_eq!(
        manager.draft(Collection::Contact).as_contact().unwrap().email,
        "typed@example.org"
    );
}

#[tokio::test]
async fn test_consistency_applies_to_every_section() {
    // GIVEN a manager configured for read-after-write
    let store = Arc::new(MemoryStore::new());
    let manager = ContentManager::new(store.clone(), signed_in())
        .with_consistency(Consistency::ReadAfterWrite);

    for collection in Collection::ALL {
        assert_eq!(
            manager.accessor(collection).consistency(),
            Consistency::ReadAfterWrite
        );
    }

    // WHEN a section is saved
    let reads_before = store.read_count();
    assert!(manager.save(Collection::Mission).await.is_success());

    // THEN the write is followed by one read-back
    assert_eq!(store.read_count(), reads_before + 1);
}

#[tokio::test]
async fn test_set_draft_routes_by_content() {
    let mut manager = ContentManager::new(Arc::new(MemoryStore::new()), signed_in());
    let contact = ContactContent {
        email: "info@example.org".to_string(),
        ..ContactContent::default()
    };

    manager.set_draft(SectionContent::Contact(contact.clone()));
    let note = manager.save(Collection::Contact).await;

    assert!(note.is_success());
    let stored = manager.accessor(Collection::Contact).content().unwrap();
    assert_eq!(stored.text("email"), Some("info@example.org"));
    assert_eq!(manager.draft(Collection::Contact).as_contact(), Some(&contact));
}
