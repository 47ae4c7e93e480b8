#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use common::{signed_out, GatedStore};
use sitecontent_core::model::{HeroContent, StatsContent};
use sitecontent_core::{
    fields, Collection, ExError, ExErrorKind, LandingPage, MemoryStore, SectionId, SectionRecord,
};

#[tokio::test]
async fn test_empty_store_renders_fallbacks() {
    // GIVEN a store with no rows
    let page = LandingPage::new(Arc::new(MemoryStore::new()), signed_out());

    // WHEN the page mounts
    page.mount().await;
    let view = page.view();

    // THEN every section shows its fallback copy
    assert!(!view.loading);
    assert_eq!(view.hero, HeroContent::fallback());
    assert_eq!(view.cta, HeroContent::fallback());
    assert_eq!(view.stats, StatsContent::fallback());
    assert_eq!(view.mission.mission_text, "");
    assert!(view.errors.is_empty());
}

#[tokio::test]
async fn test_stored_fields_override_fallbacks() {
    let store = Arc::new(MemoryStore::new());
    store.insert_raw(
        Collection::Hero,
        SectionRecord::new(
            "hero",
            fields! { "title" => "Reviving the Soul of Bharat", "cta_primary" => "" },
        ),
    );
    store.insert_raw(
        Collection::Stats,
        SectionRecord::new("stats", fields! { "villages" => 0, "programs_active" => 18 }),
    );
    let page = LandingPage::new(store, signed_out());

    page.mount().await;
    let view = page.view();

    assert_eq!(view.hero.title, "Reviving the Soul of Bharat");
    // Empty text keeps the fallback
    assert_eq!(view.hero.cta_primary, "Join the Movement");
    assert_eq!(view.cta.title, view.hero.title);
    // Zero is a real value for a counter
    assert_eq!(view.stats.villages, 0);
    assert_eq!(view.stats.programs_active, 18);
    assert_eq!(view.stats.women_skilled, 2000);
}

#[tokio::test]
async fn test_failed_section_is_reported_and_page_still_renders() {
    let store = Arc::new(MemoryStore::new());
    store.fail_with(ExError::new(ExErrorKind::Timeout).with_message("request timed out"));
    let page = LandingPage::new(store, signed_out());

    page.mount().await;
    let view = page.view();

    assert_eq!(view.errors.len(), 4);
    assert!(view
        .errors
        .iter()
        .any(|(section, message)| *section == SectionId::Cta && message == "request timed out"));
    assert_eq!(view.stats, StatsContent::fallback());
}

#[tokio::test]
async fn test_page_is_loading_while_any_fetch_is_pending() {
    let store = Arc::new(GatedStore::new());
    let page = Arc::new(LandingPage::new(store.clone(), signed_out()));
    assert!(!page.is_loading());

    let mounting = {
        let page = page.clone();
        tokio::spawn(async move { page.mount().await })
    };

    // Wait until the mount has started its fetches
    while !page.is_loading() {
        tokio::task::yield_now().await;
    }
    assert!(page.view().loading);

    for _ in 0..4 {
        store.release();
    }
    mounting.await.unwrap();
    assert!(!page.is_loading());
}
