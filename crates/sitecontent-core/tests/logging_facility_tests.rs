#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use sitecontent_core::core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, OP_FETCH, OP_UPDATE,
};
use sitecontent_core::errors::{ContentError, ExErrorKind};
use sitecontent_core::logging_facility::test_capture::init_test_capture;
use sitecontent_core::{
    fields, log_op_end, log_op_error, log_op_start, AnonymousSession, ContentAccessor, ExError,
    MemoryStore, SectionId, Session, StaticSession,
};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, section = "hero");

    let events = capture.events_for(op_name, "hero");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events();
    let end_event = events
        .iter()
        .find(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END))
        .expect("Should have end event");
    assert_eq!(end_event.fields.get("duration_ms"), Some(&"42".to_string()));
}

#[test]
fn test_log_op_error_includes_kind_and_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    log_op_error!(op_name, ContentError::AuthenticationRequired, duration_ms = 1);

    let events = capture.events();
    let error_event = events
        .iter()
        .find(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event");
    assert_eq!(
        error_event.fields.get("err.code"),
        Some(&"ERR_UNAUTHORISED".to_string())
    );
    assert_eq!(
        error_event.fields.get("err.kind"),
        Some(&format!("{:?}", ExErrorKind::Unauthorised))
    );
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_test_capture_assert_event_exists_fails() {
    let capture = init_test_capture();
    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}

// Each accessor test below uses its own section so parallel tests do not
// see each other's events.

#[tokio::test]
async fn test_fetch_emits_start_and_end() {
    let capture = init_test_capture();
    let acc = ContentAccessor::new(
        SectionId::Mission,
        Arc::new(MemoryStore::new()),
        Arc::new(AnonymousSession),
    );

    acc.fetch().await.unwrap();

    let events = capture.events_for(OP_FETCH, "mission");
    let starts = events
        .iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_START))
        .count();
    let ends: Vec<_> = events
        .iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();
    assert_eq!(starts, 1);
    assert_eq!(ends.len(), 1);
    assert!(ends[0].fields.contains_key("duration_ms"));
    assert_eq!(ends[0].fields.get("found"), Some(&"false".to_string()));
}

#[tokio::test]
async fn test_failed_fetch_emits_error_code() {
    let capture = init_test_capture();
    let store = Arc::new(MemoryStore::new());
    store.fail_with(ExError::new(ExErrorKind::Timeout).with_message("timed out"));
    let acc = ContentAccessor::new(SectionId::Contact, store, Arc::new(AnonymousSession));

    assert!(acc.fetch().await.is_err());

    let errors: Vec<_> = capture
        .events_for(OP_FETCH, "contact")
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].fields.get("err.code"),
        Some(&"ERR_TIMEOUT".to_string())
    );
    assert_eq!(
        errors[0].fields.get("err.message"),
        Some(&"timed out".to_string())
    );
}

#[tokio::test]
async fn test_update_logs_field_count_without_values() {
    let capture = init_test_capture();
    let acc = ContentAccessor::new(
        SectionId::Stats,
        Arc::new(MemoryStore::new()),
        Arc::new(StaticSession::new(Session::new("editor", "secret-token"))),
    );

    acc.update(fields! { "villages" => 120, "programs_active" => 16 })
        .await
        .unwrap();

    let events = capture.events_for(OP_UPDATE, "stats");
    let start = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_START))
        .expect("Should have update start");
    assert_eq!(start.fields.get("field_count"), Some(&"2".to_string()));
    assert!(events
        .iter()
        .all(|e| e.fields.values().all(|v| !v.contains("secret-token"))));
    capture.assert_event_exists(OP_UPDATE, EVENT_END);
}
