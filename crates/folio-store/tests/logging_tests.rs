// Structured logging emitted by persistence context operations

use folio_core::logging_facility::test_capture::init_test_capture;
use folio_core::model::Creator;
use folio_store::db::open_in_memory;
use folio_store::PersistenceContext;

#[test]
fn test_merge_and_commit_emit_start_and_end() {
    // Given: Test capture and a fresh context
    let capture = init_test_capture();
    let mut conn = open_in_memory().unwrap();
    let mut ctx = PersistenceContext::new(&mut conn).unwrap();

    // When: A new Creator is merged and committed
    ctx.merge(&Creator::new("Daniel Abraham")).unwrap();
    ctx.commit().unwrap();

    // Then: Both operations logged their lifecycle
    capture.assert_event_exists("merge", "start");
    capture.assert_event_exists("merge", "end");
    capture.assert_event_exists("commit", "start");
    capture.assert_event_exists("commit", "end");

    let end = capture
        .events_for_op("commit")
        .into_iter()
        .find(|e| e.event.as_deref() == Some("end"))
        .unwrap();
    assert!(end.field("duration_ms").is_some());
    assert!(end.field("rows_affected").is_some());
}

#[test]
fn test_failed_remove_emits_end_error() {
    let capture = init_test_capture();
    let mut conn = open_in_memory().unwrap();
    let mut ctx = PersistenceContext::new(&mut conn).unwrap();

    ctx.remove_creator(404).unwrap_err();

    let errors = capture.count_events(|e| {
        e.op.as_deref() == Some("remove_creator")
            && e.event.as_deref() == Some("end_error")
            && e.field("err_code") == Some("ERR_NOT_FOUND")
    });
    assert!(errors >= 1);
}
