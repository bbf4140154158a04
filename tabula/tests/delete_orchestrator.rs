//! Delete confirmation and mutation flow.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use common::{Part, RecordingMutation, part};
use tabula::prelude::*;

struct Fixture {
    store: TableStore<u32>,
    toasts: ToastQueue,
    mutation: Arc<RecordingMutation>,
    deletes: DeleteOrchestrator<Part>,
}

fn fixture(mutation: Arc<RecordingMutation>) -> Fixture {
    let store = TableStore::new(TableState::new(10, Vec::new()));
    let toasts = ToastQueue::new();
    let deletes = DeleteOrchestrator::new(store.clone(), Arc::clone(&mutation), toasts.clone());
    Fixture {
        store,
        toasts,
        mutation,
        deletes,
    }
}

fn select(store: &TableStore<u32>, ids: &[u32]) {
    store.update_selection(SelectionUpdate::TogglePage(ids.to_vec()));
}

#[tokio::test]
async fn test_single_delete_removes_id_from_selection() {
    let f = fixture(RecordingMutation::ok());
    select(&f.store, &[3, 7]);

    f.deletes.request_single(part(7, "hinge", "stock", 1)).unwrap();
    assert!(f.store.snapshot().delete_confirmation.is_open());

    let outcome = f.deletes.confirm().await;
    assert!(matches!(outcome, DeleteOutcome::Deleted(ref ids) if ids == &vec![7]));
    assert_eq!(f.mutation.calls(), vec![vec![7]]);

    let state = f.store.snapshot();
    assert_eq!(state.selection.ids(), BTreeSet::from([3]));
    assert!(!state.delete_confirmation.is_open());
    assert!(f.deletes.phase().is_idle());
}

#[tokio::test]
async fn test_single_delete_of_unselected_row() {
    let f = fixture(RecordingMutation::ok());
    select(&f.store, &[3]);

    f.deletes.request_single(part(7, "hinge", "stock", 1)).unwrap();
    f.deletes.confirm().await;
    assert_eq!(f.store.snapshot().selection.ids(), BTreeSet::from([3]));
}

#[tokio::test]
async fn test_bulk_target_is_captured_when_dialog_opens() {
    let f = fixture(RecordingMutation::ok());
    select(&f.store, &[3, 5, 9]);

    let captured = f.deletes.request_bulk().unwrap();
    assert_eq!(captured, BTreeSet::from([3, 5, 9]));

    // Selection changes after the dialog opened do not retarget it
    f.store.update_selection(SelectionUpdate::Toggle(11));
    f.store.update_selection(SelectionUpdate::Toggle(5));

    f.deletes.confirm().await;
    assert_eq!(f.mutation.calls(), vec![vec![3, 5, 9]]);
    assert_eq!(f.store.snapshot().selection.ids(), BTreeSet::from([11]));
}

#[tokio::test]
async fn test_bulk_with_empty_selection_is_rejected() {
    let f = fixture(RecordingMutation::ok());
    assert!(matches!(
        f.deletes.request_bulk(),
        Err(TableError::EmptySelection)
    ));
    assert!(f.deletes.phase().is_idle());
    assert!(!f.store.snapshot().delete_confirmation.is_open());
}

#[tokio::test]
async fn test_second_request_while_confirming_is_rejected() {
    let f = fixture(RecordingMutation::ok());
    select(&f.store, &[1]);
    f.deletes.request_single(part(2, "nut", "stock", 1)).unwrap();

    assert!(matches!(
        f.deletes.request_bulk(),
        Err(TableError::ConfirmationPending)
    ));
    assert_eq!(
        f.store.snapshot().delete_confirmation.target_ids(),
        vec![2]
    );
}

#[tokio::test]
async fn test_double_confirm_calls_mutation_once() {
    let f = fixture(RecordingMutation::gated());
    f.deletes.request_single(part(4, "washer", "stock", 1)).unwrap();

    let (first, second, ()) = tokio::join!(f.deletes.confirm(), f.deletes.confirm(), async {
        f.mutation.release()
    });

    assert!(matches!(first, DeleteOutcome::Deleted(_)));
    assert!(matches!(second, DeleteOutcome::Ignored));
    assert_eq!(f.mutation.calls().len(), 1);
    assert_eq!(f.toasts.drain().len(), 1);
}

#[tokio::test]
async fn test_confirm_while_in_flight_from_another_task() {
    let f = fixture(RecordingMutation::gated());
    f.deletes.request_single(part(4, "washer", "stock", 1)).unwrap();

    let handle = f.deletes.clone();
    let in_flight = tokio::spawn(async move { handle.confirm().await });
    tokio::task::yield_now().await;

    assert!(f.deletes.is_busy());
    assert!(f.store.snapshot().delete_confirmation.is_busy());
    assert!(matches!(f.deletes.confirm().await, DeleteOutcome::Ignored));
    // Cannot cancel once the mutation is running
    assert!(!f.deletes.cancel());

    f.mutation.release();
    assert!(matches!(
        in_flight.await.unwrap(),
        DeleteOutcome::Deleted(_)
    ));
    assert_eq!(f.mutation.calls().len(), 1);
}

#[tokio::test]
async fn test_failure_keeps_selection_and_reports_once() {
    let f = fixture(RecordingMutation::failing("HTTP 500"));
    select(&f.store, &[3, 5]);

    f.deletes.request_bulk().unwrap();
    let outcome = f.deletes.confirm().await;
    assert!(matches!(outcome, DeleteOutcome::Failed(ref err) if err.message == "HTTP 500"));

    let state = f.store.snapshot();
    assert_eq!(state.selection.ids(), BTreeSet::from([3, 5]));
    assert!(!state.delete_confirmation.is_open());
    assert!(f.deletes.phase().is_idle());

    let toasts = f.toasts.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Error);
    assert_eq!(toasts[0].body.as_deref(), Some("HTTP 500"));
    assert_eq!(
        f.toasts.last_error().as_deref(),
        Some("Failed to delete 2 records: HTTP 500")
    );
}

#[tokio::test]
async fn test_success_toast() {
    let f = fixture(RecordingMutation::ok());
    f.deletes.request_single(part(1, "bolt", "stock", 1)).unwrap();
    f.deletes.confirm().await;

    let toasts = f.toasts.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Success);
    assert_eq!(toasts[0].title, "Deleted 1 record");
}

#[tokio::test]
async fn test_cancel_returns_to_idle_without_side_effects() {
    let f = fixture(RecordingMutation::ok());
    select(&f.store, &[1, 2]);
    f.deletes.request_bulk().unwrap();

    assert!(f.deletes.cancel());
    assert!(f.deletes.phase().is_idle());
    assert!(!f.store.snapshot().delete_confirmation.is_open());
    assert_eq!(f.store.snapshot().selection.len(), 2);
    assert!(f.mutation.calls().is_empty());
    assert!(f.toasts.is_empty());

    // Nothing left to confirm
    assert!(matches!(f.deletes.confirm().await, DeleteOutcome::Ignored));
}

#[tokio::test]
async fn test_completion_after_dispose_is_ignored() {
    let f = fixture(RecordingMutation::gated());
    select(&f.store, &[8]);
    f.deletes.request_single(part(8, "shim", "stock", 1)).unwrap();
    let version = f.store.version();

    let (outcome, ()) = tokio::join!(f.deletes.confirm(), async {
        f.deletes.dispose();
        f.mutation.release();
    });

    assert!(matches!(outcome, DeleteOutcome::Disposed));
    assert!(f.deletes.is_disposed());
    assert!(f.toasts.is_empty());
    // Only the busy flag was written, before disposal
    assert_eq!(f.store.version(), version + 1);
    assert!(f.store.snapshot().selection.is_selected(&8));
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_confirm_returns_to_idle() {
    let f = fixture(RecordingMutation::gated());
    select(&f.store, &[6]);
    f.deletes.request_single(part(6, "rivet", "stock", 1)).unwrap();

    let timed_out =
        tokio::time::timeout(std::time::Duration::from_millis(10), f.deletes.confirm()).await;
    assert!(timed_out.is_err());

    assert!(f.deletes.phase().is_idle());
    assert!(!f.deletes.is_busy());
    let state = f.store.snapshot();
    assert!(!state.delete_confirmation.is_open());
    assert!(state.selection.is_selected(&6));
    assert!(f.toasts.is_empty());

    // The flow is usable again
    assert!(!f.deletes.cancel());
    f.deletes.request_single(part(6, "rivet", "stock", 1)).unwrap();
    assert!(f.deletes.cancel());
}
