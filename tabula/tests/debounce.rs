//! Debounced input timing. Uses tokio's paused clock, so sleeps are instant
//! and deterministic.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tabula::debounce::DebouncedInput;
use tokio::time::sleep;

const DELAY: Duration = Duration::from_millis(300);

fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(String) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |value| sink.lock().unwrap().push(value))
}

fn seen(values: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    values.lock().unwrap().clone()
}

#[tokio::test(start_paused = true)]
async fn test_only_last_edit_fires_after_quiet_period() {
    let (values, on_change) = recorder();
    let mut input = DebouncedInput::new("", DELAY, on_change);

    input.edit("b");
    sleep(Duration::from_millis(100)).await;
    input.edit("bo");
    sleep(Duration::from_millis(100)).await;
    input.edit("bolt");
    assert_eq!(input.draft(), "bolt");

    sleep(Duration::from_millis(299)).await;
    assert!(seen(&values).is_empty());
    assert!(input.is_pending());

    sleep(Duration::from_millis(10)).await;
    assert_eq!(seen(&values), vec!["bolt"]);
    assert!(!input.is_pending());

    // Nothing else is queued
    sleep(Duration::from_secs(5)).await;
    assert_eq!(seen(&values).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_flush_fires_now_and_only_once() {
    let (values, on_change) = recorder();
    let mut input = DebouncedInput::new("", DELAY, on_change);

    input.edit("nut");
    input.flush();
    assert_eq!(seen(&values), vec!["nut"]);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(seen(&values), vec!["nut"]);

    // Nothing pending, nothing to flush
    input.flush();
    assert_eq!(seen(&values).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_drops_pending_change() {
    let (values, on_change) = recorder();
    let mut input = DebouncedInput::new("", DELAY, on_change);

    input.edit("washer");
    input.cancel();
    sleep(Duration::from_secs(1)).await;
    assert!(seen(&values).is_empty());
    assert_eq!(input.draft(), "washer");
}

#[tokio::test(start_paused = true)]
async fn test_dropping_input_releases_timer() {
    let (values, on_change) = recorder();
    let mut input = DebouncedInput::new("", DELAY, on_change);

    input.edit("hinge");
    drop(input);
    sleep(Duration::from_secs(1)).await;
    assert!(seen(&values).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_echo_of_own_value_keeps_draft() {
    let (values, on_change) = recorder();
    let mut input = DebouncedInput::new("", DELAY, on_change);

    input.edit("bolt");
    sleep(Duration::from_millis(400)).await;
    assert_eq!(seen(&values), vec!["bolt"]);

    // The user keeps typing before the owner catches up
    input.edit("bolts");
    input.sync_external("bolt");
    assert_eq!(input.draft(), "bolts");
    assert!(input.is_pending());

    sleep(Duration::from_millis(400)).await;
    assert_eq!(seen(&values), vec!["bolt", "bolts"]);
}

#[tokio::test(start_paused = true)]
async fn test_out_of_band_change_overwrites_draft() {
    let (values, on_change) = recorder();
    let mut input = DebouncedInput::new("hex", DELAY, on_change);

    input.edit("hex b");
    input.sync_external("");
    assert_eq!(input.draft(), "");
    assert!(!input.is_pending());

    sleep(Duration::from_secs(1)).await;
    assert!(seen(&values).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_owner_clear_after_reported_value_overwrites_draft() {
    let (values, on_change) = recorder();
    let mut input = DebouncedInput::new("", DELAY, on_change);

    input.edit("part-1");
    sleep(Duration::from_millis(400)).await;
    assert_eq!(seen(&values), vec!["part-1"]);

    // The owner clears its value before this input ever saw "part-1" echoed
    input.sync_external("");
    assert_eq!(input.draft(), "");
    assert!(!input.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_reset_clears_draft_even_when_owner_value_unchanged() {
    let (values, on_change) = recorder();
    let mut input = DebouncedInput::new("", DELAY, on_change);

    input.edit("nu");
    input.reset("");
    assert_eq!(input.draft(), "");

    sleep(Duration::from_secs(1)).await;
    assert!(seen(&values).is_empty());
}

#[test]
fn test_edit_outside_runtime_reports_immediately() {
    let (values, on_change) = recorder();
    let mut input = DebouncedInput::with_default_delay("", on_change);
    assert_eq!(input.delay(), DELAY);

    input.edit("bolt");
    assert_eq!(seen(&values), vec!["bolt"]);
    assert!(!input.is_pending());
}
