//! Debounced text input.
//!
//! Edits land in a local draft immediately; the change callback only runs
//! once input has been quiet for the configured delay. The pending timer is
//! a task handle owned by a guard that aborts it on drop, so rescheduling,
//! cancelling and dropping the input all release it deterministically.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::DEFAULT_DEBOUNCE_DELAY_MS;

type ChangeCallback = Arc<dyn Fn(String) + Send + Sync>;

/// A scheduled callback. Dropping it cancels the callback.
struct PendingChange {
    handle: JoinHandle<()>,
}

impl Drop for PendingChange {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A text value whose changes are reported after a quiet period.
///
/// # Example
///
/// ```ignore
/// let store = table_store.clone();
/// let mut input = DebouncedInput::new("", Duration::from_millis(300), move |text| {
///     store.set_filter_text(text);
/// });
///
/// input.edit("b");
/// input.edit("bo");
/// input.edit("bolt"); // only "bolt" reaches the store, 300ms from now
/// ```
pub struct DebouncedInput {
    draft: String,
    delay: Duration,
    on_change: ChangeCallback,
    /// The value the owner is known to hold: the last one seen from it or
    /// reported to it, whichever came later.
    known: Arc<Mutex<String>>,
    pending: Option<PendingChange>,
}

impl DebouncedInput {
    /// Create an input showing `initial`.
    ///
    /// Scheduling needs a tokio runtime; outside one, edits are reported
    /// immediately.
    pub fn new(
        initial: impl Into<String>,
        delay: Duration,
        on_change: impl Fn(String) + Send + Sync + 'static,
    ) -> Self {
        let initial = initial.into();
        Self {
            draft: initial.clone(),
            delay,
            on_change: Arc::new(on_change),
            known: Arc::new(Mutex::new(initial)),
            pending: None,
        }
    }

    /// Create an input with the default 300ms delay.
    pub fn with_default_delay(
        initial: impl Into<String>,
        on_change: impl Fn(String) + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            initial,
            Duration::from_millis(DEFAULT_DEBOUNCE_DELAY_MS),
            on_change,
        )
    }

    /// The text currently shown.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a change is waiting for the quiet period to end.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// Replace the draft and (re)start the quiet period.
    pub fn edit(&mut self, value: impl Into<String>) {
        self.draft = value.into();
        // Drop the old guard first: at most one timer is ever live
        self.pending = None;

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::warn!("DebouncedInput: no tokio runtime, reporting edit immediately");
            self.emit(self.draft.clone());
            return;
        };

        // The quiet period starts now, not when the task is first polled
        let deadline = tokio::time::Instant::now() + self.delay;
        let value = self.draft.clone();
        let on_change = Arc::clone(&self.on_change);
        let known = Arc::clone(&self.known);
        let handle = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            report(&known, &on_change, value);
        });
        self.pending = Some(PendingChange { handle });
    }

    /// Report the draft now if a change is pending.
    pub fn flush(&mut self) {
        let pending = self.is_pending();
        self.pending = None;
        if pending {
            self.emit(self.draft.clone());
        }
    }

    /// Drop any pending change without reporting it.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("DebouncedInput: pending change cancelled");
        }
    }

    /// Follow the owner's value.
    ///
    /// When the owner's value changes for any reason other than this input
    /// reporting it (a "reset filters" action, a restored state), the draft
    /// is overwritten and any pending change is dropped. An echo of the
    /// value this input last reported leaves the draft alone, since the user
    /// may have kept typing.
    pub fn sync_external(&mut self, value: &str) {
        {
            let Ok(mut known) = self.known.lock() else {
                return;
            };
            if *known == value {
                return;
            }
            *known = value.to_string();
        }

        log::debug!("DebouncedInput: resynced to external value");
        self.pending = None;
        self.draft = value.to_string();
    }

    /// Overwrite both the draft and the known owner value, dropping any
    /// pending change. For resets the owner initiates itself.
    pub fn reset(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.pending = None;
        if let Ok(mut known) = self.known.lock() {
            *known = value.clone();
        }
        self.draft = value;
    }

    fn emit(&mut self, value: String) {
        report(&self.known, &self.on_change, value);
    }
}

fn report(known: &Mutex<String>, on_change: &ChangeCallback, value: String) {
    if let Ok(mut guard) = known.lock() {
        *guard = value.clone();
    }
    on_change(value);
}

impl fmt::Debug for DebouncedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebouncedInput")
            .field("draft", &self.draft)
            .field("delay", &self.delay)
            .field("known", &self.known)
            .field("pending", &self.is_pending())
            .finish()
    }
}
