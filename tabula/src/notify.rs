//! Notification channel for mutation outcomes.
//!
//! The engine reports delete results through a [`Notifier`]. [`ToastQueue`]
//! is an in-memory implementation: an explicit store object passed to
//! whoever needs it, rather than process-wide error state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default duration for toast notifications.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(4);

/// Toast notification level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToastLevel {
    #[default]
    Info,
    Success,
    Error,
}

/// A toast notification.
///
/// # Example
///
/// ```
/// use tabula::notify::{Toast, ToastLevel};
///
/// let toast = Toast::error("Delete failed").with_body("HTTP 500");
/// assert_eq!(toast.level, ToastLevel::Error);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    /// Title to display (single line)
    pub title: String,
    /// Optional body text (can be multi-line)
    pub body: Option<String>,
    /// How long to show the toast.
    pub duration: Duration,
}

impl Toast {
    fn new(level: ToastLevel, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            body: None,
            duration: DEFAULT_TOAST_DURATION,
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(ToastLevel::Info, title)
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(ToastLevel::Success, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(ToastLevel::Error, title)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl From<String> for Toast {
    fn from(message: String) -> Self {
        Toast::info(message)
    }
}

impl From<&str> for Toast {
    fn from(message: &str) -> Self {
        Toast::info(message)
    }
}

/// Receives toasts from the engine.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, toast: Toast) {
        (**self).notify(toast)
    }
}

#[derive(Debug, Default)]
struct QueueInner {
    pending: Vec<Toast>,
    last_error: Option<String>,
}

/// In-memory toast channel with a sticky last error.
///
/// Cheap to clone; clones share the queue. Error toasts also set
/// `last_error`, which stays until dismissed so a banner can show it.
#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    inner: Arc<Mutex<QueueInner>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all pending toasts.
    pub fn drain(&self) -> Vec<Toast> {
        self.inner
            .lock()
            .map(|mut inner| std::mem::take(&mut inner.pending))
            .unwrap_or_default()
    }

    /// Number of toasts waiting to be shown.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.pending.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most recent error, until dismissed.
    pub fn last_error(&self) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.last_error.clone())
    }

    pub fn dismiss_error(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.last_error = None;
        }
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, toast: Toast) {
        if let Ok(mut inner) = self.inner.lock() {
            if toast.level == ToastLevel::Error {
                inner.last_error = Some(match &toast.body {
                    Some(body) => format!("{}: {}", toast.title, body),
                    None => toast.title.clone(),
                });
            }
            log::debug!("ToastQueue: queued {:?} toast", toast.level);
            inner.pending.push(toast);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drains_in_order() {
        let queue = ToastQueue::new();
        queue.notify(Toast::info("one"));
        queue.notify("two".into());
        let titles: Vec<String> = queue.drain().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["one", "two"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_error_is_sticky_until_dismissed() {
        let queue = ToastQueue::new();
        queue.notify(Toast::error("Delete failed").with_body("timeout"));
        queue.drain();
        assert_eq!(queue.last_error().as_deref(), Some("Delete failed: timeout"));
        queue.dismiss_error();
        assert_eq!(queue.last_error(), None);
    }

    #[test]
    fn test_separate_queues_are_independent() {
        let a = ToastQueue::new();
        let b = ToastQueue::new();
        a.notify(Toast::error("a"));
        assert!(b.last_error().is_none());
        assert_eq!(a.clone().len(), 1);
    }
}
