//! Shared handle to a table's state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::TableError;

use super::{DeleteTarget, Pagination, SelectionUpdate, SortKey, TableState};

/// Authoritative state holder for one table instance.
///
/// `TableStore` is cheap to clone; all clones share the same state. Updates
/// never mutate the current [`TableState`] in place: each one builds the
/// next state and swaps the snapshot, so a snapshot taken earlier can be
/// diffed against the new one (or compared with [`Arc::ptr_eq`]).
///
/// # Example
///
/// ```
/// use tabula::state::{TableState, TableStore};
///
/// let store: TableStore<u32> = TableStore::new(TableState::new(10, Vec::new()));
/// let before = store.snapshot();
/// store.set_filter_text("bolt");
/// assert_eq!(before.filter_text, "");
/// assert_eq!(store.snapshot().filter_text, "bolt");
/// assert!(store.is_dirty());
/// ```
#[derive(Debug)]
pub struct TableStore<K: Ord> {
    inner: Arc<RwLock<Arc<TableState<K>>>>,
    dirty: Arc<AtomicBool>,
    version: Arc<AtomicU64>,
}

impl<K: Ord> Clone for TableStore<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
            version: Arc::clone(&self.version),
        }
    }
}

impl<K: Ord + Clone + std::fmt::Debug> TableStore<K> {
    /// Create a store holding an initial state.
    pub fn new(state: TableState<K>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(state))),
            dirty: Arc::new(AtomicBool::new(false)),
            version: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The current state snapshot.
    pub fn snapshot(&self) -> Arc<TableState<K>> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Number of updates applied so far.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Check if the state has been modified since last check
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    fn apply(&self, label: &str, f: impl FnOnce(&TableState<K>) -> TableState<K>) {
        let _ = self.try_apply(label, |s| Ok(f(s)));
    }

    fn try_apply(
        &self,
        label: &str,
        f: impl FnOnce(&TableState<K>) -> Result<TableState<K>, TableError>,
    ) -> Result<(), TableError> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let current: &TableState<K> = &guard;
        let next = f(current)?;
        if next != *current {
            *guard = Arc::new(next);
            self.version.fetch_add(1, Ordering::SeqCst);
            self.dirty.store(true, Ordering::SeqCst);
            log::debug!("TableStore: {}", label);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------

    pub fn set_filter_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.apply("set_filter_text", |s| s.with_filter_text(text));
    }

    /// Replace the free-text query and clamp the page index against the
    /// number of rows the new query leaves.
    pub fn set_filter_text_clamped(
        &self,
        text: impl Into<String>,
        filtered_count: impl FnOnce(&TableState<K>) -> usize,
    ) {
        let text = text.into();
        self.apply("set_filter_text", |s| {
            let next = s.with_filter_text(text);
            let count = filtered_count(&next);
            next.with_page_clamped(count)
        });
    }

    pub fn set_column_filter(&self, column_id: &str, value: impl Into<String>) {
        let value = value.into();
        self.apply("set_column_filter", |s| s.with_column_filter(column_id, value));
    }

    pub fn clear_column_filter(&self, column_id: &str) {
        self.apply("clear_column_filter", |s| s.without_column_filter(column_id));
    }

    /// Clear the text query and every column filter.
    pub fn reset_filters(&self) {
        self.apply("reset_filters", |s| {
            let mut next = s.with_filter_text("");
            next.column_filters.clear();
            next
        });
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Toggle the sort of a column (asc → desc → none).
    ///
    /// Does not check whether the column is sortable; that is the caller's
    /// business since the store does not know the columns.
    pub fn toggle_sort(&self, column_id: &str) {
        self.apply("toggle_sort", |s| s.with_sort_toggled(column_id));
    }

    pub fn set_sort(&self, sort: Vec<SortKey>) {
        self.apply("set_sort", |s| s.with_sort(sort));
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    /// Replace the pagination window. A new page size resets the index to 0.
    pub fn set_pagination(&self, pagination: Pagination) -> Result<(), TableError> {
        self.try_apply("set_pagination", |s| s.with_pagination(pagination))
    }

    pub fn set_page_index(&self, page_index: usize) {
        self.apply("set_page_index", |s| s.with_page_index(page_index));
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    pub fn update_selection(&self, update: SelectionUpdate<K>) {
        self.apply("update_selection", |s| s.with_selection_update(update));
    }

    // -------------------------------------------------------------------------
    // Delete confirmation
    // -------------------------------------------------------------------------

    pub fn open_delete_confirmation(&self, target: DeleteTarget<K>) -> Result<(), TableError> {
        self.try_apply("open_delete_confirmation", |s| {
            s.with_delete_confirmation(target)
        })
    }

    pub fn mark_delete_busy(&self) {
        self.apply("mark_delete_busy", |s| s.with_delete_busy());
    }

    pub fn close_delete_confirmation(&self) {
        self.apply("close_delete_confirmation", |s| s.without_delete_confirmation());
    }

    /// Close the dialog and drop deleted ids from the selection.
    pub fn complete_delete(&self, deleted: &[K]) {
        self.apply("complete_delete", |s| s.after_delete(deleted));
    }

    // -------------------------------------------------------------------------
    // Reconciliation
    // -------------------------------------------------------------------------

    /// Prune dead ids from the selection and clamp the page index.
    pub fn reconcile(&self, is_live: impl Fn(&K) -> bool, filtered_count: usize) {
        self.apply("reconcile", |s| s.reconciled(is_live, filtered_count));
    }
}

impl<K> TableStore<K>
where
    K: Ord + Clone + std::fmt::Debug + Serialize + DeserializeOwned,
{
    /// Serialize the current state as JSON.
    pub fn to_json(&self) -> Result<String, TableError> {
        Ok(serde_json::to_string(&*self.snapshot())?)
    }

    /// Restore a store from JSON produced by [`TableStore::to_json`].
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let state: TableState<K> = serde_json::from_str(json)?;
        Ok(Self::new(state))
    }
}
