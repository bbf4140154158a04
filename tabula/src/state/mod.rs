//! Table state.
//!
//! [`TableState`] is the single serializable state of one table: filter
//! text, column filters, sort, pagination window, selection and the delete
//! confirmation. Every transition is a pure method returning a new state;
//! [`TableStore`] holds the current snapshot and swaps it on update.

mod selection;
mod store;

pub use selection::{Selection, SelectionUpdate};
pub use store::TableStore;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::pagination::clamp_page_index;

/// Default page size when the configuration does not name one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

// =============================================================================
// Sort
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One sort key: a column and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column_id: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Descending,
        }
    }
}

// =============================================================================
// Filters and pagination
// =============================================================================

/// A filter attached to a single column, e.g. a type-equality filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub column_id: String,
    pub value: String,
}

/// The pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 0-based page index.
    pub page_index: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

// =============================================================================
// Delete confirmation
// =============================================================================

/// What a delete confirmation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget<K: Ord> {
    Single(K),
    Bulk(BTreeSet<K>),
}

impl<K: Ord + Clone> DeleteTarget<K> {
    /// The targeted ids, in order.
    pub fn ids(&self) -> Vec<K> {
        match self {
            DeleteTarget::Single(id) => vec![id.clone()],
            DeleteTarget::Bulk(ids) => ids.iter().cloned().collect(),
        }
    }
}

/// Serializable view of the delete dialog.
///
/// An open confirmation always carries a non-empty target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DeleteConfirmation<K: Ord> {
    Closed,
    Single { id: K, busy: bool },
    Bulk { ids: BTreeSet<K>, busy: bool },
}

impl<K: Ord> Default for DeleteConfirmation<K> {
    fn default() -> Self {
        DeleteConfirmation::Closed
    }
}

impl<K: Ord + Clone> DeleteConfirmation<K> {
    pub fn is_open(&self) -> bool {
        !matches!(self, DeleteConfirmation::Closed)
    }

    /// Whether the deletion is in flight.
    pub fn is_busy(&self) -> bool {
        match self {
            DeleteConfirmation::Closed => false,
            DeleteConfirmation::Single { busy, .. } | DeleteConfirmation::Bulk { busy, .. } => {
                *busy
            }
        }
    }

    /// The targeted ids, empty when closed.
    pub fn target_ids(&self) -> Vec<K> {
        match self {
            DeleteConfirmation::Closed => Vec::new(),
            DeleteConfirmation::Single { id, .. } => vec![id.clone()],
            DeleteConfirmation::Bulk { ids, .. } => ids.iter().cloned().collect(),
        }
    }
}

// =============================================================================
// TableState
// =============================================================================

/// The complete state of one table instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: Ord + Deserialize<'de>"))]
pub struct TableState<K: Ord> {
    pub filter_text: String,
    #[serde(default)]
    pub column_filters: Vec<ColumnFilter>,
    #[serde(default)]
    pub sort: Vec<SortKey>,
    pub pagination: Pagination,
    pub selection: Selection<K>,
    #[serde(default)]
    pub delete_confirmation: DeleteConfirmation<K>,
}

impl<K: Ord> Default for TableState<K> {
    fn default() -> Self {
        Self {
            filter_text: String::new(),
            column_filters: Vec::new(),
            sort: Vec::new(),
            pagination: Pagination::default(),
            selection: Selection::default(),
            delete_confirmation: DeleteConfirmation::default(),
        }
    }
}

impl<K: Ord + Clone> TableState<K> {
    /// Initial state with a page size and default sort.
    pub fn new(page_size: usize, sort: Vec<SortKey>) -> Self {
        Self {
            pagination: Pagination::new(0, page_size.max(1)),
            sort,
            ..Self::default()
        }
    }

    /// Replace the free-text query.
    pub fn with_filter_text(&self, text: impl Into<String>) -> Self {
        Self {
            filter_text: text.into(),
            ..self.clone()
        }
    }

    /// Set (or with an empty value, remove) the filter on one column.
    pub fn with_column_filter(&self, column_id: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut next = self.without_column_filter(column_id);
        if !value.is_empty() {
            next.column_filters.push(ColumnFilter {
                column_id: column_id.to_string(),
                value,
            });
        }
        next
    }

    pub fn without_column_filter(&self, column_id: &str) -> Self {
        let mut next = self.clone();
        next.column_filters.retain(|f| f.column_id != column_id);
        next
    }

    /// Cycle a column's sort: unsorted → ascending → descending → unsorted.
    ///
    /// Single-column: sorting a new column drops any other sort key.
    pub fn with_sort_toggled(&self, column_id: &str) -> Self {
        let current = self
            .sort
            .iter()
            .find(|k| k.column_id == column_id)
            .map(|k| k.direction);
        let sort = match current {
            None => vec![SortKey::asc(column_id)],
            Some(SortDirection::Ascending) => vec![SortKey::desc(column_id)],
            Some(SortDirection::Descending) => Vec::new(),
        };
        Self {
            sort,
            ..self.clone()
        }
    }

    /// Replace the sort keys.
    pub fn with_sort(&self, sort: Vec<SortKey>) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }

    /// Replace the pagination window.
    ///
    /// A changed page size invalidates the old window, so the index goes
    /// back to the first page.
    pub fn with_pagination(&self, pagination: Pagination) -> Result<Self, TableError> {
        if pagination.page_size == 0 {
            return Err(TableError::InvalidPageSize(0));
        }
        let page_index = if pagination.page_size != self.pagination.page_size {
            0
        } else {
            pagination.page_index
        };
        Ok(Self {
            pagination: Pagination::new(page_index, pagination.page_size),
            ..self.clone()
        })
    }

    pub fn with_page_index(&self, page_index: usize) -> Self {
        Self {
            pagination: Pagination::new(page_index, self.pagination.page_size),
            ..self.clone()
        }
    }

    pub fn with_selection_update(&self, update: SelectionUpdate<K>) -> Self {
        let mut next = self.clone();
        next.selection.apply(update);
        next
    }

    /// Open the delete dialog.
    ///
    /// Fails if a confirmation is already open, or the target is empty.
    pub fn with_delete_confirmation(&self, target: DeleteTarget<K>) -> Result<Self, TableError> {
        if self.delete_confirmation.is_open() {
            return Err(TableError::ConfirmationPending);
        }
        let delete_confirmation = match target {
            DeleteTarget::Single(id) => DeleteConfirmation::Single { id, busy: false },
            DeleteTarget::Bulk(ids) if ids.is_empty() => return Err(TableError::EmptySelection),
            DeleteTarget::Bulk(ids) => DeleteConfirmation::Bulk { ids, busy: false },
        };
        Ok(Self {
            delete_confirmation,
            ..self.clone()
        })
    }

    /// Mark the open confirmation as in flight. No-op when closed.
    pub fn with_delete_busy(&self) -> Self {
        let delete_confirmation = match &self.delete_confirmation {
            DeleteConfirmation::Closed => DeleteConfirmation::Closed,
            DeleteConfirmation::Single { id, .. } => DeleteConfirmation::Single {
                id: id.clone(),
                busy: true,
            },
            DeleteConfirmation::Bulk { ids, .. } => DeleteConfirmation::Bulk {
                ids: ids.clone(),
                busy: true,
            },
        };
        Self {
            delete_confirmation,
            ..self.clone()
        }
    }

    pub fn without_delete_confirmation(&self) -> Self {
        Self {
            delete_confirmation: DeleteConfirmation::Closed,
            ..self.clone()
        }
    }

    /// Close the dialog and drop the deleted ids from the selection.
    pub fn after_delete(&self, deleted: &[K]) -> Self {
        let mut next = self.without_delete_confirmation();
        next.selection.remove_all(deleted.iter());
        next
    }

    /// Clamp the page index to the last page that has rows.
    pub fn with_page_clamped(&self, filtered_count: usize) -> Self {
        self.with_page_index(clamp_page_index(
            self.pagination.page_index,
            self.pagination.page_size,
            filtered_count,
        ))
    }

    /// Bring the state back in line with the source collection.
    ///
    /// Prunes selected ids that are no longer live and clamps the page index
    /// to the last page that has rows.
    pub fn reconciled(&self, is_live: impl Fn(&K) -> bool, filtered_count: usize) -> Self {
        let mut next = self.with_page_clamped(filtered_count);
        next.selection.retain(|id| is_live(id));
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> TableState<u32> {
        TableState::new(5, Vec::new())
    }

    #[test]
    fn test_sort_cycles_through_three_states() {
        let s = state().with_sort_toggled("name");
        assert_eq!(s.sort, vec![SortKey::asc("name")]);
        let s = s.with_sort_toggled("name");
        assert_eq!(s.sort, vec![SortKey::desc("name")]);
        let s = s.with_sort_toggled("name");
        assert!(s.sort.is_empty());
    }

    #[test]
    fn test_sort_new_column_replaces_old() {
        let s = state()
            .with_sort_toggled("name")
            .with_sort_toggled("name")
            .with_sort_toggled("qty");
        assert_eq!(s.sort, vec![SortKey::asc("qty")]);
    }

    #[test]
    fn test_page_size_change_resets_index() {
        let s = state().with_page_index(4);
        let s = s.with_pagination(Pagination::new(4, 20)).unwrap();
        assert_eq!(s.pagination, Pagination::new(0, 20));

        // Same size keeps the requested index
        let s = s.with_pagination(Pagination::new(2, 20)).unwrap();
        assert_eq!(s.pagination.page_index, 2);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(matches!(
            state().with_pagination(Pagination::new(0, 0)),
            Err(TableError::InvalidPageSize(0))
        ));
    }

    #[test]
    fn test_transitions_do_not_touch_original() {
        let original = state();
        let next = original.with_filter_text("bolt");
        assert_eq!(original.filter_text, "");
        assert_eq!(next.filter_text, "bolt");
    }

    #[test]
    fn test_column_filter_replace_and_remove() {
        let s = state()
            .with_column_filter("type", "tool")
            .with_column_filter("type", "part");
        assert_eq!(s.column_filters.len(), 1);
        assert_eq!(s.column_filters[0].value, "part");
        assert!(s.with_column_filter("type", "").column_filters.is_empty());
    }

    #[test]
    fn test_only_one_confirmation_at_a_time() {
        let s = state()
            .with_delete_confirmation(DeleteTarget::Single(1))
            .unwrap();
        assert!(matches!(
            s.with_delete_confirmation(DeleteTarget::Bulk(BTreeSet::from([2]))),
            Err(TableError::ConfirmationPending)
        ));
    }

    #[test]
    fn test_empty_bulk_confirmation_rejected() {
        assert!(matches!(
            state().with_delete_confirmation(DeleteTarget::Bulk(BTreeSet::new())),
            Err(TableError::EmptySelection)
        ));
    }

    #[test]
    fn test_after_delete_drops_ids_and_closes() {
        let s = state()
            .with_selection_update(SelectionUpdate::TogglePage(vec![3, 5, 7]))
            .with_delete_confirmation(DeleteTarget::Single(7))
            .unwrap()
            .with_delete_busy();
        assert!(s.delete_confirmation.is_busy());
        let s = s.after_delete(&[7]);
        assert!(!s.delete_confirmation.is_open());
        assert_eq!(s.selection.ids(), BTreeSet::from([3, 5]));
    }

    #[test]
    fn test_reconcile_prunes_and_clamps() {
        let s = state()
            .with_selection_update(SelectionUpdate::TogglePage(vec![1, 2, 3]))
            .with_page_index(4);
        let s = s.reconciled(|id| *id != 2, 12);
        assert_eq!(s.selection.ids(), BTreeSet::from([1, 3]));
        assert_eq!(s.pagination.page_index, 2);
    }

    #[test]
    fn test_json_round_trip_shape() {
        let s = state()
            .with_filter_text("bolt")
            .with_delete_confirmation(DeleteTarget::Bulk(BTreeSet::from([3, 5])))
            .unwrap();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["delete_confirmation"]["mode"], "bulk");
        assert_eq!(json["delete_confirmation"]["ids"], serde_json::json!([3, 5]));
        let back: TableState<u32> = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }
}
