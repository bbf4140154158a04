//! Framework-neutral view model for one table render.

use crate::pagination::PageToken;
use crate::state::SortDirection;

/// Everything needed to draw the table once.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView<K> {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<RowView<K>>,
    pub footer: FooterView,
    /// Whether every row on the visible page is selected.
    pub page_selected: bool,
    /// The text shown in the filter box (may be ahead of the applied filter).
    pub filter_draft: String,
    pub confirmation: Option<ConfirmationView<K>>,
}

impl<K> TableView<K> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub column_id: String,
    pub label: String,
    /// Whether clicking the header toggles the sort.
    pub sortable: bool,
    /// Current sort on this column, if any.
    pub sort: Option<SortDirection>,
}

impl HeaderCell {
    /// The sort arrow for this header, if sorted.
    pub fn indicator(&self) -> Option<&'static str> {
        self.sort.map(|direction| match direction {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        })
    }
}

/// One visible row, keyed by record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView<K> {
    pub id: K,
    pub selected: bool,
    /// Formatted cells, one per column.
    pub cells: Vec<String>,
}

/// Pagination footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterView {
    /// `"{start} - {end} of {total}"`
    pub summary: String,
    pub window: Vec<PageToken>,
    pub page_index: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub selected_count: usize,
}

/// The open delete dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationView<K> {
    pub ids: Vec<K>,
    /// The mutation is in flight; confirm and cancel are disabled.
    pub busy: bool,
    pub message: String,
}
