//! Table surface.
//!
//! [`TableSurface`] ties the pieces together for one list screen: it owns
//! the record collection and column set, holds the [`TableStore`], feeds the
//! filter box through a [`DebouncedInput`] and drives deletes through a
//! [`DeleteOrchestrator`]. [`TableSurface::view`] produces a
//! [`TableView`] that any front end can draw; [`render_text`] draws it as
//! plain text.
//!
//! # Example
//!
//! ```
//! use tabula::prelude::*;
//!
//! #[derive(Clone)]
//! struct Part {
//!     id: u32,
//!     name: &'static str,
//! }
//!
//! impl Record for Part {
//!     type Id = u32;
//!
//!     fn id(&self) -> u32 {
//!         self.id
//!     }
//! }
//!
//! struct NoDelete;
//!
//! #[async_trait::async_trait]
//! impl DeleteMutation<u32> for NoDelete {
//!     async fn delete_one(&self, _id: &u32) -> Result<(), MutationError> {
//!         Err("read only".into())
//!     }
//!
//!     async fn delete_many(&self, _ids: &[u32]) -> Result<(), MutationError> {
//!         Err("read only".into())
//!     }
//! }
//!
//! let columns = vec![ColumnDescriptor::new("name", "Name", |p: &Part| p.name.into())];
//! let records = vec![Part { id: 1, name: "bolt" }, Part { id: 2, name: "nut" }];
//! let mut table =
//!     TableSurface::new(columns, records, TableConfig::default(), NoDelete, ToastQueue::new())
//!         .unwrap();
//!
//! table.click_header("name").unwrap();
//! let view = table.view();
//! assert_eq!(view.rows[0].cells, vec!["bolt"]);
//! assert_eq!(view.footer.summary, "1 - 2 of 2");
//! ```

mod render;
mod view;

pub use render::render_text;
pub use view::{ConfirmationView, FooterView, HeaderCell, RowView, TableView};

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, RwLock};

use crate::column::{ColumnDescriptor, find_column};
use crate::config::TableConfig;
use crate::debounce::DebouncedInput;
use crate::delete::{DeleteMutation, DeleteOrchestrator, DeleteOutcome, DeletePhase};
use crate::error::TableError;
use crate::notify::Notifier;
use crate::pagination::{PageToken, clamp_page_index, compute_window, page_count, summary};
use crate::pipeline::{compute_rows, filter_rows};
use crate::record::Record;
use crate::state::{
    DeleteConfirmation, Pagination, SelectionUpdate, TableState, TableStore,
};

/// Record collection shared with the filter box's change callback.
type SharedRecords<T> = Arc<RwLock<Arc<[T]>>>;

/// A complete, renderable table over records of type `T`.
pub struct TableSurface<T: Record> {
    columns: Arc<[ColumnDescriptor<T>]>,
    records: SharedRecords<T>,
    config: TableConfig,
    store: TableStore<T::Id>,
    filter_input: DebouncedInput,
    deletes: DeleteOrchestrator<T>,
    disposed: bool,
}

impl<T: Record> TableSurface<T> {
    /// Mount a table.
    ///
    /// Fails if the configuration is invalid or its default sort names a
    /// column that is unknown or not sortable.
    pub fn new(
        columns: Vec<ColumnDescriptor<T>>,
        records: Vec<T>,
        config: TableConfig,
        mutation: impl DeleteMutation<T::Id> + 'static,
        notifier: impl Notifier + 'static,
    ) -> Result<Self, TableError> {
        config.validate()?;
        for key in &config.default_sort {
            match find_column(&columns, &key.column_id) {
                None => return Err(TableError::UnknownColumn(key.column_id.clone())),
                Some(column) if !column.is_sortable() => {
                    return Err(TableError::ColumnNotSortable(key.column_id.clone()));
                }
                Some(_) => {}
            }
        }

        let state = TableState::new(config.default_page_size, config.default_sort.clone());
        Ok(Self::with_state(columns, records, config, state, mutation, notifier))
    }

    /// Mount a table on a previously saved state (see [`TableStore::to_json`]).
    ///
    /// Sort keys and filters naming unknown columns are ignored by the
    /// pipeline. Selection and page index are reconciled against `records`.
    /// A page size the configuration does not offer falls back to the
    /// default page size.
    pub fn with_state(
        columns: Vec<ColumnDescriptor<T>>,
        records: Vec<T>,
        config: TableConfig,
        state: TableState<T::Id>,
        mutation: impl DeleteMutation<T::Id> + 'static,
        notifier: impl Notifier + 'static,
    ) -> Self {
        // A saved open dialog has no orchestrator phase behind it
        let mut state = state.without_delete_confirmation();
        if !config.offers_page_size(state.pagination.page_size) {
            log::warn!(
                "TableSurface: saved page size {} not offered, using {}",
                state.pagination.page_size,
                config.default_page_size
            );
            state.pagination = Pagination::new(0, config.default_page_size);
        }
        let store = TableStore::new(state);

        let columns: Arc<[ColumnDescriptor<T>]> = columns.into();
        let records: SharedRecords<T> = Arc::new(RwLock::new(records.into()));

        let filter_store = store.clone();
        let filter_columns = Arc::clone(&columns);
        let filter_records = Arc::clone(&records);
        let filter_input = DebouncedInput::new(
            store.snapshot().filter_text.clone(),
            config.debounce_delay(),
            move |text| {
                let records = read_records(&filter_records);
                filter_store.set_filter_text_clamped(text, |state| {
                    filter_rows(&records, &filter_columns, state).len()
                });
            },
        );

        let deletes = DeleteOrchestrator::new(store.clone(), mutation, notifier);

        let mut surface = Self {
            columns,
            records,
            config,
            store,
            filter_input,
            deletes,
            disposed: false,
        };
        surface.refresh();
        surface
    }

    pub fn columns(&self) -> &[ColumnDescriptor<T>] {
        &self.columns
    }

    /// The current record collection.
    pub fn records(&self) -> Arc<[T]> {
        read_records(&self.records)
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// The table's state store.
    pub fn store(&self) -> &TableStore<T::Id> {
        &self.store
    }

    /// A handle on the delete state machine, for front ends that need to
    /// show the busy state while [`TableSurface::confirm_delete`] runs.
    pub fn deletes(&self) -> DeleteOrchestrator<T> {
        self.deletes.clone()
    }

    pub fn delete_phase(&self) -> DeletePhase<T> {
        self.deletes.phase()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn find_record(&self, id: &T::Id) -> Result<T, TableError> {
        self.records()
            .iter()
            .find(|r| r.id() == *id)
            .cloned()
            .ok_or_else(|| TableError::UnknownRecord(id.to_string()))
    }

    fn filtered_count(&self, state: &TableState<T::Id>) -> usize {
        filter_rows(&self.records(), &self.columns, state).len()
    }

    /// The page actually shown: the stored index clamped to the filtered
    /// set.
    fn current_page(&self) -> usize {
        let state = self.store.snapshot();
        clamp_page_index(
            state.pagination.page_index,
            state.pagination.page_size,
            self.filtered_count(&state),
        )
    }

    fn replace_records(&mut self, records: Vec<T>) {
        let mut guard = self.records.write().unwrap_or_else(|e| e.into_inner());
        *guard = records.into();
    }

    // -------------------------------------------------------------------------
    // Records
    // -------------------------------------------------------------------------

    /// Replace the record collection, e.g. after the data source reloaded.
    pub fn set_records(&mut self, records: Vec<T>) {
        log::debug!("TableSurface: {} -> {} records", self.records().len(), records.len());
        self.replace_records(records);
        self.refresh();
    }

    /// Write pipeline corrections back to the store and follow the store's
    /// filter text in the filter box.
    ///
    /// Prunes selected ids that are gone and clamps the page index. A
    /// debounced filter edit clamps the page index itself when it lands;
    /// call this after changing the store or the records by other means.
    pub fn refresh(&mut self) {
        let live: HashSet<T::Id> = self.records().iter().map(|r| r.id()).collect();
        let filtered = self.filtered_count(&self.store.snapshot());
        self.store.reconcile(|id| live.contains(id), filtered);
        self.filter_input
            .sync_external(&self.store.snapshot().filter_text);
    }

    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------

    /// Type into the filter box. The filter applies once typing pauses.
    pub fn type_filter(&mut self, text: impl Into<String>) {
        self.filter_input.edit(text);
    }

    /// Apply the filter box's text now.
    pub fn flush_filter(&mut self) {
        self.filter_input.flush();
        self.refresh();
    }

    /// The text in the filter box.
    pub fn filter_draft(&self) -> &str {
        self.filter_input.draft()
    }

    /// Set the filter on one column. An empty value removes it.
    pub fn set_column_filter(
        &mut self,
        column_id: &str,
        value: impl Into<String>,
    ) -> Result<(), TableError> {
        if find_column(&self.columns, column_id).is_none() {
            return Err(TableError::UnknownColumn(column_id.to_string()));
        }
        self.store.set_column_filter(column_id, value);
        self.refresh();
        Ok(())
    }

    /// Clear the filter box and every column filter.
    pub fn reset_filters(&mut self) {
        self.store.reset_filters();
        self.filter_input.reset("");
        self.refresh();
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Header click: cycle the column's sort.
    pub fn click_header(&mut self, column_id: &str) -> Result<(), TableError> {
        let column = find_column(&self.columns, column_id)
            .ok_or_else(|| TableError::UnknownColumn(column_id.to_string()))?;
        if !column.is_sortable() {
            return Err(TableError::ColumnNotSortable(column_id.to_string()));
        }
        self.store.toggle_sort(column_id);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Checkbox click on one row.
    pub fn toggle_row(&mut self, id: &T::Id) -> Result<(), TableError> {
        self.find_record(id)?;
        self.store.update_selection(SelectionUpdate::Toggle(id.clone()));
        Ok(())
    }

    /// Header checkbox: select the visible page, or deselect it if it is
    /// already fully selected.
    pub fn toggle_page(&mut self) {
        let state = self.store.snapshot();
        let records = self.records();
        let page = compute_rows(&records, &self.columns, &state);
        let ids: Vec<T::Id> = page.rows.iter().map(|row| row.record.id()).collect();
        self.store.update_selection(SelectionUpdate::TogglePage(ids));
    }

    pub fn clear_selection(&mut self) {
        self.store.update_selection(SelectionUpdate::Clear);
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    /// Navigate to the page a window token points at.
    pub fn go_to(&mut self, token: PageToken) {
        let state = self.store.snapshot();
        let pages = page_count(self.filtered_count(&state), state.pagination.page_size);
        let target = token.target(pages).min(pages.saturating_sub(1));
        self.store.set_page_index(target);
    }

    pub fn next_page(&mut self) {
        let index = self.current_page();
        self.go_to(PageToken::Page(index + 1));
    }

    pub fn previous_page(&mut self) {
        let index = self.current_page();
        self.go_to(PageToken::Page(index.saturating_sub(1)));
    }

    /// Pick a page size from the configured options. Goes back to the
    /// first page when the size changes.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), TableError> {
        if !self.config.offers_page_size(page_size) {
            return Err(TableError::InvalidPageSize(page_size));
        }
        let current = self.store.snapshot().pagination;
        self.store
            .set_pagination(Pagination::new(current.page_index, page_size))
    }

    // -------------------------------------------------------------------------
    // Deletion
    // -------------------------------------------------------------------------

    /// Row delete button: open the confirmation for one record.
    pub fn request_delete(&mut self, id: &T::Id) -> Result<(), TableError> {
        let record = self.find_record(id)?;
        self.deletes.request_single(record)
    }

    /// Bulk delete button: open the confirmation for the current selection.
    pub fn request_bulk_delete(&mut self) -> Result<BTreeSet<T::Id>, TableError> {
        self.deletes.request_bulk()
    }

    /// Dismiss the confirmation.
    pub fn cancel_delete(&mut self) -> bool {
        self.deletes.cancel()
    }

    /// Confirm the open dialog and run the deletion.
    ///
    /// On success the deleted records are dropped from the collection and
    /// the page index is re-clamped.
    pub async fn confirm_delete(&mut self) -> DeleteOutcome<T::Id> {
        let outcome = self.deletes.confirm().await;
        if let DeleteOutcome::Deleted(ids) = &outcome
            && !self.disposed
        {
            let deleted: HashSet<&T::Id> = ids.iter().collect();
            let kept: Vec<T> = self
                .records()
                .iter()
                .filter(|r| !deleted.contains(&r.id()))
                .cloned()
                .collect();
            self.replace_records(kept);
            self.refresh();
        }
        outcome
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Build the view model for the current state.
    pub fn view(&self) -> TableView<T::Id> {
        let state = self.store.snapshot();
        let records = self.records();
        let page = compute_rows(&records, &self.columns, &state);

        let headers = self
            .columns
            .iter()
            .map(|column| HeaderCell {
                column_id: column.id().to_string(),
                label: column.header().to_string(),
                sortable: column.is_sortable(),
                sort: state
                    .sort
                    .iter()
                    .find(|k| k.column_id == column.id())
                    .map(|k| k.direction),
            })
            .collect();

        let rows: Vec<RowView<T::Id>> = page
            .rows
            .iter()
            .map(|row| {
                let id = row.record.id();
                RowView {
                    selected: state.selection.is_selected(&id),
                    cells: self
                        .columns
                        .iter()
                        .map(|column| column.display(row.record))
                        .collect(),
                    id,
                }
            })
            .collect();

        let page_selected = state.selection.all_selected(rows.iter().map(|r| &r.id));
        let page_size = state.pagination.page_size;

        let footer = FooterView {
            summary: summary(page.page_index, page_size, page.total_filtered_count),
            window: compute_window(page.page_index, page.page_count),
            page_index: page.page_index,
            page_count: page.page_count,
            page_size,
            page_size_options: self.config.page_size_options.clone(),
            selected_count: state.selection.len(),
        };

        TableView {
            headers,
            rows,
            footer,
            page_selected,
            filter_draft: self.filter_input.draft().to_string(),
            confirmation: confirmation_view(&state.delete_confirmation),
        }
    }

    /// Tear the table down: the pending filter edit is dropped and any
    /// delete still in flight will settle without touching this table.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.filter_input.cancel();
        self.deletes.dispose();
        self.disposed = true;
        log::debug!("TableSurface: disposed");
    }
}

impl<T: Record> Drop for TableSurface<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn read_records<T>(records: &SharedRecords<T>) -> Arc<[T]> {
    let guard = records.read().unwrap_or_else(|e| e.into_inner());
    Arc::clone(&guard)
}

fn confirmation_view<K: Ord + Clone + std::fmt::Display>(
    confirmation: &DeleteConfirmation<K>,
) -> Option<ConfirmationView<K>> {
    let message = match confirmation {
        DeleteConfirmation::Closed => return None,
        DeleteConfirmation::Single { id, .. } => format!("Delete record {}?", id),
        DeleteConfirmation::Bulk { ids, .. } if ids.len() == 1 => {
            "Delete 1 selected record?".to_string()
        }
        DeleteConfirmation::Bulk { ids, .. } => format!("Delete {} selected records?", ids.len()),
    };
    Some(ConfirmationView {
        ids: confirmation.target_ids(),
        busy: confirmation.is_busy(),
        message,
    })
}
