//! Tabular data engine
//!
//! Filter, sort, paginate, select and delete rows of arbitrary record types.
//! The engine renders to a framework-neutral view model; front ends draw it.

pub mod column;
pub mod config;
pub mod debounce;
pub mod delete;
pub mod error;
pub mod filter;
pub mod notify;
pub mod pagination;
pub mod pipeline;
pub mod record;
pub mod state;
pub mod surface;

pub mod prelude {
    pub use crate::column::{CellFormat, CellValue, ColumnDescriptor};
    pub use crate::config::TableConfig;
    pub use crate::debounce::DebouncedInput;
    pub use crate::delete::{DeleteMutation, DeleteOrchestrator, DeleteOutcome, DeletePhase};
    pub use crate::error::{MutationError, TableError};
    pub use crate::filter::{FilterMatch, FuzzyQuery};
    pub use crate::notify::{Notifier, Toast, ToastLevel, ToastQueue};
    pub use crate::pagination::PageToken;
    pub use crate::pipeline::{RowPage, compute_rows};
    pub use crate::record::{Record, RecordKey};
    pub use crate::state::{
        DeleteConfirmation, DeleteTarget, Pagination, Selection, SelectionUpdate, SortDirection,
        SortKey, TableState, TableStore,
    };
    pub use crate::surface::{TableSurface, TableView, render_text};
}
