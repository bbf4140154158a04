//! Error types

use thiserror::Error;

/// Errors returned by table operations.
///
/// Pagination drift is never reported here; out-of-range page indices are
/// clamped silently by the pipeline and the store.
#[derive(Debug, Error)]
pub enum TableError {
    /// A column id that is not part of the table's column set.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Sorting was requested on a column that has sorting disabled.
    #[error("column is not sortable: {0}")]
    ColumnNotSortable(String),

    /// A page size of zero, or one not offered by the configuration.
    #[error("invalid page size: {0}")]
    InvalidPageSize(usize),

    /// A delete confirmation is already open or in flight.
    #[error("a delete confirmation is already pending")]
    ConfirmationPending,

    /// Bulk delete requested with nothing selected.
    #[error("no rows are selected")]
    EmptySelection,

    /// A record id that is not present in the source collection.
    #[error("unknown record: {0}")]
    UnknownRecord(String),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// State or configuration could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure reported by a delete mutation collaborator.
///
/// Transport details stay with the collaborator; the engine only carries the
/// message through to the notification channel.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct MutationError {
    /// Error message
    pub message: String,
}

impl MutationError {
    /// Create a new mutation error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for MutationError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<String> for MutationError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for MutationError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
