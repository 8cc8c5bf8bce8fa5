//! Error types for the tree view.

use horizon_treeview_core::CoreError;

use crate::model::RowId;

/// Errors produced by row store mutations, sorting, and configuration.
#[derive(Debug, thiserror::Error)]
pub enum TreeViewError {
    /// An insert position past the end of the store.
    #[error("insert position {position} is out of range for {len} rows")]
    InsertPosition { position: usize, len: usize },

    /// A row that is already present (or listed twice) was inserted again.
    #[error("row {0:?} is already present in the store")]
    DuplicateRow(RowId),

    /// A reorder that is not a permutation of the current rows.
    #[error("reorder is not a permutation of the current rows: {0}")]
    InvalidPermutation(String),

    /// A row referenced by a request is not in the store.
    #[error("row {0:?} is not present in the store")]
    UnknownRow(RowId),

    /// A column index beyond the configured headers or sort methods.
    #[error("column {column} is out of range ({count} columns)")]
    ColumnOutOfRange { column: usize, count: usize },

    /// Sorting was requested for a column without a sort method.
    #[error("no sort method registered for column {0}")]
    NoSortMethod(usize),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// An error from the core systems.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for tree view operations.
pub type TreeViewResult<T> = std::result::Result<T, TreeViewError>;
