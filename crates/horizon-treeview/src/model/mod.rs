//! Row model: rows, the row store, and selection state.

mod row;
mod selection;
mod store;

pub use row::{ColumnWidth, DragLine, PaintContext, RowHandle, RowId, RowState, TreeRow};
pub(crate) use row::RowRequest;
pub use selection::Selection;
pub use store::RowStore;
