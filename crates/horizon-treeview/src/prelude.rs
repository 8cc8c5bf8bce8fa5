//! Prelude module for Horizon TreeView.
//!
//! ```ignore
//! use horizon_treeview::prelude::*;
//! ```

// ============================================================================
// View
// ============================================================================

pub use crate::view::{ColumnHeaders, InteractionState, SortOrder, TreeView};
pub use crate::{TreeViewConfig, TreeViewError, TreeViewResult};

// ============================================================================
// Rows
// ============================================================================

pub use crate::model::{ColumnWidth, DragLine, PaintContext, RowHandle, RowState, Selection, TreeRow};
pub use crate::sort::{SortMethod, sort_by};

// ============================================================================
// Input and Drawing
// ============================================================================

pub use crate::events::{Key, KeyEvent, KeyboardModifiers, MouseButton, PointerEvent};
pub use crate::style::{Canvas, StyleProvider};
pub use horizon_treeview_core::{Color, Point, Rect, Signal, Size};
