//! Horizon TreeView - a virtualized, scrollable tree/list view core.
//!
//! The view keeps an ordered collection of variable-height rows, paints only
//! the rows that intersect the viewport, and runs click, range, toggle,
//! drag-reorder, keyboard, and auto-scroll selection on top of it. Column
//! sorts run on a background pool and are applied on the interactive thread
//! only if nothing newer was requested in the meantime.
//!
//! The crate does no windowing or pixel work of its own. The host feeds it
//! [`PointerEvent`]s and [`KeyEvent`]s, advances time with
//! [`TreeView::process_timers`], and hands it a [`Canvas`] to paint onto.
//!
//! # Example
//!
//! ```
//! use horizon_treeview::prelude::*;
//!
//! struct Entry(&'static str);
//!
//! impl TreeRow for Entry {
//!     fn height(&self) -> f32 {
//!         20.0
//!     }
//!
//!     fn column_widths(&self) -> Vec<ColumnWidth> {
//!         vec![ColumnWidth::Fill]
//!     }
//!
//!     fn paint_column(&self, _column: usize, _rect: Rect, _ctx: &mut PaintContext<'_>) {}
//! }
//!
//! fn main() -> Result<(), TreeViewError> {
//!     let mut view = TreeView::new(TreeViewConfig::default())?;
//!     view.add_items(vec![RowHandle::new(Entry("a")), RowHandle::new(Entry("b"))], None, false)?;
//!     view.resize(300.0, 200.0);
//!
//!     let click = PointerEvent::new(10.0, 30.0);
//!     view.handle_mouse_press(&click);
//!     view.handle_mouse_release(&click);
//!     assert_eq!(view.selection().to_vec(), vec![1]);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod prelude;
pub mod sort;
pub mod style;
pub mod view;

pub use config::TreeViewConfig;
pub use error::{TreeViewError, TreeViewResult};
pub use events::{Key, KeyEvent, KeyboardModifiers, MouseButton, PointerEvent};
pub use model::{ColumnWidth, DragLine, PaintContext, RowHandle, RowId, RowState, RowStore, Selection, TreeRow};
pub use sort::{SortMethod, sort_by};
pub use style::{Canvas, DefaultStyle, Gradient, SizedImage, StyleProvider};
pub use view::{ColumnHeaders, InteractionState, SortOrder, TreeView, VisibleRange};

pub use horizon_treeview_core::{Color, Point, Rect, Signal, Size};
