//! Rows and row handles.
//!
//! Applications describe each entry by implementing [`TreeRow`]. The store
//! never holds a `TreeRow` directly; it holds [`RowHandle`]s, which pair the
//! row with a process-unique identity and the mutable view state the store
//! maintains for it (index, selection, expansion, drag line).
//!
//! Hierarchy is expressed with a non-owning back reference: a child handle
//! records its parent's [`RowId`] and its nesting depth, never a second
//! strong reference to the parent. Children are owned solely by their
//! position in the store.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::Sender;
use horizon_treeview_core::Rect;
use parking_lot::Mutex;

use crate::style::{Canvas, StyleProvider};

/// Counter for unique row ids.
static NEXT_ROW_ID: AtomicU64 = AtomicU64::new(1);

/// A process-unique row identity.
///
/// Two rows with identical content are still distinct rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

impl RowId {
    fn next() -> Self {
        Self(NEXT_ROW_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Width a row requests for one of its columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// A fixed width in pixels.
    Fixed(f32),
    /// Stretch to fill whatever the fixed columns leave over.
    Fill,
}

/// Where a row draws the drop indicator during a drag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragLine {
    #[default]
    None,
    Above,
    Below,
}

/// View state the store keeps for each row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowState {
    /// Position in the store. Rewritten on every structural change.
    pub row_index: usize,
    pub selected: bool,
    pub expanded: bool,
    pub drag_line: DragLine,
}

/// Everything a row needs to paint one column.
pub struct PaintContext<'a> {
    pub canvas: &'a mut dyn Canvas,
    pub style: &'a dyn StyleProvider,
    /// Snapshot of the row's state at the start of the paint pass.
    pub state: RowState,
}

/// Behaviour of a single entry in the view.
///
/// Only `height`, `column_widths`, and `paint_column` are required. The
/// notification hooks default to no-ops.
pub trait TreeRow: Any + Send + Sync {
    /// Height of the row in pixels.
    fn height(&self) -> f32;

    /// Requested width of each column.
    fn column_widths(&self) -> Vec<ColumnWidth>;

    /// Paint `column` into `rect`, which is already clipped to the column.
    fn paint_column(&self, column: usize, rect: Rect, ctx: &mut PaintContext<'_>);

    /// Expand this row. Implementations usually call
    /// [`RowHandle::request_insert_children`] on `handle`.
    fn expand(&self, _handle: &RowHandle) {}

    /// Collapse this row. Implementations usually call
    /// [`RowHandle::request_remove_children`] on `handle`.
    fn collapse(&self, _handle: &RowHandle) {}

    fn select(&self) {}

    fn unselect(&self) {}

    fn single_click(&self) {}

    fn double_click(&self) {}

    fn set_drag_line(&self, _line: DragLine) {}
}

/// Structural requests a row can raise against the store that holds it.
#[derive(Debug)]
pub(crate) enum RowRequest {
    Redraw(RowId),
    Insert {
        items: Vec<RowHandle>,
        position: Option<usize>,
    },
    InsertChildren {
        parent: RowId,
        items: Vec<RowHandle>,
    },
    Delete(Vec<RowHandle>),
    RemoveChildren(RowId),
}

struct RowShared {
    id: RowId,
    parent: Option<RowId>,
    depth: usize,
    row: Box<dyn TreeRow>,
    state: Mutex<RowState>,
    requests: Mutex<Option<Sender<RowRequest>>>,
}

/// A shared handle to a row.
///
/// Cloning is cheap and yields the same identity. Equality and hashing are
/// by identity only.
#[derive(Clone)]
pub struct RowHandle {
    inner: Arc<RowShared>,
}

impl RowHandle {
    /// Wrap a top-level row.
    pub fn new(row: impl TreeRow) -> Self {
        Self::build(Box::new(row), None, 0)
    }

    /// Wrap a row nested under `parent`.
    pub fn child_of(row: impl TreeRow, parent: &RowHandle) -> Self {
        Self::build(Box::new(row), Some(parent.id()), parent.depth() + 1)
    }

    fn build(row: Box<dyn TreeRow>, parent: Option<RowId>, depth: usize) -> Self {
        Self {
            inner: Arc::new(RowShared {
                id: RowId::next(),
                parent,
                depth,
                row,
                state: Mutex::new(RowState::default()),
                requests: Mutex::new(None),
            }),
        }
    }

    pub fn id(&self) -> RowId {
        self.inner.id
    }

    /// The parent row, if this row is nested.
    pub fn parent(&self) -> Option<RowId> {
        self.inner.parent
    }

    /// Nesting depth. 0 is top level.
    pub fn depth(&self) -> usize {
        self.inner.depth
    }

    /// The application row.
    pub fn row(&self) -> &dyn TreeRow {
        &*self.inner.row
    }

    /// Downcast the application row to its concrete type.
    pub fn downcast_ref<T: TreeRow>(&self) -> Option<&T> {
        let row: &dyn Any = &*self.inner.row;
        row.downcast_ref::<T>()
    }

    pub fn height(&self) -> f32 {
        self.inner.row.height()
    }

    /// Snapshot of the row's view state.
    pub fn state(&self) -> RowState {
        *self.inner.state.lock()
    }

    pub fn row_index(&self) -> usize {
        self.inner.state.lock().row_index
    }

    pub fn is_selected(&self) -> bool {
        self.inner.state.lock().selected
    }

    pub fn is_expanded(&self) -> bool {
        self.inner.state.lock().expanded
    }

    pub fn drag_line(&self) -> DragLine {
        self.inner.state.lock().drag_line
    }

    pub(crate) fn set_row_index(&self, index: usize) {
        self.inner.state.lock().row_index = index;
    }

    /// Update the selected flag, notifying the row only on change.
    pub(crate) fn set_selected(&self, selected: bool) {
        let changed = {
            let mut state = self.inner.state.lock();
            std::mem::replace(&mut state.selected, selected) != selected
        };
        if changed {
            if selected {
                self.inner.row.select();
            } else {
                self.inner.row.unselect();
            }
        }
    }

    pub(crate) fn set_expanded(&self, expanded: bool) {
        self.inner.state.lock().expanded = expanded;
    }

    /// Update the drag line, notifying the row only on change.
    pub(crate) fn set_drag_line(&self, line: DragLine) {
        let changed = {
            let mut state = self.inner.state.lock();
            std::mem::replace(&mut state.drag_line, line) != line
        };
        if changed {
            self.inner.row.set_drag_line(line);
        }
    }

    pub(crate) fn attach(&self, sender: Sender<RowRequest>) {
        *self.inner.requests.lock() = Some(sender);
    }

    pub(crate) fn detach(&self) {
        *self.inner.requests.lock() = None;
    }

    /// Whether the row currently belongs to a store.
    pub fn is_attached(&self) -> bool {
        self.inner.requests.lock().is_some()
    }

    fn send(&self, request: RowRequest) -> bool {
        let requests = self.inner.requests.lock();
        match requests.as_ref() {
            Some(sender) => sender.send(request).is_ok(),
            None => {
                tracing::trace!(
                    target: horizon_treeview_core::logging::targets::STORE,
                    row = ?self.id(),
                    "request from detached row ignored"
                );
                false
            }
        }
    }

    /// Ask the view to repaint this row. Requests are coalesced.
    ///
    /// Returns `false` if the row is not attached to a view.
    pub fn request_redraw(&self) -> bool {
        self.send(RowRequest::Redraw(self.id()))
    }

    /// Ask the store to insert `items` at `position` (end if `None`).
    pub fn request_insert(&self, items: Vec<RowHandle>, position: Option<usize>) -> bool {
        self.send(RowRequest::Insert { items, position })
    }

    /// Ask the store to insert `items` directly after this row.
    pub fn request_insert_children(&self, items: Vec<RowHandle>) -> bool {
        self.send(RowRequest::InsertChildren {
            parent: self.id(),
            items,
        })
    }

    /// Ask the store to delete `items`.
    pub fn request_delete(&self, items: Vec<RowHandle>) -> bool {
        self.send(RowRequest::Delete(items))
    }

    /// Ask the store to delete every row nested under this one.
    pub fn request_remove_children(&self) -> bool {
        self.send(RowRequest::RemoveChildren(self.id()))
    }
}

impl PartialEq for RowHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for RowHandle {}

impl Hash for RowHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for RowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowHandle")
            .field("id", &self.inner.id)
            .field("depth", &self.inner.depth)
            .field("parent", &self.inner.parent)
            .field("state", &self.state())
            .finish()
    }
}

static_assertions::assert_impl_all!(RowHandle: Send, Sync);
