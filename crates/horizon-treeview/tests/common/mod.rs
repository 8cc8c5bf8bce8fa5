//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::any::Any;
use std::sync::Arc;

use horizon_treeview::prelude::*;
use horizon_treeview::Gradient;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once. Set `RUST_LOG` to see output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A plain row identified by a label.
pub struct LabelRow {
    pub label: usize,
    pub height: f32,
    pub widths: Vec<ColumnWidth>,
}

impl TreeRow for LabelRow {
    fn height(&self) -> f32 {
        self.height
    }

    fn column_widths(&self) -> Vec<ColumnWidth> {
        self.widths.clone()
    }

    fn paint_column(&self, _column: usize, rect: Rect, ctx: &mut PaintContext<'_>) {
        let color = if ctx.state.selected {
            ctx.style.color_for("tree_item_select_background")
        } else {
            Color::WHITE
        };
        ctx.canvas.fill_gradient(rect, &Gradient::solid(color));
    }
}

pub fn row(label: usize, height: f32) -> RowHandle {
    RowHandle::new(LabelRow {
        label,
        height,
        widths: vec![ColumnWidth::Fixed(80.0), ColumnWidth::Fill],
    })
}

pub fn child(label: usize, parent: &RowHandle) -> RowHandle {
    RowHandle::child_of(
        LabelRow {
            label,
            height: 20.0,
            widths: vec![ColumnWidth::Fixed(80.0), ColumnWidth::Fill],
        },
        parent,
    )
}

pub fn label(row: &RowHandle) -> usize {
    row.downcast_ref::<LabelRow>().map_or(usize::MAX, |r| r.label)
}

pub fn labels(view: &TreeView) -> Vec<usize> {
    view.rows().iter().map(label).collect()
}

/// A view of `count` 20px rows in a 200x100 viewport.
pub fn view_with_rows(count: usize) -> TreeView {
    init_tracing();
    let mut view = TreeView::new(TreeViewConfig::default().with_sort_threads(2)).expect("view");
    view.add_items((0..count).map(|i| row(i, 20.0)).collect(), None, false)
        .expect("add rows");
    view.resize(200.0, 100.0);
    view
}

pub fn assert_indices_contiguous(view: &TreeView) {
    for (index, row) in view.rows().iter().enumerate() {
        assert_eq!(row.row_index(), index, "row {} has a stale index", label(row));
    }
}

/// Everything a paint pass asked the surface to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Fill(Rect),
    PushClip(Rect),
    PopClip,
    Layer(Size),
    Composite { src_y: f32, dst: Rect, alpha: f32 },
}

/// A canvas that records operations instead of drawing.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    pub size: Size,
    pub ops: Arc<Mutex<Vec<Op>>>,
}

impl RecordingCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Size::new(width, height),
            ops: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().clone()
    }

    pub fn composites(&self) -> Vec<(f32, Rect, f32)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Composite { src_y, dst, alpha } => Some((src_y, dst, alpha)),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> Size {
        self.size
    }

    fn push_clip(&mut self, rect: Rect) {
        self.ops.lock().push(Op::PushClip(rect));
    }

    fn pop_clip(&mut self) {
        self.ops.lock().push(Op::PopClip);
    }

    fn fill_gradient(&mut self, rect: Rect, _gradient: &Gradient) {
        self.ops.lock().push(Op::Fill(rect));
    }

    fn create_layer(&self, size: Size) -> Box<dyn Canvas> {
        self.ops.lock().push(Op::Layer(size));
        Box::new(RecordingCanvas::new(size.width, size.height))
    }

    fn composite_scanline(&mut self, _layer: &dyn Canvas, src_y: f32, dst: Rect, alpha: f32) {
        self.ops.lock().push(Op::Composite { src_y, dst, alpha });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
