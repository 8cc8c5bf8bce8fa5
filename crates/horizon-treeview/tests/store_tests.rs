//! Tests for row store consistency through the view.

mod common;

use std::sync::Arc;

use common::*;
use horizon_treeview::prelude::*;
use parking_lot::Mutex;

#[test]
fn test_indices_stay_contiguous_through_mutations() {
    let mut view = view_with_rows(10);
    assert_indices_contiguous(&view);

    view.add_items(vec![row(100, 20.0), row(101, 30.0)], Some(3), false)
        .unwrap();
    assert_indices_contiguous(&view);

    let doomed: Vec<_> = view.rows().iter().step_by(3).cloned().collect();
    view.delete_items(&doomed).unwrap();
    assert_indices_contiguous(&view);

    view.add_items(vec![row(200, 10.0)], Some(0), false).unwrap();
    assert_indices_contiguous(&view);
    assert_eq!(labels(&view)[0], 200);
}

#[test]
fn test_selection_preserved_across_insert_and_delete() {
    let mut view = view_with_rows(6);
    let kept = view.rows()[4].clone();
    let removed = view.rows()[2].clone();
    view.set_selection(Selection::from_rows([2, 4], Some(4)));

    view.add_items(vec![row(50, 20.0), row(51, 20.0)], Some(0), false)
        .unwrap();
    assert_eq!(view.selection().to_vec(), vec![4, 6]);
    assert_eq!(view.anchor_row(), Some(6));

    view.delete_items(&[removed.clone()]).unwrap();
    assert_eq!(view.selection().to_vec(), vec![5]);
    assert_eq!(view.selected_rows(), vec![kept.clone()]);
    assert!(!removed.is_selected());
    assert!(kept.is_selected());
}

#[test]
fn test_scroll_range_tracks_content() {
    let mut view = view_with_rows(10);
    assert_eq!(view.scroll().upper(), 200.0);
    view.set_scroll_offset(100.0);

    let doomed: Vec<_> = view.rows()[5..].to_vec();
    view.delete_items(&doomed).unwrap();
    assert_eq!(view.scroll().upper(), 100.0);
    assert_eq!(view.scroll_offset(), 0.0);
}

#[test]
fn test_rejected_insert_is_non_fatal() {
    let mut view = view_with_rows(3);
    view.set_selection(Selection::single(1));

    let err = view.add_items(vec![row(9, 20.0)], Some(7), false).unwrap_err();
    assert!(matches!(err, TreeViewError::InsertPosition { position: 7, len: 3 }));
    assert_eq!(labels(&view), vec![0, 1, 2]);
    assert_eq!(view.selection(), &Selection::single(1));
}

#[test]
fn test_fill_column_follows_viewport_width() {
    let mut view = view_with_rows(2).with_columns(["Name", "Details"]);
    assert_eq!(view.store().column_widths(), &[80.0, 120.0]);

    view.resize(300.0, 100.0);
    assert_eq!(view.store().column_widths(), &[80.0, 220.0]);
    let header_widths: Vec<f32> = view.headers().iter().map(|h| h.width).collect();
    assert_eq!(header_widths, vec![80.0, 220.0]);
}

#[test]
fn test_row_requests_are_applied_on_drain() {
    let mut view = view_with_rows(3);
    let parent = view.rows()[0].clone();

    assert!(parent.request_insert_children(vec![child(10, &parent), child(11, &parent)]));
    assert!(parent.request_redraw());
    assert_eq!(view.row_count(), 3);

    assert_eq!(view.process_row_requests(), 2);
    assert_eq!(labels(&view), vec![0, 10, 11, 1, 2]);
    assert_eq!(view.scroll().upper(), 100.0);

    let tail = view.rows()[4].clone();
    assert!(tail.request_delete(vec![tail.clone()]));
    view.process_row_requests();
    assert_eq!(labels(&view), vec![0, 10, 11, 1]);
    assert!(!tail.is_attached());
    assert!(!tail.request_redraw());
}

#[test]
fn test_redraw_requests_coalesce_per_tick() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    let mut view = view_with_rows(50);
    let repaints = Arc::new(AtomicUsize::new(0));
    let counter = repaints.clone();
    view.repaint_requested.connect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    for row in view.rows().to_vec() {
        row.request_redraw();
        row.request_redraw();
    }
    view.process_row_requests();

    let later = Instant::now() + Duration::from_millis(150);
    view.process_timers(later);
    assert_eq!(repaints.load(Ordering::SeqCst), 1);
    view.process_timers(later + Duration::from_millis(100));
    assert_eq!(repaints.load(Ordering::SeqCst), 1);
}

/// A row whose height the application can change after insertion.
struct ResizableRow {
    height: Arc<Mutex<f32>>,
}

impl TreeRow for ResizableRow {
    fn height(&self) -> f32 {
        *self.height.lock()
    }

    fn column_widths(&self) -> Vec<ColumnWidth> {
        vec![ColumnWidth::Fill]
    }

    fn paint_column(&self, _column: usize, _rect: Rect, _ctx: &mut PaintContext<'_>) {}
}

#[test]
fn test_scroll_range_follows_row_height_change() {
    init_tracing();
    let height = Arc::new(Mutex::new(20.0));
    let rows: Vec<_> = (0..10)
        .map(|_| RowHandle::new(ResizableRow { height: height.clone() }))
        .collect();

    let mut view = TreeView::new(TreeViewConfig::default().with_sort_threads(1)).unwrap();
    view.add_items(rows.clone(), None, false).unwrap();
    view.resize(200.0, 100.0);
    view.set_scroll_offset(100.0);
    assert_eq!(view.scroll().upper(), 200.0);

    *height.lock() = 5.0;
    for row in &rows {
        assert!(row.request_redraw());
    }
    view.process_row_requests();

    assert_eq!(view.scroll().upper(), 50.0);
    assert_eq!(view.scroll_offset(), 0.0);
    let range = view.visible_range().unwrap();
    assert_eq!((range.start_row, range.end_row), (0, 10));
    view.paint(&mut RecordingCanvas::new(200.0, 100.0));
}
