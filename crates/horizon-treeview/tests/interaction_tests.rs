//! Tests for pointer and keyboard selection end to end.

mod common;

use std::time::{Duration, Instant};

use common::*;
use horizon_treeview::prelude::*;

fn click(view: &mut TreeView, y: f32, modifiers: KeyboardModifiers) {
    let event = PointerEvent::new(20.0, y).with_modifiers(modifiers);
    view.handle_mouse_press(&event);
    view.handle_mouse_release(&event);
}

#[test]
fn test_visible_range_for_uniform_rows() {
    let mut view = view_with_rows(5);
    view.resize(200.0, 50.0);
    view.set_scroll_offset(10.0);

    let range = view.visible_range().unwrap();
    assert_eq!((range.start_row, range.end_row, range.start_y), (0, 3, 0.0));
}

#[test]
fn test_shift_click_scenario() {
    let mut view = view_with_rows(5);
    click(&mut view, 30.0, KeyboardModifiers::NONE);
    click(&mut view, 70.0, KeyboardModifiers::SHIFT);
    assert_eq!(view.selection().to_vec(), vec![1, 2, 3]);
    assert_eq!(view.anchor_row(), Some(1));

    click(&mut view, 10.0, KeyboardModifiers::SHIFT);
    assert_eq!(view.selection().to_vec(), vec![0, 1, 2, 3]);
    assert_eq!(view.anchor_row(), Some(3));
}

#[test]
fn test_drag_reorder_scenario() {
    let mut view = view_with_rows(5);
    click(&mut view, 50.0, KeyboardModifiers::NONE);
    click(&mut view, 70.0, KeyboardModifiers::SHIFT);
    assert_eq!(view.selection().to_vec(), vec![2, 3]);

    let start = Instant::now();
    view.handle_mouse_press(&PointerEvent::new(20.0, 50.0).with_time(start));
    view.handle_mouse_move(&PointerEvent::new(20.0, 30.0).with_time(start));
    view.handle_mouse_move(&PointerEvent::new(20.0, 5.0).with_time(start));
    assert_eq!(view.interaction_state(), InteractionState::Dragging);
    view.handle_mouse_release(&PointerEvent::new(20.0, 5.0).with_time(start));

    assert_eq!(labels(&view), vec![2, 3, 0, 1, 4]);
    assert_eq!(view.selection().to_vec(), vec![0, 1]);
    assert_eq!(view.interaction_state(), InteractionState::Idle);
    assert_indices_contiguous(&view);
}

#[test]
fn test_drag_out_through_top_edge_keeps_order() {
    let mut view = view_with_rows(5);
    view.set_selection(Selection::range(2, 3));

    let start = Instant::now();
    view.handle_mouse_press(&PointerEvent::new(20.0, 50.0).with_time(start));
    view.handle_mouse_move(&PointerEvent::new(20.0, 45.0).with_time(start));
    view.handle_mouse_move(&PointerEvent::new(20.0, -10.0).with_time(start));
    assert_eq!(view.interaction_state(), InteractionState::Dragging);
    view.handle_mouse_release(&PointerEvent::new(20.0, -10.0).with_time(start));

    assert_eq!(labels(&view), vec![0, 1, 2, 3, 4]);
    assert_eq!(view.selection().to_vec(), vec![2, 3]);
    assert!(view.rows().iter().all(|row| row.drag_line() == DragLine::None));
    assert_eq!(view.interaction_state(), InteractionState::Idle);
}

#[test]
fn test_drag_disabled_falls_back_to_range_select() {
    let mut view = TreeView::new(TreeViewConfig::default().with_drag_drop(false)).unwrap();
    view.add_items((0..5).map(|i| row(i, 20.0)).collect(), None, false)
        .unwrap();
    view.resize(200.0, 100.0);
    view.set_selection(Selection::range(2, 3));

    let start = Instant::now();
    view.handle_mouse_press(&PointerEvent::new(20.0, 50.0).with_time(start));
    view.handle_mouse_move(&PointerEvent::new(20.0, 10.0).with_time(start));
    assert_eq!(view.interaction_state(), InteractionState::RangeSelecting);
    view.handle_mouse_release(&PointerEvent::new(20.0, 10.0));

    assert_eq!(labels(&view), vec![0, 1, 2, 3, 4]);
    assert_eq!(view.selection().to_vec(), vec![0, 1, 2]);
}

#[test]
fn test_select_all_then_delete_hundred_rows() {
    let mut view = view_with_rows(100);
    view.set_scroll_offset(500.0);

    assert!(view.handle_key_press(&KeyEvent::new(Key::A).with_modifiers(KeyboardModifiers::CTRL)));
    assert_eq!(view.selection().len(), 100);
    assert!(view.handle_key_press(&KeyEvent::new(Key::Delete)));

    assert_eq!(view.row_count(), 0);
    assert!(view.selection().is_empty());
    assert_eq!(view.anchor_row(), None);
    assert_eq!(view.scroll().upper(), 0.0);
    assert_eq!(view.scroll_offset(), 0.0);
    assert!(view.visible_range().is_none());
}

#[test]
fn test_auto_scroll_cancelled_when_leaving_band() {
    let mut view = view_with_rows(30);
    let start = Instant::now();
    view.handle_mouse_press(&PointerEvent::new(20.0, 50.0).with_time(start));
    view.handle_mouse_move(&PointerEvent::new(20.0, 99.0).with_time(start));

    view.process_timers(start + Duration::from_millis(70));
    assert_eq!(view.scroll_offset(), 24.0);

    view.handle_mouse_move(&PointerEvent::new(20.0, 50.0).with_time(start + Duration::from_millis(80)));
    view.process_timers(start + Duration::from_millis(300));
    assert_eq!(view.scroll_offset(), 24.0);
}

#[test]
fn test_auto_scroll_up_stops_at_top() {
    let mut view = view_with_rows(30);
    view.set_scroll_offset(30.0);
    let start = Instant::now();
    view.handle_mouse_press(&PointerEvent::new(20.0, 60.0).with_time(start));
    view.handle_mouse_move(&PointerEvent::new(20.0, 5.0).with_time(start));

    view.process_timers(start + Duration::from_millis(70));
    assert_eq!(view.scroll_offset(), 6.0);
    view.process_timers(start + Duration::from_millis(140));
    assert_eq!(view.scroll_offset(), 0.0);
    assert_eq!(view.selection().first(), Some(0));
}

#[test]
fn test_collapse_child_scrolls_parent_into_view() {
    let mut view = view_with_rows(3);
    let parent = view.rows()[1].clone();
    let children: Vec<_> = (0..10).map(|i| child(100 + i, &parent)).collect();
    view.add_items(children, Some(2), false).unwrap();

    view.set_scroll_offset(100.0);
    view.set_selection(Selection::single(8));
    assert!(view.handle_key_press(&KeyEvent::new(Key::ArrowLeft)));

    assert_eq!(view.selection().to_vec(), vec![1]);
    // Parent top 20 minus its height 20.
    assert_eq!(view.scroll_offset(), 0.0);
}
