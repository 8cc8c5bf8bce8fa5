//! Pointer interaction: click selection, drag-to-select, drag-reorder, and
//! edge auto-scroll.

use std::collections::HashSet;
use std::time::Instant;

use horizon_treeview_core::logging::targets;
use horizon_treeview_core::{Point, TimerId};

use super::TreeView;
use crate::events::{KeyboardModifiers, MouseButton, PointerEvent};
use crate::model::{DragLine, RowHandle, RowId, Selection};

/// What a held pointer is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// No gesture beyond a possible click.
    #[default]
    Idle,
    /// Sweeping out a selection from the anchor to the hovered row.
    RangeSelecting,
    /// Carrying the selected rows to a drop position.
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollDirection {
    Up,
    Down,
}

/// Pointer bookkeeping between press and release.
#[derive(Debug, Default)]
pub(crate) struct PointerState {
    state: InteractionState,
    pressed: bool,
    /// Row under the press.
    press_row: Option<RowId>,
    /// Set by a press on an already selected row; collapses the selection to
    /// that row on release unless the pointer moves first.
    pending_deselect: bool,
    /// Row that starts a drag if the pointer moves.
    drag_candidate: Option<RowId>,
    /// Insert position for a drop. Equal to the row count for "at the end".
    drag_target: Option<usize>,
    /// Row currently drawing the drop indicator.
    drag_line_row: Option<RowHandle>,
    last_pos: Point,
    last_modifiers: KeyboardModifiers,
    auto_scroll: Option<(TimerId, ScrollDirection)>,
}

impl PointerState {
    pub(crate) fn state(&self) -> InteractionState {
        self.state
    }

    pub(crate) fn auto_scroll_timer(&self) -> Option<TimerId> {
        self.auto_scroll.map(|(id, _)| id)
    }

    /// Drop references to rows that have left the store.
    pub(crate) fn forget_rows(&mut self, removed: &HashSet<RowId>) {
        if self.press_row.is_some_and(|id| removed.contains(&id)) {
            self.press_row = None;
            self.pending_deselect = false;
        }
        if self.drag_candidate.is_some_and(|id| removed.contains(&id)) {
            self.drag_candidate = None;
            self.drag_target = None;
        }
        if self
            .drag_line_row
            .as_ref()
            .is_some_and(|row| removed.contains(&row.id()))
        {
            self.drag_line_row = None;
        }
    }
}

impl TreeView {
    /// Handle a button press at a viewport position. Returns `true` if the
    /// event was consumed.
    pub fn handle_mouse_press(&mut self, event: &PointerEvent) -> bool {
        if event.button != MouseButton::Left {
            return false;
        }

        self.cancel_auto_scroll();
        self.clear_drag_line();
        self.pointer = PointerState {
            pressed: true,
            last_pos: event.pos,
            last_modifiers: event.modifiers,
            ..PointerState::default()
        };

        let Some(index) = self.row_at_y(event.pos.y) else {
            self.set_selection(Selection::new());
            return true;
        };
        let Some(row_id) = self.store.get(index).map(RowHandle::id) else {
            return true;
        };
        self.pointer.press_row = Some(row_id);

        let multi = self.config.enable_multiple_select;
        if multi && event.modifiers.shift {
            let extended = self.store.selection().extended_to(index);
            self.set_selection(extended);
        } else if multi && event.modifiers.control {
            let mut toggled = self.store.selection().clone();
            toggled.toggle(index);
            self.set_selection(toggled);
        } else if self.store.selection().contains(index) && self.config.enable_drag_drop {
            self.pointer.pending_deselect = true;
            self.pointer.drag_candidate = Some(row_id);
        } else {
            self.set_selection(Selection::single(index));
        }

        tracing::trace!(
            target: targets::INTERACTION,
            row = index,
            modifiers = ?event.modifiers,
            "pointer pressed"
        );
        true
    }

    /// Handle pointer motion. Only motion with the button held does anything.
    pub fn handle_mouse_move(&mut self, event: &PointerEvent) -> bool {
        if !self.pointer.pressed {
            return false;
        }

        self.pointer.last_pos = event.pos;
        self.pointer.last_modifiers = event.modifiers;
        self.pointer.pending_deselect = false;

        self.track_pointer();
        self.update_auto_scroll(event.time);
        true
    }

    /// Handle a button release: commit a drop, resolve a pending deselect,
    /// fire click activation, and return to idle.
    pub fn handle_mouse_release(&mut self, event: &PointerEvent) -> bool {
        if event.button != MouseButton::Left || !self.pointer.pressed {
            return false;
        }

        self.cancel_auto_scroll();
        let state = self.pointer.state;
        let press_index = self.pointer.press_row.and_then(|id| self.store.position(id));

        if state == InteractionState::Dragging {
            if let Some(target) = self.pointer.drag_target
                && self.in_drop_area(event.pos)
            {
                self.commit_reorder(target);
            }
        } else if self.pointer.pending_deselect
            && let Some(index) = press_index
        {
            self.set_selection(Selection::single(index));
        }
        self.clear_drag_line();

        let release_index = self.row_at_y(event.pos.y);
        if state != InteractionState::Dragging
            && let Some(index) = press_index
            && release_index == Some(index)
            && let Some(row) = self.store.get(index).cloned()
        {
            if event.click_count >= 2 {
                tracing::debug!(target: targets::INTERACTION, row = index, "row double-clicked");
                row.row().double_click();
                self.double_clicked.emit(index);
            } else if state == InteractionState::Idle && !event.modifiers.any() {
                tracing::debug!(target: targets::INTERACTION, row = index, "row clicked");
                row.row().single_click();
                self.single_clicked.emit(index);
            }
        }

        self.pointer = PointerState::default();
        self.process_row_requests();
        true
    }

    /// Re-evaluate the gesture at the last pointer position.
    fn track_pointer(&mut self) {
        let pos = self.pointer.last_pos;

        if self.pointer.drag_candidate.is_some() && self.pointer.state != InteractionState::RangeSelecting {
            if self.in_drop_area(pos) {
                if self.pointer.state != InteractionState::Dragging {
                    tracing::debug!(target: targets::INTERACTION, "drag started");
                }
                self.pointer.state = InteractionState::Dragging;
                self.update_drag_target(pos);
            } else {
                self.pointer.drag_target = None;
                self.clear_drag_line();
            }
        } else if self.config.enable_multiple_select
            && !self.pointer.last_modifiers.any()
            && self.pointer.state != InteractionState::Dragging
        {
            self.pointer.state = InteractionState::RangeSelecting;
            if let Some(hover) = self.row_at_y(pos.y)
                && let Some(anchor) = self.store.selection().anchor()
            {
                self.set_selection(Selection::range(anchor, hover));
            }
        }
    }

    /// Whether `pos` is close enough to the viewport for a drop to count.
    fn in_drop_area(&self, pos: Point) -> bool {
        let slack = self.config.start_drag_offset;
        pos.x >= -slack
            && pos.x <= self.viewport_width + slack
            && pos.y >= -slack
            && pos.y <= self.scroll.page_size() + slack
    }

    /// Point the drop at the row under `pos`, or past the last row when `pos`
    /// is below the content or the viewport. Above the viewport there is no
    /// drop target.
    fn update_drag_target(&mut self, pos: Point) {
        let len = self.store.len();
        let target = if pos.y < 0.0 {
            None
        } else if pos.y >= self.scroll.page_size() {
            Some(len)
        } else {
            Some(self.row_at_y(pos.y).unwrap_or(len))
        };
        self.pointer.drag_target = target;
        let Some(target) = target else {
            self.clear_drag_line();
            return;
        };

        let (row, line) = if target < len {
            (self.store.get(target).cloned(), DragLine::Above)
        } else {
            (self.store.rows().last().cloned(), DragLine::Below)
        };

        if self.pointer.drag_line_row != row {
            self.clear_drag_line();
        }
        if let Some(row) = row {
            if row.drag_line() != line {
                row.set_drag_line(line);
                self.scheduler.request_viewport();
            }
            self.pointer.drag_line_row = Some(row);
        }
    }

    fn clear_drag_line(&mut self) {
        if let Some(row) = self.pointer.drag_line_row.take() {
            row.set_drag_line(DragLine::None);
            self.scheduler.request_viewport();
        }
    }

    /// Move the selected rows, in their current order, to sit as one block
    /// before the row at `target`, or at the end if `target` is the row count.
    fn commit_reorder(&mut self, target: usize) {
        let selection = self.store.selection();
        if selection.is_empty() {
            return;
        }

        let insert_at = (0..target.min(self.store.len()))
            .filter(|index| !selection.contains(*index))
            .count();
        let (moving, remaining): (Vec<_>, Vec<_>) = self
            .store
            .rows()
            .iter()
            .cloned()
            .enumerate()
            .partition(|(index, _)| selection.contains(*index));

        let mut order: Vec<RowHandle> = Vec::with_capacity(self.store.len());
        order.extend(remaining[..insert_at].iter().map(|(_, row)| row.clone()));
        order.extend(moving.into_iter().map(|(_, row)| row));
        order.extend(remaining[insert_at..].iter().map(|(_, row)| row.clone()));

        if order.as_slice() == self.store.rows() {
            return;
        }

        tracing::debug!(target: targets::INTERACTION, target, insert_at, "drop committed");
        if self.store.reorder(order).is_ok() {
            self.after_structure_change();
        }
    }

    fn auto_scroll_direction(&self, y: f32) -> Option<ScrollDirection> {
        if self.pointer.state == InteractionState::Idle {
            return None;
        }
        let band = self.config.auto_scroll_band();
        if y > self.scroll.page_size() - band {
            Some(ScrollDirection::Down)
        } else if y < band {
            Some(ScrollDirection::Up)
        } else {
            None
        }
    }

    /// Start, keep, or stop the auto-scroll timer for the pointer's position.
    fn update_auto_scroll(&mut self, now: Instant) {
        let wanted = self.auto_scroll_direction(self.pointer.last_pos.y);
        let current = self.pointer.auto_scroll.map(|(_, direction)| direction);
        if wanted == current {
            return;
        }

        self.cancel_auto_scroll();
        let Some(direction) = wanted else {
            return;
        };
        match self.timers.start_repeating_at(now, self.config.auto_scroll_delay()) {
            Ok(id) => {
                tracing::trace!(target: targets::INTERACTION, ?direction, "auto-scroll started");
                self.pointer.auto_scroll = Some((id, direction));
            }
            Err(err) => {
                tracing::warn!(target: targets::INTERACTION, error = %err, "auto-scroll unavailable");
            }
        }
    }

    fn cancel_auto_scroll(&mut self) {
        if let Some((id, _)) = self.pointer.auto_scroll.take() {
            // Timer ids are only issued by this view's manager.
            let _ = self.timers.stop(id);
        }
    }

    pub(crate) fn auto_scroll_tick(&mut self) {
        let Some((_, direction)) = self.pointer.auto_scroll else {
            return;
        };
        let step = self.config.auto_scroll_step;
        let delta = match direction {
            ScrollDirection::Up => -step,
            ScrollDirection::Down => step,
        };
        if self.scroll.scroll_by(delta) {
            self.scheduler.request_viewport();
        }
        self.track_pointer();
    }
}
