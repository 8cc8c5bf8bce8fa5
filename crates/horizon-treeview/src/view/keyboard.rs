//! Keyboard navigation.
//!
//! Keys are only honoured while no pointer gesture is in progress.

use horizon_treeview_core::logging::targets;

use super::{InteractionState, TreeView, geometry};
use crate::events::{Key, KeyEvent};
use crate::model::{RowHandle, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Up,
    Down,
}

impl TreeView {
    /// Handle a key press. Returns `true` if the key was consumed.
    pub fn handle_key_press(&mut self, event: &KeyEvent) -> bool {
        if self.pointer.state() != InteractionState::Idle {
            return false;
        }
        if self.store.is_empty() {
            return false;
        }

        let shift = event.modifiers.shift && self.config.enable_multiple_select;
        let last = self.store.len() - 1;

        tracing::trace!(target: targets::INTERACTION, key = ?event.key, "key pressed");

        match event.key {
            Key::Home => {
                if shift {
                    self.extend_selection_to(0);
                } else {
                    self.set_selection(Selection::single(0));
                }
                self.scroll_to_edge(Step::Up);
                true
            }
            Key::End => {
                if shift {
                    self.extend_selection_to(last);
                } else {
                    self.set_selection(Selection::single(last));
                }
                self.scroll_to_edge(Step::Down);
                true
            }
            Key::ArrowUp if shift => self.move_active_end(Step::Up),
            Key::ArrowDown if shift => self.move_active_end(Step::Down),
            Key::ArrowUp => self.move_anchor(Step::Up),
            Key::ArrowDown => self.move_anchor(Step::Down),
            Key::PageUp => self.move_page(Step::Up),
            Key::PageDown => self.move_page(Step::Down),
            Key::A if event.modifiers.control && self.config.enable_multiple_select => {
                let anchor = self.store.selection().anchor().unwrap_or(0);
                self.set_selection(Selection::from_rows(0..=last, Some(anchor)));
                true
            }
            Key::Delete => self.delete_selected(),
            Key::ArrowLeft => self.collapse_selected(),
            Key::ArrowRight => self.expand_selected(),
            _ => false,
        }
    }

    fn scroll_to_edge(&mut self, step: Step) {
        let changed = match step {
            Step::Up => self.scroll.scroll_to_top(),
            Step::Down => self.scroll.scroll_to_bottom(),
        };
        if changed {
            self.scheduler.request_viewport();
        }
    }

    fn extend_selection_to(&mut self, index: usize) {
        let extended = self.store.selection().extended_to(index);
        self.set_selection(extended);
    }

    /// Select the first row when nothing is selected. Returns `true` if it did.
    fn select_first_if_empty(&mut self) -> bool {
        if !self.store.selection().is_empty() {
            return false;
        }
        self.set_selection(Selection::single(0));
        self.ensure_row_visible(0);
        true
    }

    /// Select only the row one step from the anchor.
    fn move_anchor(&mut self, step: Step) -> bool {
        if self.select_first_if_empty() {
            return true;
        }
        let selection = self.store.selection();
        let Some(from) = selection.anchor().or(selection.first()) else {
            return false;
        };
        let to = self.step_index(from, step);
        self.set_selection(Selection::single(to));
        self.ensure_row_visible(to);
        true
    }

    /// Grow or shrink the range by moving the end opposite the anchor.
    fn move_active_end(&mut self, step: Step) -> bool {
        if self.select_first_if_empty() {
            return true;
        }
        let selection = self.store.selection();
        let (Some(lo), Some(hi)) = (selection.first(), selection.last()) else {
            return false;
        };
        let anchor = selection.anchor().unwrap_or(lo);
        let active = if anchor == lo { hi } else { lo };
        let to = self.step_index(active, step);
        self.set_selection(Selection::range(anchor, to));
        self.ensure_row_visible(to);
        true
    }

    fn step_index(&self, from: usize, step: Step) -> usize {
        match step {
            Step::Up => from.saturating_sub(1),
            Step::Down => (from + 1).min(self.store.len() - 1),
        }
    }

    /// Move the selection by one page of pixels, scrolling by the same amount
    /// so the selected row keeps its place on screen.
    fn move_page(&mut self, step: Step) -> bool {
        let heights = self.store.heights();
        let page = self.scroll.page_size();
        let upper = self.scroll.upper();
        let last = heights.len() - 1;

        let anchor = self.store.selection().anchor();
        let (target_y, origin_y) = match anchor {
            Some(anchor) => {
                let top = geometry::row_top(&heights, anchor);
                match step {
                    Step::Up => ((top - page).max(0.0), top),
                    Step::Down => ((top + heights[anchor] + page).min(upper), top + heights[anchor]),
                }
            }
            None => {
                let offset = self.scroll.offset();
                match step {
                    Step::Up => ((offset - page).max(0.0), offset),
                    Step::Down => ((offset + page).min(upper), offset),
                }
            }
        };

        let target = geometry::row_at_y(&heights, target_y).unwrap_or(last);
        self.set_selection(Selection::single(target));

        let delta = match anchor {
            Some(anchor) => geometry::row_top(&heights, target) - geometry::row_top(&heights, anchor),
            None => target_y - origin_y,
        };
        if self.scroll.scroll_by(delta) {
            self.scheduler.request_viewport();
        }
        self.ensure_row_visible(target);
        true
    }

    /// Delete every selected row.
    fn delete_selected(&mut self) -> bool {
        let doomed = self.store.selected_rows();
        if doomed.is_empty() {
            return false;
        }
        self.set_selection(Selection::new());
        // Failures are logged by the store and leave the rows in place.
        let _ = self.delete_items(&doomed);
        true
    }

    /// The single selected row, if exactly one is selected.
    fn single_selected(&self) -> Option<(usize, RowHandle)> {
        let selection = self.store.selection();
        if selection.len() != 1 {
            return None;
        }
        let index = selection.first()?;
        Some((index, self.store.get(index)?.clone()))
    }

    fn expand_selected(&mut self) -> bool {
        let Some((index, row)) = self.single_selected() else {
            return false;
        };
        if !row.is_expanded() {
            tracing::debug!(target: targets::INTERACTION, row = index, "expanding row");
            row.set_expanded(true);
            row.row().expand(&row);
            self.process_row_requests();
        }
        true
    }

    /// Collapse an expanded row, or move from a collapsed child to its parent.
    fn collapse_selected(&mut self) -> bool {
        let Some((index, row)) = self.single_selected() else {
            return false;
        };

        if row.is_expanded() {
            tracing::debug!(target: targets::INTERACTION, row = index, "collapsing row");
            row.set_expanded(false);
            row.row().collapse(&row);
            self.process_row_requests();
            return true;
        }

        let Some(parent) = row.parent().and_then(|id| self.store.position(id)) else {
            return false;
        };
        self.set_selection(Selection::single(parent));

        let heights = self.store.heights();
        let parent_top = geometry::row_top(&heights, parent);
        if self.scroll.offset() > parent_top {
            let offset = (parent_top - heights[parent]).max(0.0);
            self.set_scroll_offset(offset);
        }
        true
    }
}
