//! The tree view façade.
//!
//! [`TreeView`] ties the row store, scroll geometry, paint scheduling,
//! pointer and keyboard interaction, column headers, and background sorting
//! together. It is driven entirely by the host: input events come in through
//! the `handle_*` methods, time advances through
//! [`process_timers`](TreeView::process_timers), and painting happens when the
//! host calls [`paint`](TreeView::paint) after `repaint_requested` fires.
//!
//! # Signals
//!
//! - `single_clicked(usize)`: Emitted when a row is clicked once
//! - `double_clicked(usize)`: Emitted when a row is double-clicked
//! - `repaint_requested(())`: Emitted at most once per redraw tick when
//!   anything visible changed

pub mod geometry;
pub mod header;
mod keyboard;
mod mouse;
pub mod paint;
pub mod scheduler;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use horizon_treeview_core::logging::{span_names, targets};
use horizon_treeview_core::{PerfSpan, Signal, Size, TimerId, TimerManager};

pub use geometry::{ScrollState, VisibleRange};
pub use header::{ColumnHeader, ColumnHeaders, SortOrder};
pub use mouse::InteractionState;
pub use paint::PaintPlan;
pub use scheduler::PaintScheduler;

use self::mouse::PointerState;
use crate::config::TreeViewConfig;
use crate::error::{TreeViewError, TreeViewResult};
use crate::model::{RowHandle, RowId, RowRequest, RowStore, Selection};
use crate::sort::{SortCoordinator, SortMethod, SortOutcome};
use crate::style::{Canvas, DefaultStyle, StyleProvider};

/// A virtualized, scrollable tree/list view.
pub struct TreeView {
    config: TreeViewConfig,
    store: RowStore,
    scroll: ScrollState,
    viewport_width: f32,
    scheduler: PaintScheduler,
    timers: TimerManager,
    redraw_timer: TimerId,
    pointer: PointerState,
    headers: ColumnHeaders,
    sorter: SortCoordinator,
    style: Arc<dyn StyleProvider>,
    requests: Receiver<RowRequest>,

    /// Emitted with the row index when a row is clicked once.
    pub single_clicked: Signal<usize>,
    /// Emitted with the row index when a row is double-clicked.
    pub double_clicked: Signal<usize>,
    /// Emitted when the viewport needs repainting.
    pub repaint_requested: Signal<()>,
}

impl TreeView {
    /// Create an empty view with the stock theme.
    pub fn new(config: TreeViewConfig) -> TreeViewResult<Self> {
        Self::with_style(config, Arc::new(DefaultStyle))
    }

    /// Create an empty view that resolves theme resources through `style`.
    pub fn with_style(config: TreeViewConfig, style: Arc<dyn StyleProvider>) -> TreeViewResult<Self> {
        let (sender, requests) = crossbeam_channel::unbounded();
        let mut timers = TimerManager::new();
        let redraw_timer = timers.start_repeating_at(Instant::now(), config.redraw_delay())?;
        let sorter = SortCoordinator::new(config.sort_threads)?;
        let headers = ColumnHeaders::new(Vec::<String>::new(), style.as_ref());

        horizon_treeview_core::treeview_debug!(?config, "tree view created");

        Ok(Self {
            config,
            store: RowStore::new(sender),
            scroll: ScrollState::default(),
            viewport_width: 0.0,
            scheduler: PaintScheduler::new(),
            timers,
            redraw_timer,
            pointer: PointerState::default(),
            headers,
            sorter,
            style,
            requests,
            single_clicked: Signal::new(),
            double_clicked: Signal::new(),
            repaint_requested: Signal::new(),
        })
    }

    /// Set the column header titles.
    pub fn with_columns<S: Into<String>>(mut self, titles: impl IntoIterator<Item = S>) -> Self {
        self.headers.set_titles(titles);
        self.headers.sync_widths(self.store.column_widths());
        self
    }

    pub fn config(&self) -> &TreeViewConfig {
        &self.config
    }

    pub fn style(&self) -> &dyn StyleProvider {
        self.style.as_ref()
    }

    /// Swap the theme. Header height and the whole viewport are refreshed.
    pub fn set_style(&mut self, style: Arc<dyn StyleProvider>) {
        self.style = style;
        self.headers.update_height(self.style.as_ref());
        self.scheduler.request_viewport();
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Insert `items` at `insert_pos` (end if `None`), or replace every row
    /// when `clear_first` is set.
    pub fn add_items(
        &mut self,
        items: Vec<RowHandle>,
        insert_pos: Option<usize>,
        clear_first: bool,
    ) -> TreeViewResult<()> {
        let result = self.store.add_items(items, insert_pos, clear_first);
        self.after_structure_change();
        result
    }

    /// Remove any of `items` present in the view. Returns the rows removed.
    pub fn delete_items(&mut self, items: &[RowHandle]) -> TreeViewResult<Vec<RowHandle>> {
        let result = self.store.delete_items(items);
        if let Ok(removed) = &result {
            let removed: HashSet<RowId> = removed.iter().map(RowHandle::id).collect();
            self.pointer.forget_rows(&removed);
        }
        self.after_structure_change();
        result
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    pub fn rows(&self) -> &[RowHandle] {
        self.store.rows()
    }

    pub fn row_count(&self) -> usize {
        self.store.len()
    }

    pub fn selection(&self) -> &Selection {
        self.store.selection()
    }

    pub fn selected_rows(&self) -> Vec<RowHandle> {
        self.store.selected_rows()
    }

    pub fn anchor_row(&self) -> Option<usize> {
        self.store.selection().anchor()
    }

    /// Replace the selection. Returns `true` if it changed.
    pub fn set_selection(&mut self, selection: Selection) -> bool {
        let changed = self.store.set_selection(selection);
        if changed {
            self.scheduler.request_viewport();
        }
        changed
    }

    /// Apply structural requests rows have raised since the last call.
    /// Returns the number of requests handled.
    pub fn process_row_requests(&mut self) -> usize {
        let mut handled = 0;
        let mut structural = false;
        let mut redrawn = false;

        while let Ok(request) = self.requests.try_recv() {
            handled += 1;
            let result = match request {
                RowRequest::Redraw(id) => {
                    redrawn = true;
                    self.scheduler.request_row(id);
                    Ok(())
                }
                RowRequest::Insert { items, position } => {
                    structural = true;
                    self.store.add_items(items, position, false)
                }
                RowRequest::InsertChildren { parent, items } => {
                    structural = true;
                    self.store.insert_children(parent, items)
                }
                RowRequest::Delete(items) => {
                    structural = true;
                    self.store.delete_items(&items).map(|removed| {
                        let removed = removed.iter().map(RowHandle::id).collect();
                        self.pointer.forget_rows(&removed);
                    })
                }
                RowRequest::RemoveChildren(parent) => {
                    structural = true;
                    self.store.remove_descendants(parent).map(|removed| {
                        let removed = removed.iter().map(RowHandle::id).collect();
                        self.pointer.forget_rows(&removed);
                    })
                }
            };
            if let Err(err) = result {
                tracing::warn!(target: targets::STORE, error = %err, "row request rejected");
            }
        }

        if structural {
            self.after_structure_change();
        } else if redrawn {
            self.refresh_row_metrics();
        }
        handled
    }

    /// Re-read row heights and column widths after a redraw request.
    fn refresh_row_metrics(&mut self) {
        let upper = self.scroll.upper();
        let total = self.store.total_height();
        if total != upper {
            tracing::debug!(target: targets::STORE, old = upper, new = total, "content height changed");
            self.scroll.set_upper(total);
            self.scheduler.request_viewport();
        }
        self.store.update_column_widths();
        self.headers.sync_widths(self.store.column_widths());
    }

    /// Re-derive everything that depends on row membership or heights.
    fn after_structure_change(&mut self) {
        self.scroll.set_upper(self.store.total_height());
        self.headers.sync_widths(self.store.column_widths());
        self.scheduler.request_viewport();
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// Register the comparator used when `column` is sorted.
    pub fn set_sort_method(&mut self, column: usize, method: SortMethod) {
        self.sorter.set_sort_method(column, method);
    }

    /// Start a background sort of `column` in the direction its header holds
    /// (ascending when there is no header). Returns the sort's epoch.
    pub fn sort_column(&mut self, column: usize) -> TreeViewResult<u64> {
        let ascending = self.headers.get(column).is_none_or(|h| h.sort_ascending);
        self.sorter.request(column, ascending, self.store.rows().to_vec())
    }

    /// Handle a click on column header `column`: flip its direction, move the
    /// sort indicator, and start sorting.
    ///
    /// A column without a sort method is rejected before the header changes.
    pub fn click_header(&mut self, column: usize) -> TreeViewResult<u64> {
        let count = self.headers.len();
        if column >= count {
            return Err(TreeViewError::ColumnOutOfRange { column, count });
        }
        if !self.sorter.has_sort_method(column) {
            return Err(TreeViewError::NoSortMethod(column));
        }
        self.headers.toggle_sort(column)?;
        self.scheduler.request_viewport();
        self.sort_column(column)
    }

    /// The epoch of the most recent sort request.
    pub fn sort_epoch(&self) -> u64 {
        self.sorter.epoch()
    }

    /// Apply the current sort if it has finished. Returns `true` if the row
    /// order was replaced.
    pub fn process_sort_results(&mut self) -> bool {
        match self.sorter.take_current() {
            Some(outcome) => self.apply_sort(outcome),
            None => false,
        }
    }

    /// Block until the current sort finishes (or `timeout` elapses) and apply
    /// it. Returns `true` if the row order was replaced.
    pub fn wait_for_sort(&mut self, timeout: Duration) -> bool {
        match self.sorter.wait_current(timeout) {
            Some(outcome) => self.apply_sort(outcome),
            None => false,
        }
    }

    /// Replace the row order with a sort outcome, reconciled against rows
    /// added or removed while the sort was running.
    fn apply_sort(&mut self, outcome: SortOutcome) -> bool {
        let present: HashSet<RowId> = self.store.rows().iter().map(RowHandle::id).collect();
        let mut order: Vec<RowHandle> = outcome
            .rows
            .into_iter()
            .filter(|row| present.contains(&row.id()))
            .collect();
        let sorted: HashSet<RowId> = order.iter().map(RowHandle::id).collect();
        order.extend(
            self.store
                .rows()
                .iter()
                .filter(|row| !sorted.contains(&row.id()))
                .cloned(),
        );

        tracing::debug!(
            target: targets::SORT,
            epoch = outcome.epoch,
            column = outcome.column,
            rows = order.len(),
            "applying sort result"
        );

        match self.store.reorder(order) {
            Ok(()) => {
                self.after_structure_change();
                true
            }
            Err(err) => {
                tracing::warn!(target: targets::SORT, error = %err, "sort result rejected by store");
                false
            }
        }
    }

    // =========================================================================
    // Headers
    // =========================================================================

    pub fn headers(&self) -> &ColumnHeaders {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut ColumnHeaders {
        &mut self.headers
    }

    // =========================================================================
    // Time
    // =========================================================================

    /// Fire every timer due at `now`: the coalesced redraw flush and, while
    /// the pointer sits in an auto-scroll band, the auto-scroll step.
    pub fn process_timers(&mut self, now: Instant) {
        for id in self.timers.process_expired_at(now) {
            if id == self.redraw_timer {
                if self.scheduler.flush() {
                    self.repaint_requested.emit(());
                }
            } else if self.pointer.auto_scroll_timer() == Some(id) {
                self.auto_scroll_tick();
            }
        }
    }

    /// Time until the next timer is due, for hosts that sleep between events.
    pub fn time_until_next_timer(&mut self, now: Instant) -> Option<Duration> {
        self.timers.time_until_next_at(now)
    }

    pub fn scheduler(&self) -> &PaintScheduler {
        &self.scheduler
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Resize the viewport. Fill columns and the scroll range follow.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport_width = width;
        self.store.set_viewport_width(width);
        self.scroll.set_page_size(height);
        self.scroll.set_upper(self.store.total_height());
        self.headers.sync_widths(self.store.column_widths());
        self.scheduler.request_viewport();
    }

    pub fn viewport_size(&self) -> Size {
        Size::new(self.viewport_width, self.scroll.page_size())
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll.offset()
    }

    /// Scroll to `offset`, clamped. Returns `true` if it changed.
    pub fn set_scroll_offset(&mut self, offset: f32) -> bool {
        let changed = self.scroll.set_offset(offset);
        if changed {
            self.scheduler.request_viewport();
        }
        changed
    }

    /// Scroll the minimum amount that brings row `index` fully into view.
    pub fn ensure_row_visible(&mut self, index: usize) -> bool {
        let Some(row) = self.store.get(index) else {
            return false;
        };
        let height = row.height();
        let top = geometry::row_top(&self.store.heights(), index);
        let changed = self.scroll.ensure_visible(top, height);
        if changed {
            self.scheduler.request_viewport();
        }
        changed
    }

    /// The rows intersecting the viewport.
    pub fn visible_range(&self) -> Option<VisibleRange> {
        geometry::visible_range(&self.store.heights(), self.scroll.offset(), self.scroll.page_size())
    }

    /// The row under viewport coordinate `y`.
    pub fn row_at_y(&self, y: f32) -> Option<usize> {
        geometry::row_at_y(&self.store.heights(), y + self.scroll.offset())
    }

    // =========================================================================
    // Painting
    // =========================================================================

    /// How the next paint pass will split the visible rows.
    pub fn paint_plan(&self) -> Option<PaintPlan> {
        paint::plan_paint(
            &self.store.heights(),
            &self.scroll,
            self.viewport_width,
            self.config.mask_bound_height,
        )
    }

    /// Paint the viewport onto `canvas`.
    pub fn paint(&self, canvas: &mut dyn Canvas) {
        let _span = PerfSpan::new(span_names::PAINT);
        let style = self.style.as_ref();
        paint::paint_background(canvas, style, self.viewport_size());
        if let Some(plan) = self.paint_plan() {
            paint::paint_plan(canvas, style, &self.store, &plan, &self.scroll, self.viewport_width);
        }
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    pub fn interaction_state(&self) -> InteractionState {
        self.pointer.state()
    }
}

impl std::fmt::Debug for TreeView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeView")
            .field("rows", &self.store.len())
            .field("selection", self.store.selection())
            .field("scroll", &self.scroll)
            .field("state", &self.pointer.state())
            .field("sorter", &self.sorter)
            .finish()
    }
}

static_assertions::assert_impl_all!(TreeView: Send);
