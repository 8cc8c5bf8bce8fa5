//! Coalesced redraw scheduling.
//!
//! Rows ask for repaints far more often than the screen needs them. Requests
//! only mark the scheduler dirty; a repeating timer tick then flushes, issuing
//! at most one viewport repaint no matter how many requests arrived since
//! the previous tick.

use std::collections::HashSet;

use horizon_treeview_core::logging::targets;

use crate::model::RowId;

#[derive(Debug, Default)]
pub struct PaintScheduler {
    pending_rows: HashSet<RowId>,
    viewport_dirty: bool,
    flushes: u64,
}

impl PaintScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a repaint on behalf of a single row.
    pub fn request_row(&mut self, row: RowId) {
        self.pending_rows.insert(row);
    }

    /// Queue a repaint of the whole viewport.
    pub fn request_viewport(&mut self) {
        self.viewport_dirty = true;
    }

    pub fn has_pending(&self) -> bool {
        self.viewport_dirty || !self.pending_rows.is_empty()
    }

    /// Distinct rows waiting for the next flush.
    pub fn pending_rows(&self) -> usize {
        self.pending_rows.len()
    }

    /// Clear pending requests. Returns `true` if one repaint should be issued.
    pub fn flush(&mut self) -> bool {
        if !self.has_pending() {
            return false;
        }
        tracing::trace!(
            target: targets::PAINT,
            rows = self.pending_rows.len(),
            viewport = self.viewport_dirty,
            "flushing coalesced redraw"
        );
        self.pending_rows.clear();
        self.viewport_dirty = false;
        self.flushes += 1;
        true
    }

    /// Number of repaints issued so far.
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }
}
