//! Mapping between pixel offsets and rows of non-uniform height.
//!
//! There is no secondary index: every lookup is a linear scan that
//! accumulates heights, O(n) in the number of rows. That is fine for
//! interactive list sizes but is not meant for very large N.
//!
//! Row intervals are closed, `[top, top + height]`, so a y value that sits
//! exactly on the boundary between two rows belongs to the earlier row.

/// Index of the row whose interval contains content coordinate `y`, or
/// `None` if `y` is negative or beyond the total height.
pub fn row_at_y(heights: &[f32], y: f32) -> Option<usize> {
    if y < 0.0 {
        return None;
    }
    let mut top = 0.0;
    for (index, height) in heights.iter().enumerate() {
        if top <= y && y <= top + height {
            return Some(index);
        }
        top += height;
    }
    None
}

/// Content y of the top edge of row `index`.
pub fn row_top(heights: &[f32], index: usize) -> f32 {
    heights.iter().take(index).sum()
}

pub fn total_height(heights: &[f32]) -> f32 {
    heights.iter().sum()
}

/// The rows intersecting a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRange {
    /// First row, whose interval contains the scroll offset.
    pub start_row: usize,
    /// One past the last row. Half-open.
    pub end_row: usize,
    /// Content y of `start_row`'s top edge.
    pub start_y: f32,
}

impl VisibleRange {
    pub fn rows(&self) -> std::ops::Range<usize> {
        self.start_row..self.end_row
    }
}

/// Compute the rows visible for a scroll `offset` and `page_size`.
///
/// `end_row` is one past the first row, searching from `start_row` onward,
/// whose interval contains `offset + page_size`, or the row count if the
/// content ends inside the page. Returns `None` for an empty store.
///
/// # Panics
///
/// Panics if the store is non-empty and no row contains `offset`. Scroll
/// state keeps the offset within the content, so this indicates corrupted
/// height or offset bookkeeping.
pub fn visible_range(heights: &[f32], offset: f32, page_size: f32) -> Option<VisibleRange> {
    if heights.is_empty() {
        return None;
    }

    let bottom = offset + page_size;
    let mut start: Option<(usize, f32)> = None;
    let mut end_row = None;
    let mut top = 0.0;

    for (index, height) in heights.iter().enumerate() {
        let interval_end = top + height;
        if start.is_none() && top <= offset && offset <= interval_end {
            start = Some((index, top));
        }
        if start.is_some() && top <= bottom && bottom <= interval_end {
            end_row = Some(index + 1);
            break;
        }
        top = interval_end;
    }

    let Some((start_row, start_y)) = start else {
        panic!(
            "no row contains scroll offset {offset} (content height {})",
            total_height(heights)
        );
    };

    Some(VisibleRange {
        start_row,
        end_row: end_row.unwrap_or(heights.len()),
        start_y,
    })
}

/// Vertical scroll position of the viewport.
///
/// The lower bound is always 0. `offset` is kept within
/// `[0, max(upper - page_size, 0)]` by every setter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollState {
    offset: f32,
    page_size: f32,
    upper: f32,
}

impl ScrollState {
    pub fn new(page_size: f32) -> Self {
        Self {
            offset: 0.0,
            page_size,
            upper: 0.0,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn page_size(&self) -> f32 {
        self.page_size
    }

    /// Total content height.
    pub fn upper(&self) -> f32 {
        self.upper
    }

    pub fn max_offset(&self) -> f32 {
        (self.upper - self.page_size).max(0.0)
    }

    /// Whether the viewport shows the very top of the content.
    pub fn at_top(&self) -> bool {
        self.offset <= 0.0
    }

    /// Whether the viewport shows the very bottom of the content.
    pub fn at_bottom(&self) -> bool {
        self.offset + self.page_size >= self.upper
    }

    /// Set the offset, clamped. Returns `true` if it changed.
    pub fn set_offset(&mut self, offset: f32) -> bool {
        let clamped = offset.clamp(0.0, self.max_offset());
        let changed = clamped != self.offset;
        self.offset = clamped;
        changed
    }

    pub fn scroll_by(&mut self, delta: f32) -> bool {
        self.set_offset(self.offset + delta)
    }

    pub fn scroll_to_top(&mut self) -> bool {
        self.set_offset(0.0)
    }

    pub fn scroll_to_bottom(&mut self) -> bool {
        self.set_offset(self.max_offset())
    }

    pub fn set_page_size(&mut self, page_size: f32) {
        self.page_size = page_size.max(0.0);
        self.set_offset(self.offset);
    }

    /// Update the content height, re-clamping the offset.
    pub fn set_upper(&mut self, upper: f32) {
        self.upper = upper.max(0.0);
        self.set_offset(self.offset);
    }

    /// Scroll the minimum amount that makes `[top, top + height]` fully visible.
    pub fn ensure_visible(&mut self, top: f32, height: f32) -> bool {
        if top < self.offset {
            self.set_offset(top)
        } else if top + height > self.offset + self.page_size {
            self.set_offset(top + height - self.page_size)
        } else {
            false
        }
    }
}
