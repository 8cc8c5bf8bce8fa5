//! Column headers and the sort indicator.
//!
//! Each column has a header carrying its title, its current width, and an
//! ascending flag that flips every time the header is clicked. Exactly one
//! header at a time shows the sort indicator.
//!
//! # Signals
//!
//! - `sort_requested((usize, SortOrder))`: Emitted when a header click asks
//!   for its column to be sorted.

use horizon_treeview_core::Signal;
use horizon_treeview_core::logging::targets;

use crate::error::{TreeViewError, TreeViewResult};
use crate::style::StyleProvider;

/// Theme image whose height sets the header height.
const HEADER_IMAGE: &str = "listview/header_press.png";

/// Sort order shown by a header's indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Ascending,
    /// Descending order (Z-A, 9-0).
    Descending,
}

impl SortOrder {
    pub fn is_ascending(self) -> bool {
        self == SortOrder::Ascending
    }

    fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }
}

/// One column header.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnHeader {
    pub title: String,
    pub width: f32,
    /// Direction of the next sort. Starts `false` and flips before each
    /// sort, so the first click sorts ascending.
    pub sort_ascending: bool,
    /// Whether this header currently shows the sort indicator.
    pub is_sort_column: bool,
}

impl ColumnHeader {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: 0.0,
            sort_ascending: false,
            is_sort_column: false,
        }
    }
}

/// The header row above the viewport.
#[derive(Debug, Default)]
pub struct ColumnHeaders {
    headers: Vec<ColumnHeader>,
    height: f32,

    /// Emitted when a header click asks for its column to be sorted.
    pub sort_requested: Signal<(usize, SortOrder)>,
}

impl ColumnHeaders {
    /// Create headers with the given titles, sized from the theme.
    pub fn new<S: Into<String>>(titles: impl IntoIterator<Item = S>, style: &dyn StyleProvider) -> Self {
        Self {
            headers: titles.into_iter().map(ColumnHeader::new).collect(),
            height: style.pixbuf_for(HEADER_IMAGE).size.height,
            sort_requested: Signal::new(),
        }
    }

    /// Replace the headers, dropping any sort indicator. Connections on
    /// `sort_requested` are kept.
    pub fn set_titles<S: Into<String>>(&mut self, titles: impl IntoIterator<Item = S>) {
        self.headers = titles.into_iter().map(ColumnHeader::new).collect();
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ColumnHeader> {
        self.headers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnHeader> {
        self.headers.iter()
    }

    /// Height of the header row, taken from the theme's header image.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Refresh the header height after a theme change.
    pub fn update_height(&mut self, style: &dyn StyleProvider) {
        self.height = style.pixbuf_for(HEADER_IMAGE).size.height;
    }

    /// Copy resolved column widths onto the headers. Columns without a header
    /// are ignored; headers without a column get width 0.
    pub fn sync_widths(&mut self, widths: &[f32]) {
        for (index, header) in self.headers.iter_mut().enumerate() {
            header.width = widths.get(index).copied().unwrap_or(0.0);
        }
    }

    /// Handle a click on header `index`: flip its direction, move the sort
    /// indicator onto it, and emit `sort_requested`.
    pub fn toggle_sort(&mut self, index: usize) -> TreeViewResult<SortOrder> {
        let count = self.headers.len();
        if index >= count {
            return Err(TreeViewError::ColumnOutOfRange {
                column: index,
                count,
            });
        }

        for (i, header) in self.headers.iter_mut().enumerate() {
            if i == index {
                header.sort_ascending = !header.sort_ascending;
                header.is_sort_column = true;
            } else {
                header.is_sort_column = false;
            }
        }

        let order = SortOrder::from_ascending(self.headers[index].sort_ascending);
        tracing::debug!(target: targets::INTERACTION, column = index, ?order, "header clicked");
        self.sort_requested.emit((index, order));
        Ok(order)
    }

    /// The column showing the sort indicator and its order.
    pub fn active_sort(&self) -> Option<(usize, SortOrder)> {
        self.headers
            .iter()
            .position(|h| h.is_sort_column)
            .map(|i| (i, SortOrder::from_ascending(self.headers[i].sort_ascending)))
    }
}
