//! Index-based selection state.

use std::collections::BTreeSet;

/// The set of selected row indices plus the anchor that range operations
/// extend from.
///
/// An empty selection never carries an anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    rows: BTreeSet<usize>,
    anchor: Option<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from explicit rows and anchor.
    pub fn from_rows(rows: impl IntoIterator<Item = usize>, anchor: Option<usize>) -> Self {
        let mut selection = Self {
            rows: rows.into_iter().collect(),
            anchor,
        };
        selection.normalize();
        selection
    }

    /// A selection of exactly one row, anchored on it.
    pub fn single(row: usize) -> Self {
        Self::from_rows([row], Some(row))
    }

    /// The contiguous range between `anchor` and `to`, anchored on `anchor`.
    pub fn range(anchor: usize, to: usize) -> Self {
        let (lo, hi) = if anchor <= to { (anchor, to) } else { (to, anchor) };
        Self::from_rows(lo..=hi, Some(anchor))
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn contains(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Selected rows in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Lowest selected row.
    pub fn first(&self) -> Option<usize> {
        self.rows.first().copied()
    }

    /// Highest selected row.
    pub fn last(&self) -> Option<usize> {
        self.rows.last().copied()
    }

    /// Whether the selected rows form one contiguous run.
    pub fn is_contiguous(&self) -> bool {
        match (self.first(), self.last()) {
            (Some(lo), Some(hi)) => hi - lo + 1 == self.len(),
            _ => true,
        }
    }

    /// Flip membership of `row` and move the anchor onto it.
    pub fn toggle(&mut self, row: usize) {
        if !self.rows.remove(&row) {
            self.rows.insert(row);
        }
        self.anchor = Some(row);
        self.normalize();
    }

    /// The range a shift-extension to `to` produces.
    ///
    /// When the anchor is one boundary of a multi-row contiguous selection and
    /// `to` lies outside it, the boundary farthest from `to` becomes the fixed
    /// end so the existing run is kept. Otherwise the range runs from the
    /// anchor to `to`. Without an anchor the result is `to` alone.
    pub fn extended_to(&self, to: usize) -> Selection {
        let Some(anchor) = self.anchor else {
            return Selection::single(to);
        };

        match (self.first(), self.last()) {
            (Some(lo), Some(hi))
                if lo != hi && self.is_contiguous() && (anchor == lo || anchor == hi) =>
            {
                if to < lo {
                    Selection::range(hi, to)
                } else if to > hi {
                    Selection::range(lo, to)
                } else {
                    Selection::range(anchor, to)
                }
            }
            _ => Selection::range(anchor, to),
        }
    }

    /// Drop rows at or past `len`, and the anchor with them.
    pub fn truncate(&mut self, len: usize) {
        self.rows.retain(|&row| row < len);
        if self.anchor.is_some_and(|a| a >= len) {
            self.anchor = None;
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        if self.rows.is_empty() {
            self.anchor = None;
        }
    }
}
