//! The ordered row store.
//!
//! [`RowStore`] owns the sequence of visible rows and the index-based
//! [`Selection`] over them. Every structural mutation goes through
//! [`RowStore::keep_select_status`], which snapshots selected identities
//! before the mutation and rebuilds indices afterwards, so a selected row that
//! survives a mutation stays selected at its new position and a removed row
//! never lingers in the selection.

use std::collections::HashSet;

use crossbeam_channel::Sender;
use horizon_treeview_core::logging::{span_names, targets};
use horizon_treeview_core::PerfSpan;

use super::row::{ColumnWidth, DragLine, RowHandle, RowId, RowRequest};
use super::selection::Selection;
use crate::error::{TreeViewError, TreeViewResult};

/// Selected identities captured before a mutation.
#[derive(Debug, Default)]
struct SelectionSnapshot {
    selected: HashSet<RowId>,
    anchor: Option<RowId>,
}

impl SelectionSnapshot {
    fn capture(rows: &[RowHandle], selection: &Selection) -> Self {
        Self {
            selected: selection
                .iter()
                .filter_map(|index| rows.get(index))
                .map(RowHandle::id)
                .collect(),
            anchor: selection
                .anchor()
                .and_then(|index| rows.get(index))
                .map(RowHandle::id),
        }
    }

    /// Map the captured identities onto `rows` in a single pass, stopping as
    /// soon as every identity has been located.
    fn rebuild(&self, rows: &[RowHandle]) -> Selection {
        let mut pending = self.selected.len();
        let mut anchor_pending = self.anchor.is_some();
        let mut picked = Vec::with_capacity(pending);
        let mut anchor = None;

        for (index, row) in rows.iter().enumerate() {
            if pending == 0 && !anchor_pending {
                break;
            }
            let id = row.id();
            if self.selected.contains(&id) {
                picked.push(index);
                pending -= 1;
            }
            if anchor_pending && self.anchor == Some(id) {
                anchor = Some(index);
                anchor_pending = false;
            }
        }

        Selection::from_rows(picked, anchor)
    }
}

/// The ordered collection of rows backing a view.
#[derive(Debug)]
pub struct RowStore {
    rows: Vec<RowHandle>,
    selection: Selection,
    column_widths: Vec<f32>,
    viewport_width: f32,
    requests: Sender<RowRequest>,
}

impl RowStore {
    pub(crate) fn new(requests: Sender<RowRequest>) -> Self {
        Self {
            rows: Vec::new(),
            selection: Selection::new(),
            column_widths: Vec::new(),
            viewport_width: 0.0,
            requests,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[RowHandle] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&RowHandle> {
        self.rows.get(index)
    }

    /// Current index of `row`, if it is in the store.
    pub fn index_of(&self, row: &RowHandle) -> Option<usize> {
        let index = row.row_index();
        (self.rows.get(index) == Some(row)).then_some(index)
    }

    /// Current index of the row with identity `id`.
    pub fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }

    pub fn contains(&self, row: &RowHandle) -> bool {
        self.index_of(row).is_some()
    }

    /// Row heights in store order.
    pub fn heights(&self) -> Vec<f32> {
        self.rows.iter().map(RowHandle::height).collect()
    }

    /// Sum of all row heights.
    pub fn total_height(&self) -> f32 {
        self.rows.iter().map(RowHandle::height).sum()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Handles of the selected rows, in index order.
    pub fn selected_rows(&self) -> Vec<RowHandle> {
        self.selection
            .iter()
            .filter_map(|index| self.rows.get(index).cloned())
            .collect()
    }

    /// Resolved pixel width of each column.
    pub fn column_widths(&self) -> &[f32] {
        &self.column_widths
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Replace the selection, notifying rows whose selected flag changes.
    ///
    /// Indices past the end of the store are dropped. Returns `true` if the
    /// selection changed.
    pub fn set_selection(&mut self, mut selection: Selection) -> bool {
        selection.truncate(self.rows.len());
        if selection == self.selection {
            return false;
        }
        tracing::debug!(
            target: targets::SELECTION,
            rows = ?selection.to_vec(),
            anchor = ?selection.anchor(),
            "selection changed"
        );
        self.apply_selection(selection);
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        self.set_selection(Selection::new())
    }

    fn apply_selection(&mut self, selection: Selection) {
        for (index, row) in self.rows.iter().enumerate() {
            row.set_selected(selection.contains(index));
        }
        self.selection = selection;
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Run `mutation` over the row sequence while preserving selection by
    /// identity.
    ///
    /// On success, rows are reindexed, the selection is rebuilt from the
    /// identities captured before the mutation, and column widths are
    /// recomputed. On failure the error is logged and returned, rows are still
    /// reindexed, and the selection is left as it was (minus indices that no
    /// longer exist).
    pub fn keep_select_status<T>(
        &mut self,
        mutation: impl FnOnce(&mut Vec<RowHandle>) -> TreeViewResult<T>,
    ) -> TreeViewResult<T> {
        let _span = PerfSpan::new(span_names::STORE_MUTATION);
        let snapshot = SelectionSnapshot::capture(&self.rows, &self.selection);

        let result = mutation(&mut self.rows);
        self.reindex();

        match result {
            Ok(value) => {
                let rebuilt = snapshot.rebuild(&self.rows);
                self.apply_selection(rebuilt);
                self.update_column_widths();
                Ok(value)
            }
            Err(err) => {
                tracing::error!(
                    target: targets::STORE,
                    error = %err,
                    backtrace = %std::backtrace::Backtrace::capture(),
                    "row store mutation abandoned, selection left unchanged"
                );
                let mut kept = self.selection.clone();
                kept.truncate(self.rows.len());
                self.apply_selection(kept);
                self.update_column_widths();
                Err(err)
            }
        }
    }

    /// Insert `items` at `insert_pos` (end if `None`), or replace every row
    /// when `clear_first` is set.
    pub fn add_items(
        &mut self,
        items: Vec<RowHandle>,
        insert_pos: Option<usize>,
        clear_first: bool,
    ) -> TreeViewResult<()> {
        let count = items.len();
        let incoming: HashSet<RowId> = items.iter().map(RowHandle::id).collect();

        let dropped = self.keep_select_status(|rows| {
            let keep_len = if clear_first { 0 } else { rows.len() };
            if let Some(position) = insert_pos
                && position > keep_len
            {
                return Err(TreeViewError::InsertPosition {
                    position,
                    len: keep_len,
                });
            }

            let mut seen = HashSet::with_capacity(items.len());
            for item in &items {
                if !seen.insert(item.id()) {
                    return Err(TreeViewError::DuplicateRow(item.id()));
                }
            }
            if !clear_first
                && let Some(existing) = rows.iter().find(|row| seen.contains(&row.id()))
            {
                return Err(TreeViewError::DuplicateRow(existing.id()));
            }

            let dropped = if clear_first {
                std::mem::take(rows)
            } else {
                Vec::new()
            };
            let position = insert_pos.unwrap_or(rows.len());
            rows.splice(position..position, items.iter().cloned());
            Ok(dropped)
        })?;

        for row in &items {
            row.attach(self.requests.clone());
        }
        for row in dropped.iter().filter(|row| !incoming.contains(&row.id())) {
            Self::release(row);
        }

        tracing::debug!(
            target: targets::STORE,
            count,
            ?insert_pos,
            clear_first,
            total = self.rows.len(),
            "rows added"
        );
        Ok(())
    }

    /// Replace every row with `rows`.
    pub fn replace_all(&mut self, rows: Vec<RowHandle>) -> TreeViewResult<()> {
        self.add_items(rows, None, true)
    }

    /// Remove any of `items` present in the store. Rows not in the store are
    /// ignored. Returns the rows actually removed.
    pub fn delete_items(&mut self, items: &[RowHandle]) -> TreeViewResult<Vec<RowHandle>> {
        let doomed: HashSet<RowId> = items.iter().map(RowHandle::id).collect();

        let removed = self.keep_select_status(|rows| {
            let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(rows)
                .into_iter()
                .partition(|row| doomed.contains(&row.id()));
            *rows = kept;
            Ok(removed)
        })?;

        for row in &removed {
            Self::release(row);
        }

        tracing::debug!(
            target: targets::STORE,
            removed = removed.len(),
            total = self.rows.len(),
            "rows deleted"
        );
        Ok(removed)
    }

    /// Insert `items` directly after the row `parent`.
    pub fn insert_children(&mut self, parent: RowId, items: Vec<RowHandle>) -> TreeViewResult<()> {
        let position = self
            .position(parent)
            .ok_or(TreeViewError::UnknownRow(parent))?;
        self.add_items(items, Some(position + 1), false)
    }

    /// Remove every row nested, at any depth, under `parent`.
    pub fn remove_descendants(&mut self, parent: RowId) -> TreeViewResult<Vec<RowHandle>> {
        let position = self
            .position(parent)
            .ok_or(TreeViewError::UnknownRow(parent))?;

        let mut ancestors = HashSet::from([parent]);
        let mut doomed = Vec::new();
        for row in &self.rows[position + 1..] {
            match row.parent() {
                Some(p) if ancestors.contains(&p) => {
                    ancestors.insert(row.id());
                    doomed.push(row.clone());
                }
                _ => break,
            }
        }

        if doomed.is_empty() {
            return Ok(doomed);
        }
        self.delete_items(&doomed)
    }

    /// Reorder the rows to `new_order`, which must be a permutation of the
    /// current rows.
    pub fn reorder(&mut self, new_order: Vec<RowHandle>) -> TreeViewResult<()> {
        self.keep_select_status(|rows| {
            if new_order.len() != rows.len() {
                return Err(TreeViewError::InvalidPermutation(format!(
                    "expected {} rows, got {}",
                    rows.len(),
                    new_order.len()
                )));
            }
            let current: HashSet<RowId> = rows.iter().map(RowHandle::id).collect();
            let mut seen = HashSet::with_capacity(new_order.len());
            for row in &new_order {
                if !current.contains(&row.id()) || !seen.insert(row.id()) {
                    return Err(TreeViewError::InvalidPermutation(format!(
                        "row {:?} is unknown or repeated",
                        row.id()
                    )));
                }
            }
            *rows = new_order;
            Ok(())
        })?;
        tracing::debug!(target: targets::STORE, total = self.rows.len(), "rows reordered");
        Ok(())
    }

    fn reindex(&self) {
        for (index, row) in self.rows.iter().enumerate() {
            row.set_row_index(index);
        }
    }

    /// Reset view state on a row leaving the store and stop routing its requests.
    fn release(row: &RowHandle) {
        row.set_selected(false);
        row.set_drag_line(DragLine::None);
        row.detach();
    }

    // =========================================================================
    // Column widths
    // =========================================================================

    /// Set the width fill columns stretch into and recompute column widths.
    pub fn set_viewport_width(&mut self, width: f32) {
        if self.viewport_width != width {
            self.viewport_width = width;
            self.update_column_widths();
        }
    }

    /// Recompute column widths: each column takes the widest fixed width any
    /// row requests, unless some row declares it `Fill`, in which case it
    /// shares whatever width the fixed columns leave in the viewport equally
    /// with the other fill columns.
    pub fn update_column_widths(&mut self) {
        let mut fixed: Vec<f32> = Vec::new();
        let mut fill: Vec<bool> = Vec::new();

        for row in &self.rows {
            for (column, width) in row.row().column_widths().into_iter().enumerate() {
                if column >= fixed.len() {
                    fixed.resize(column + 1, 0.0);
                    fill.resize(column + 1, false);
                }
                match width {
                    ColumnWidth::Fixed(w) => fixed[column] = fixed[column].max(w),
                    ColumnWidth::Fill => fill[column] = true,
                }
            }
        }

        let fixed_total: f32 = fixed
            .iter()
            .zip(&fill)
            .filter(|(_, is_fill)| !**is_fill)
            .map(|(width, _)| *width)
            .sum();
        let fill_count = fill.iter().filter(|is_fill| **is_fill).count();
        let share = if fill_count > 0 {
            (self.viewport_width - fixed_total).max(0.0) / fill_count as f32
        } else {
            0.0
        };

        self.column_widths = fixed
            .into_iter()
            .zip(fill)
            .map(|(width, is_fill)| if is_fill { share } else { width })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{fixed_row, TestRow};

    fn store() -> RowStore {
        let (tx, _rx) = crossbeam_channel::unbounded();
        RowStore::new(tx)
    }

    fn rows(n: usize) -> Vec<RowHandle> {
        (0..n).map(|i| fixed_row(i, 20.0)).collect()
    }

    fn assert_indices_contiguous(store: &RowStore) {
        for (index, row) in store.rows().iter().enumerate() {
            assert_eq!(row.row_index(), index);
        }
    }

    #[test]
    fn test_add_items_appends_and_inserts() {
        let mut store = store();
        let first = rows(3);
        store.add_items(first.clone(), None, false).unwrap();

        let extra = rows(2);
        store.add_items(extra.clone(), Some(1), false).unwrap();

        let order: Vec<_> = store.rows().to_vec();
        assert_eq!(order, vec![
            first[0].clone(),
            extra[0].clone(),
            extra[1].clone(),
            first[1].clone(),
            first[2].clone(),
        ]);
        assert_indices_contiguous(&store);
        assert_eq!(store.total_height(), 100.0);
    }

    #[test]
    fn test_add_items_clear_first_replaces() {
        let mut store = store();
        let old = rows(3);
        store.add_items(old.clone(), None, false).unwrap();
        let new = rows(2);
        store.add_items(new.clone(), None, true).unwrap();

        assert_eq!(store.rows(), new.as_slice());
        assert!(!old[0].is_attached());
        assert!(new[0].is_attached());
    }

    #[test]
    fn test_selection_survives_insert_by_identity() {
        let mut store = store();
        let items = rows(4);
        store.add_items(items.clone(), None, false).unwrap();
        store.set_selection(Selection::range(1, 2));

        store.add_items(rows(3), Some(0), false).unwrap();

        assert_eq!(store.selection().to_vec(), vec![4, 5]);
        assert_eq!(store.selection().anchor(), Some(4));
        assert!(items[1].is_selected());
        assert_eq!(items[1].row_index(), 4);
    }

    #[test]
    fn test_delete_prunes_selection_and_anchor() {
        let mut store = store();
        let items = rows(5);
        store.add_items(items.clone(), None, false).unwrap();
        store.set_selection(Selection::range(1, 3));

        let removed = store.delete_items(&[items[1].clone(), items[2].clone()]).unwrap();

        assert_eq!(removed.len(), 2);
        assert_eq!(store.selection().to_vec(), vec![1]);
        assert_eq!(store.selection().anchor(), None);
        assert!(!items[1].is_selected());
        assert_indices_contiguous(&store);
    }

    #[test]
    fn test_delete_ignores_unknown_rows() {
        let mut store = store();
        store.add_items(rows(2), None, false).unwrap();
        let removed = store.delete_items(&rows(1)).unwrap();
        assert!(removed.is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_invalid_insert_leaves_state_untouched() {
        let mut store = store();
        let items = rows(3);
        store.add_items(items.clone(), None, false).unwrap();
        store.set_selection(Selection::single(2));

        let err = store.add_items(rows(1), Some(9), false).unwrap_err();
        assert!(matches!(err, TreeViewError::InsertPosition { position: 9, len: 3 }));
        assert_eq!(store.rows(), items.as_slice());
        assert_eq!(store.selection(), &Selection::single(2));
    }

    #[test]
    fn test_duplicate_rows_rejected() {
        let mut store = store();
        let items = rows(2);
        store.add_items(items.clone(), None, false).unwrap();

        assert!(matches!(
            store.add_items(vec![items[0].clone()], None, false),
            Err(TreeViewError::DuplicateRow(_))
        ));
        let fresh = fixed_row(9, 20.0);
        assert!(matches!(
            store.add_items(vec![fresh.clone(), fresh], None, false),
            Err(TreeViewError::DuplicateRow(_))
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_failed_mutation_keeps_selection() {
        let mut store = store();
        store.add_items(rows(3), None, false).unwrap();
        store.set_selection(Selection::single(1));

        let result: TreeViewResult<()> = store.keep_select_status(|rows| {
            rows.swap(0, 1);
            Err(TreeViewError::NoSortMethod(0))
        });

        assert!(result.is_err());
        assert_eq!(store.selection(), &Selection::single(1));
        assert_indices_contiguous(&store);
    }

    #[test]
    fn test_reorder_requires_permutation() {
        let mut store = store();
        let items = rows(3);
        store.add_items(items.clone(), None, false).unwrap();

        let reversed: Vec<_> = items.iter().rev().cloned().collect();
        store.reorder(reversed.clone()).unwrap();
        assert_eq!(store.rows(), reversed.as_slice());

        assert!(store.reorder(items[..2].to_vec()).is_err());
        let repeated = vec![items[0].clone(), items[0].clone(), items[1].clone()];
        assert!(store.reorder(repeated).is_err());
    }

    #[test]
    fn test_children_insert_and_remove() {
        let mut store = store();
        let top = rows(2);
        store.add_items(top.clone(), None, false).unwrap();

        let child = RowHandle::child_of(TestRow::new(0, 10.0), &top[0]);
        let grandchild = RowHandle::child_of(TestRow::new(1, 10.0), &child);
        store.insert_children(top[0].id(), vec![child.clone()]).unwrap();
        store.insert_children(child.id(), vec![grandchild.clone()]).unwrap();

        assert_eq!(store.rows(), &[top[0].clone(), child, grandchild, top[1].clone()]);

        let removed = store.remove_descendants(top[0].id()).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(store.rows(), top.as_slice());
    }

    #[test]
    fn test_column_widths_fixed_and_fill() {
        let mut store = store();
        store
            .add_items(
                vec![
                    RowHandle::new(TestRow::new(0, 20.0).with_widths(vec![
                        ColumnWidth::Fixed(40.0),
                        ColumnWidth::Fixed(30.0),
                        ColumnWidth::Fixed(10.0),
                    ])),
                    RowHandle::new(TestRow::new(1, 20.0).with_widths(vec![
                        ColumnWidth::Fixed(60.0),
                        ColumnWidth::Fill,
                        ColumnWidth::Fixed(20.0),
                    ])),
                ],
                None,
                false,
            )
            .unwrap();

        store.set_viewport_width(200.0);
        assert_eq!(store.column_widths(), &[60.0, 120.0, 20.0]);

        store.set_viewport_width(50.0);
        assert_eq!(store.column_widths(), &[60.0, 0.0, 20.0]);
    }
}
