//! Background column sorting.
//!
//! Sorting runs on the view's worker pool so a slow comparator never stalls
//! the interactive thread. Every request bumps an epoch; only the outcome
//! carrying the current epoch is ever applied, so a sort that is superseded
//! while it runs is silently discarded when it completes.
//!
//! Rows are sorted within their sibling groups: top-level rows among
//! themselves, and each parent's children among themselves. The sorted
//! groups are then reassembled so every child group follows its parent.

use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use horizon_treeview_core::logging::{span_names, targets};
use horizon_treeview_core::{PerfSpan, ThreadPool, ThreadPoolConfig, panic_message};

use crate::error::{TreeViewError, TreeViewResult};
use crate::model::{RowHandle, RowId};

/// A column comparator: given one sibling group and the requested direction,
/// return the same rows in sorted order.
pub type SortMethod = Arc<dyn Fn(Vec<RowHandle>, bool) -> Vec<RowHandle> + Send + Sync>;

/// Build a [`SortMethod`] from a key extractor. The sort is stable in both
/// directions.
///
/// ```
/// use horizon_treeview::sort::sort_by;
///
/// let by_height = sort_by(|row| row.height() as i64);
/// assert!(by_height(Vec::new(), true).is_empty());
/// ```
pub fn sort_by<K, F>(key: F) -> SortMethod
where
    K: Ord,
    F: Fn(&RowHandle) -> K + Send + Sync + 'static,
{
    Arc::new(move |mut rows: Vec<RowHandle>, ascending: bool| {
        rows.sort_by(|a, b| {
            let order = key(a).cmp(&key(b));
            if ascending { order } else { order.reverse() }
        });
        rows
    })
}

/// A finished sort, sent from the worker back to the interactive thread.
#[derive(Debug)]
pub struct SortOutcome {
    pub epoch: u64,
    pub column: usize,
    pub rows: Vec<RowHandle>,
}

/// What a sort worker reports back.
#[derive(Debug)]
enum Finished {
    Sorted(SortOutcome),
    /// The comparator panicked. The epoch resolves with no new order.
    Panicked { epoch: u64, column: usize },
}

impl Finished {
    fn epoch(&self) -> u64 {
        match self {
            Finished::Sorted(outcome) => outcome.epoch,
            Finished::Panicked { epoch, .. } => *epoch,
        }
    }
}

/// Sort `rows` group by group and reassemble the hierarchy.
///
/// A group whose comparator output is not a permutation of its input is
/// kept in its original order.
pub fn sort_hierarchy(rows: Vec<RowHandle>, method: &SortMethod, ascending: bool) -> Vec<RowHandle> {
    let total = rows.len();
    let mut order: Vec<Option<RowId>> = Vec::new();
    let mut groups: HashMap<Option<RowId>, Vec<RowHandle>> = HashMap::new();
    for row in rows {
        let key = row.parent();
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(row);
    }

    for (parent, group) in groups.iter_mut() {
        let expected: HashSet<RowId> = group.iter().map(RowHandle::id).collect();
        let sorted = method(group.clone(), ascending);
        let unique: HashSet<RowId> = sorted.iter().map(RowHandle::id).collect();
        if sorted.len() == group.len() && unique == expected {
            *group = sorted;
        } else {
            tracing::warn!(
                target: targets::SORT,
                ?parent,
                expected = group.len(),
                returned = sorted.len(),
                "comparator did not return a permutation, group left unsorted"
            );
        }
    }

    let mut out = Vec::with_capacity(total);
    // Top level first, then any group whose parent is not among the rows.
    emit_group(None, &mut groups, &mut out);
    for key in order {
        emit_group(key, &mut groups, &mut out);
    }
    out
}

fn emit_group(
    parent: Option<RowId>,
    groups: &mut HashMap<Option<RowId>, Vec<RowHandle>>,
    out: &mut Vec<RowHandle>,
) {
    let Some(group) = groups.remove(&parent) else {
        return;
    };
    for row in group {
        let id = row.id();
        out.push(row);
        emit_group(Some(id), groups, out);
    }
}

/// Dispatches sorts to the worker pool and filters their outcomes by epoch.
pub struct SortCoordinator {
    pool: ThreadPool,
    methods: HashMap<usize, SortMethod>,
    epoch: u64,
    pending: bool,
    sender: Sender<Finished>,
    receiver: Receiver<Finished>,
}

impl SortCoordinator {
    /// Create a coordinator with its own worker pool. `threads` of `None`
    /// uses one worker per CPU.
    pub fn new(threads: Option<usize>) -> TreeViewResult<Self> {
        let config = match threads {
            Some(n) => ThreadPoolConfig::with_threads(n),
            None => ThreadPoolConfig::default(),
        }
        .with_thread_name("treeview-sort");
        let (sender, receiver) = crossbeam_channel::unbounded();

        Ok(Self {
            pool: ThreadPool::new(config)?,
            methods: HashMap::new(),
            epoch: 0,
            pending: false,
            sender,
            receiver,
        })
    }

    /// Register the comparator for `column`, replacing any previous one.
    pub fn set_sort_method(&mut self, column: usize, method: SortMethod) {
        self.methods.insert(column, method);
    }

    pub fn has_sort_method(&self, column: usize) -> bool {
        self.methods.contains_key(&column)
    }

    /// The epoch of the most recent request.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether the most recent request has not been collected yet.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Start sorting `rows` by `column`. Returns the new epoch.
    ///
    /// Every request advances the epoch, so even a request for a column with
    /// no sort method supersedes any sort still running.
    pub fn request(&mut self, column: usize, ascending: bool, rows: Vec<RowHandle>) -> TreeViewResult<u64> {
        self.epoch += 1;
        let epoch = self.epoch;
        let Some(method) = self.methods.get(&column).cloned() else {
            self.pending = false;
            return Err(TreeViewError::NoSortMethod(column));
        };
        self.pending = true;
        let sender = self.sender.clone();

        tracing::debug!(
            target: targets::SORT,
            epoch,
            column,
            ascending,
            rows = rows.len(),
            "sort requested"
        );

        self.pool.spawn_with_callback(
            move || {
                let _span = PerfSpan::new(span_names::SORT);
                panic::catch_unwind(AssertUnwindSafe(|| sort_hierarchy(rows, &method, ascending)))
            },
            move |sorted| {
                let finished = match sorted {
                    Ok(rows) => Finished::Sorted(SortOutcome { epoch, column, rows }),
                    Err(payload) => {
                        tracing::error!(
                            target: targets::SORT,
                            epoch,
                            column,
                            panic = panic_message(payload.as_ref()),
                            "sort method panicked, row order left unchanged"
                        );
                        Finished::Panicked { epoch, column }
                    }
                };
                // The receiver only goes away with the view itself.
                let _ = sender.send(finished);
            },
        );
        Ok(epoch)
    }

    /// Drain finished sorts without blocking, returning the current one if it
    /// has arrived. Stale outcomes are dropped.
    pub fn take_current(&mut self) -> Option<SortOutcome> {
        let mut current = None;
        while let Ok(finished) = self.receiver.try_recv() {
            if let Some(outcome) = self.accept(finished) {
                current = Some(outcome);
            }
        }
        current
    }

    /// Block until the current sort arrives or `timeout` elapses. Returns
    /// `None` early if the current sort's method panicked.
    pub fn wait_current(&mut self, timeout: Duration) -> Option<SortOutcome> {
        if let Some(outcome) = self.take_current() {
            return Some(outcome);
        }

        let deadline = Instant::now() + timeout;
        while self.pending {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(finished) => {
                    if let Some(outcome) = self.accept(finished) {
                        return Some(outcome);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
        None
    }

    fn accept(&mut self, finished: Finished) -> Option<SortOutcome> {
        if finished.epoch() != self.epoch {
            tracing::debug!(
                target: targets::SORT,
                stale = finished.epoch(),
                current = self.epoch,
                "dropping stale sort result"
            );
            return None;
        }
        self.pending = false;
        match finished {
            Finished::Sorted(outcome) => Some(outcome),
            Finished::Panicked { column, .. } => {
                tracing::debug!(target: targets::SORT, column, "current sort resolved without a result");
                None
            }
        }
    }
}

impl std::fmt::Debug for SortCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortCoordinator")
            .field("pool", &self.pool)
            .field("columns", &self.methods.len())
            .field("epoch", &self.epoch)
            .field("pending", &self.pending)
            .finish()
    }
}
