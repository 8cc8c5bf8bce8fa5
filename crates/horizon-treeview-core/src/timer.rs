//! Timer system for Horizon TreeView.
//!
//! Provides repeating timers. A [`TimerManager`] is owned by the
//! component that starts the timers; there is no process-wide timer state.
//! The host drives it by calling [`TimerManager::process_expired_at`] with the
//! current time, which also makes timer behaviour deterministic under test.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};

use crate::error::{Result, TimerError};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

#[derive(Debug)]
struct TimerData {
    next_fire: Instant,
    interval: Duration,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages the timers of a single component.
#[derive(Debug)]
pub struct TimerManager {
    timers: SlotMap<TimerId, TimerData>,
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    /// Start a repeating timer whose first fire is `interval` after `now`.
    pub fn start_repeating_at(&mut self, now: Instant, interval: Duration) -> Result<TimerId> {
        if interval.is_zero() {
            return Err(TimerError::ZeroInterval.into());
        }
        let next_fire = now + interval;
        let id = self.timers.insert(TimerData { next_fire, interval });
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: next_fire,
        });
        tracing::trace!(target: targets::TIMER, ?id, ?interval, "timer started");
        Ok(id)
    }

    /// Stop and remove a timer.
    ///
    /// Returns an error if the timer was not found.
    pub fn stop(&mut self, id: TimerId) -> Result<()> {
        if self.timers.remove(id).is_some() {
            tracing::trace!(target: targets::TIMER, ?id, "timer stopped");
            Ok(())
        } else {
            Err(TimerError::InvalidTimerId.into())
        }
    }

    /// Get the duration from `now` until the next timer fires, if any.
    pub fn time_until_next_at(&mut self, now: Instant) -> Option<Duration> {
        self.discard_stale_entries();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(now))
    }

    /// Drop queue entries that belong to stopped timers or that were
    /// superseded by a reschedule.
    fn discard_stale_entries(&mut self) {
        while let Some(entry) = self.queue.peek() {
            match self.timers.get(entry.id) {
                Some(timer) if timer.next_fire == entry.fire_time => break,
                _ => {
                    self.queue.pop();
                }
            }
        }
    }

    /// Process all timers due at or before `now`.
    ///
    /// Returns the ids of the timers that fired, in fire order. A timer fires
    /// at most once per call and is rescheduled one interval after `now`.
    #[tracing::instrument(skip(self), target = "horizon_treeview_core::timer", level = "trace")]
    pub fn process_expired_at(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();
        let mut rescheduled = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            let id = entry.id;
            let Some(timer) = self.timers.get_mut(id) else {
                continue;
            };
            if timer.next_fire != entry.fire_time {
                continue;
            }

            tracing::trace!(target: targets::TIMER, ?id, "timer fired");
            fired.push(id);

            timer.next_fire = now + timer.interval;
            rescheduled.push(TimerQueueEntry {
                id,
                fire_time: timer.next_fire,
            });
        }

        self.queue.extend(rescheduled);
        fired
    }

    /// Get the number of active timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}
