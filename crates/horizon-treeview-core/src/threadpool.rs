//! Worker pool for background work.
//!
//! A thin layer over a rayon pool. Work submitted here never touches
//! interactive state directly: each task hands its result to a callback that
//! runs on the worker, and the callback forwards it into a channel the
//! interactive thread drains.
//!
//! ```
//! use std::time::Duration;
//! use horizon_treeview_core::threadpool::{ThreadPool, ThreadPoolConfig};
//!
//! let pool = ThreadPool::new(ThreadPoolConfig::with_threads(1)).unwrap();
//! let (tx, rx) = crossbeam_channel::bounded(1);
//! pool.spawn_with_callback(|| 6 * 7, move |answer| {
//!     let _ = tx.send(answer);
//! });
//! assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(42));
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::ThreadPoolBuilder;

use crate::error::{CoreError, ThreadPoolError};
use crate::logging::targets;

/// How to build a [`ThreadPool`].
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Worker count. `None` sizes the pool to the CPU count.
    pub num_threads: Option<usize>,
    /// Workers are named `{thread_name}-{index}`.
    pub thread_name: String,
    /// Worker stack size in bytes. `None` keeps rayon's default.
    pub stack_size: Option<usize>,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            thread_name: "treeview-worker".to_string(),
            stack_size: None,
        }
    }
}

impl ThreadPoolConfig {
    /// A configuration with exactly `num_threads` workers.
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
            ..Self::default()
        }
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// A pool of background workers owned by one view.
pub struct ThreadPool {
    workers: rayon::ThreadPool,
    in_flight: Arc<AtomicUsize>,
}

impl ThreadPool {
    pub fn new(config: ThreadPoolConfig) -> Result<Self, CoreError> {
        let ThreadPoolConfig {
            num_threads,
            thread_name,
            stack_size,
        } = config;

        let mut builder =
            ThreadPoolBuilder::new().thread_name(move |index| format!("{thread_name}-{index}"));
        if let Some(n) = num_threads {
            builder = builder.num_threads(n);
        }
        if let Some(bytes) = stack_size {
            builder = builder.stack_size(bytes);
        }

        let workers = builder
            .build()
            .map_err(|e| ThreadPoolError::CreationFailed(e.to_string()))?;

        tracing::debug!(
            target: targets::THREADPOOL,
            workers = workers.current_num_threads(),
            "worker pool started"
        );

        Ok(Self {
            workers,
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn num_threads(&self) -> usize {
        self.workers.current_num_threads()
    }

    /// Tasks submitted whose callback has not returned yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run `task` on a worker, then pass its result to `callback` on the
    /// same worker.
    ///
    /// A panic in `task` or `callback` is logged and contained to that task.
    /// The callback is skipped when the task panics.
    pub fn spawn_with_callback<F, T, C>(&self, task: F, callback: C)
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::AcqRel);

        self.workers.spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(move || callback(task())));
            if let Err(payload) = outcome {
                tracing::error!(
                    target: targets::THREADPOOL,
                    panic = panic_message(payload.as_ref()),
                    "background task panicked"
                );
            }
            let left = in_flight.fetch_sub(1, Ordering::AcqRel) - 1;
            tracing::trace!(target: targets::THREADPOOL, in_flight = left, "task finished");
        });
    }
}

/// The message carried by a panic payload, if it is a string.
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("num_threads", &self.num_threads())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

static_assertions::assert_impl_all!(ThreadPool: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_callbacks_forward_every_result() {
        let pool = ThreadPool::new(ThreadPoolConfig::with_threads(2)).unwrap();
        let (tx, rx) = crossbeam_channel::unbounded();

        for i in 0..4 {
            let tx = tx.clone();
            pool.spawn_with_callback(move || i * 10, move |v| {
                let _ = tx.send(v);
            });
        }

        let mut results: Vec<i32> = (0..4)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        results.sort();
        assert_eq!(results, vec![0, 10, 20, 30]);
    }

    #[test]
    fn test_in_flight_drops_to_zero() {
        let pool = ThreadPool::new(ThreadPoolConfig::with_threads(1)).unwrap();
        let (tx, rx) = crossbeam_channel::bounded(1);
        pool.spawn_with_callback(|| (), move |()| {
            let _ = tx.send(());
        });
        rx.recv_timeout(Duration::from_secs(5)).unwrap();

        // The counter is decremented just after the callback returns.
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while pool.in_flight() != 0 && std::time::Instant::now() < deadline {
            std::thread::yield_now();
        }
        assert_eq!(pool.in_flight(), 0);
    }

    #[test]
    fn test_panicking_task_is_contained() {
        let pool = ThreadPool::new(ThreadPoolConfig::with_threads(1)).unwrap();
        let (tx, rx) = crossbeam_channel::unbounded();

        let failed = tx.clone();
        pool.spawn_with_callback(|| -> i32 { panic!("comparator exploded") }, move |v| {
            let _ = failed.send(v);
        });
        pool.spawn_with_callback(|| 7, move |v| {
            let _ = tx.send(v);
        });

        // The panicking task never reaches its callback; the pool keeps working.
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(7));
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_panic_message() {
        let payload = panic::catch_unwind(|| panic!("boom {}", 1)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom 1");
        let payload = panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static");
    }

    #[test]
    fn test_thread_names() {
        let pool = ThreadPool::new(ThreadPoolConfig::with_threads(1).with_thread_name("sorter")).unwrap();
        let (tx, rx) = crossbeam_channel::bounded(1);
        pool.spawn_with_callback(
            || std::thread::current().name().map(str::to_owned),
            move |name| {
                let _ = tx.send(name);
            },
        );
        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("sorter-0"));
    }
}
