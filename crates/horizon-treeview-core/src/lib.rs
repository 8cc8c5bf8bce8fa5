//! Core systems for Horizon TreeView.
//!
//! This crate provides the building blocks the view crate is assembled from:
//!
//! - **Timers**: per-component repeating timers driven by the host clock
//! - **Signals**: synchronous, type-safe notifications
//! - **Thread pool**: background execution on rayon with channel hand-off
//! - **Logging**: `tracing` targets, span names, and the `PerfSpan` guard
//! - **Types**: geometry and color primitives
//!
//! # Timer Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use horizon_treeview_core::TimerManager;
//!
//! let mut timers = TimerManager::new();
//! let start = Instant::now();
//! let id = timers.start_repeating_at(start, Duration::from_millis(100)).unwrap();
//!
//! assert!(timers.process_expired_at(start).is_empty());
//! assert_eq!(timers.process_expired_at(start + Duration::from_millis(100)), vec![id]);
//! ```

mod error;
pub mod logging;
pub mod signal;
pub mod threadpool;
mod timer;
pub mod types;

pub use error::{CoreError, Result, ThreadPoolError, TimerError};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
pub use threadpool::{ThreadPool, ThreadPoolConfig, panic_message};
pub use timer::{TimerId, TimerManager};
pub use types::{Color, Point, Rect, Size};
