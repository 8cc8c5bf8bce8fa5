//! Logging and tracing facilities for Horizon TreeView.
//!
//! Horizon TreeView uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_treeview::sort=debug")
//!     .init();
//! ```

/// Span names used for tracing.
pub mod span_names {
    /// A full viewport paint pass.
    pub const PAINT: &str = "horizon_treeview::paint";
    /// A background column sort.
    pub const SORT: &str = "horizon_treeview::sort";
    /// A store mutation wrapped by selection preservation.
    pub const STORE_MUTATION: &str = "horizon_treeview::store_mutation";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Timer system target.
    pub const TIMER: &str = "horizon_treeview_core::timer";
    /// Signal system target.
    pub const SIGNAL: &str = "horizon_treeview_core::signal";
    /// Thread pool target.
    pub const THREADPOOL: &str = "horizon_treeview_core::threadpool";
    /// View lifecycle.
    pub const VIEW: &str = "horizon_treeview";
    /// Row store mutations.
    pub const STORE: &str = "horizon_treeview::store";
    /// Selection changes.
    pub const SELECTION: &str = "horizon_treeview::selection";
    /// Background sorting.
    pub const SORT: &str = "horizon_treeview::sort";
    /// Paint scheduling and edge masks.
    pub const PAINT: &str = "horizon_treeview::paint";
    /// Pointer and keyboard interaction.
    pub const INTERACTION: &str = "horizon_treeview::interaction";
    /// Performance spans.
    pub const PERF: &str = "horizon_treeview::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// `tracing::debug!` under the view lifecycle target.
#[macro_export]
macro_rules! treeview_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: $crate::logging::targets::VIEW, $($arg)*)
    };
}
