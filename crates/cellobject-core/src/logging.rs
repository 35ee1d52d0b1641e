//! Logging facilities for cellobject.
//!
//! cellobject uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("cellobject::scheduler=debug")
//!         .init();
//! }
//! ```
//!
//! Every subsystem logs under one of the [`targets`], so filters can be scoped
//! to the diff engine or the scheduler alone.

/// Target names for log filtering.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "cellobject_core::signal";
    /// Run loop target.
    pub const TASK: &str = "cellobject_core::task";
    /// Data model construction and lookup.
    pub const MODEL: &str = "cellobject::model";
    /// Diff engine target.
    pub const DIFF: &str = "cellobject::diff";
    /// Update scheduler target.
    pub const SCHEDULER: &str = "cellobject::scheduler";
    /// Container adapter target.
    pub const VIEW: &str = "cellobject::view";
}

/// Span names used for performance tracing.
pub mod span_names {
    /// Model diff computation.
    pub const DIFF: &str = "cellobject::diff";
    /// A model transition, from its start until its completion is handled.
    pub const TRANSITION: &str = "cellobject::transition";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time operations such as diff computation.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        Self {
            _span: perf_span(name).entered(),
        }
    }
}

/// Create a performance span without entering it.
///
/// For operations that end on a later call: enter the span for each step and
/// drop the last handle when the operation is over.
pub fn perf_span(name: &'static str) -> tracing::Span {
    tracing::info_span!(target: "cellobject::perf", "perf", operation = name)
}
