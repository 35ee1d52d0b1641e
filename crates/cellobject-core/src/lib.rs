//! Core systems for cellobject.
//!
//! This crate provides the foundational pieces the collection layer is built on:
//!
//! - **Run Loop**: A cooperative, single-owner task queue used to defer work to
//!   the next scheduling opportunity
//! - **Signal/Slot System**: Direct, type-safe change notification
//! - **Thread Affinity**: Debug checks that owner-context state is only touched
//!   from the context that created it
//! - **Logging**: `tracing` targets and span helpers shared by every crate
//!
//! # Signal/Slot Example
//!
//! ```
//! use cellobject_core::Signal;
//!
//! let scrolled = Signal::<f32>::new();
//!
//! let conn_id = scrolled.connect(|offset| {
//!     println!("Scrolled to: {}", offset);
//! });
//!
//! scrolled.emit(120.0);
//! scrolled.disconnect(conn_id);
//! ```
//!
//! # Run Loop Example
//!
//! ```
//! use cellobject_core::RunLoop;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//!
//! let run_loop = RunLoop::new();
//! let ran = Arc::new(AtomicBool::new(false));
//!
//! let flag = ran.clone();
//! run_loop.post(move || flag.store(true, Ordering::SeqCst));
//! assert!(!ran.load(Ordering::SeqCst));
//!
//! run_loop.run_pending();
//! assert!(ran.load(Ordering::SeqCst));
//! ```

mod error;
pub mod logging;
pub mod signal;
mod task;
pub mod thread_check;

pub use error::{SignalError, TaskError};
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use task::{RunLoop, TaskId, TaskQueue};
pub use thread_check::ThreadAffinity;
