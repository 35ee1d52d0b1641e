//! Deferred task queue for the owner context.
//!
//! The collection layer runs on one cooperative scheduling context. Work that
//! must happen "on the next scheduling opportunity" (for example, signalling the
//! end of a full reload once the widget had a chance to lay out) is posted to a
//! [`RunLoop`] and executed the next time its owner calls [`RunLoop::run_pending`].
//!
//! A tick only runs the tasks that were queued when it started. Tasks posted
//! while a tick is running wait for the following tick.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::TaskError;
use crate::logging::targets;

/// A unique identifier for a deferred task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Global counter for generating unique task IDs.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

struct TaskData {
    id: TaskId,
    task: BoxedTask,
}

/// An ordered queue of deferred tasks.
pub struct TaskQueue {
    tasks: VecDeque<TaskData>,
}

impl TaskQueue {
    /// Create a new task queue.
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    /// Append a task to the queue.
    pub fn post<F>(&mut self, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = next_task_id();
        self.tasks.push_back(TaskData {
            id,
            task: Box::new(task),
        });
        id
    }

    /// Cancel a pending task.
    pub fn cancel(&mut self, id: TaskId) -> Result<(), TaskError> {
        match self.tasks.iter().position(|t| t.id == id) {
            Some(pos) => {
                self.tasks.remove(pos);
                Ok(())
            }
            None => Err(TaskError::UnknownTask(id)),
        }
    }

    /// Check if there are any pending tasks.
    pub fn has_pending(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Get the number of pending tasks.
    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Detach every queued task, leaving the queue empty.
    fn take_all(&mut self) -> VecDeque<TaskData> {
        std::mem::take(&mut self.tasks)
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// A shared handle to the owner context's deferred task queue.
///
/// Cloning a `RunLoop` yields another handle to the same queue. Tasks run
/// without the queue lock held, so a task may post further tasks.
#[derive(Clone, Default)]
pub struct RunLoop {
    queue: Arc<Mutex<TaskQueue>>,
}

impl RunLoop {
    /// Create a run loop with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a task to run on the next tick.
    pub fn post<F>(&self, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.queue.lock().post(task);
        tracing::trace!(target: targets::TASK, task = id.as_u64(), "task posted");
        id
    }

    /// Cancel a task that has not run yet.
    pub fn cancel(&self, id: TaskId) -> Result<(), TaskError> {
        self.queue.lock().cancel(id)
    }

    /// Check if any task is waiting for the next tick.
    pub fn has_pending(&self) -> bool {
        self.queue.lock().has_pending()
    }

    /// Number of tasks waiting for the next tick.
    pub fn pending_count(&self) -> usize {
        self.queue.lock().pending_count()
    }

    /// Run one tick: every task queued before this call, in posting order.
    ///
    /// Returns the number of tasks executed.
    pub fn run_pending(&self) -> usize {
        let batch = self.queue.lock().take_all();
        let count = batch.len();
        if count > 0 {
            let _span = tracing::trace_span!(target: targets::TASK, "run_pending", count).entered();
            for task_data in batch {
                (task_data.task)();
            }
        }
        count
    }

    /// Run ticks until the queue stays empty, up to `max_ticks`.
    ///
    /// Returns the number of ticks that executed at least one task.
    pub fn run_until_idle(&self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.run_pending() > 0 {
            ticks += 1;
        }
        ticks
    }
}

static_assertions::assert_impl_all!(RunLoop: Send, Sync);
