//! Error types for cellobject core systems.

use std::fmt;

use crate::task::TaskId;

/// Signal-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The connection ID is invalid or has already been disconnected.
    InvalidConnection,
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConnection => write!(f, "Invalid or disconnected connection ID"),
        }
    }
}

impl std::error::Error for SignalError {}

/// Run loop task errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task already ran or was cancelled.
    UnknownTask(TaskId),
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTask(id) => {
                write!(f, "Task {} is not pending (already ran or cancelled)", id.as_u64())
            }
        }
    }
}

impl std::error::Error for TaskError {}
