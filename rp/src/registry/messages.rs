//! Task registry messages
//!
//! Commands and responses for the actor pattern.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::{TaskEntry, TaskId};

/// Errors from registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Task already exists: {0}")]
    AlreadyExists(TaskId),

    #[error("Channel error")]
    ChannelError,
}

/// Response from registry operations
pub type RegistryResponse<T> = Result<T, RegistryError>;

/// Change applied to one entry while the registry holds it
pub type EntryUpdate = Box<dyn FnOnce(&mut TaskEntry) + Send>;

/// Commands sent to the TaskRegistry actor
pub enum RegistryCommand {
    Create {
        id: TaskId,
        entry: TaskEntry,
        reply: oneshot::Sender<RegistryResponse<()>>,
    },
    Get {
        id: TaskId,
        reply: oneshot::Sender<RegistryResponse<Option<TaskEntry>>>,
    },
    Update {
        id: TaskId,
        apply: EntryUpdate,
        reply: oneshot::Sender<RegistryResponse<TaskEntry>>,
    },
    Remove {
        id: TaskId,
        reply: oneshot::Sender<RegistryResponse<Option<TaskEntry>>>,
    },
    Len {
        reply: oneshot::Sender<RegistryResponse<usize>>,
    },
    Sweep {
        now: DateTime<Utc>,
        reply: oneshot::Sender<RegistryResponse<usize>>,
    },
    Shutdown,
}
