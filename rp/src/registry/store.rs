//! Narrow interface to task entry storage

use async_trait::async_trait;

use super::messages::{EntryUpdate, RegistryResponse};
use crate::domain::{TaskEntry, TaskId};

/// Lookup from task id to status record
///
/// Every operation is atomic with respect to the others. `update` runs its
/// closure while no other operation can observe the entry.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, id: TaskId, entry: TaskEntry) -> RegistryResponse<()>;

    /// `None` for unknown or evicted ids
    async fn get(&self, id: &TaskId) -> RegistryResponse<Option<TaskEntry>>;

    /// Apply `apply` to an existing entry and return the result
    async fn update(&self, id: &TaskId, apply: EntryUpdate) -> RegistryResponse<TaskEntry>;

    async fn remove(&self, id: &TaskId) -> RegistryResponse<Option<TaskEntry>>;

    async fn len(&self) -> RegistryResponse<usize>;
}
