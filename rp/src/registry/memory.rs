//! In-memory task map with TTL eviction

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::messages::{EntryUpdate, RegistryError, RegistryResponse};
use crate::domain::{TaskEntry, TaskId};

/// Entries keyed by task id, owned by the registry actor
#[derive(Default)]
pub struct TaskMap {
    entries: HashMap<TaskId, TaskEntry>,
    /// Entries untouched for longer than this are evicted; `None` keeps them
    ttl: Option<Duration>,
}

impl TaskMap {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn create(&mut self, id: TaskId, entry: TaskEntry) -> RegistryResponse<()> {
        if self.entries.contains_key(&id) {
            return Err(RegistryError::AlreadyExists(id));
        }
        self.entries.insert(id, entry);
        Ok(())
    }

    pub fn get(&self, id: &TaskId) -> Option<TaskEntry> {
        self.entries.get(id).cloned()
    }

    pub fn update(&mut self, id: &TaskId, apply: EntryUpdate) -> RegistryResponse<TaskEntry> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        apply(entry);
        Ok(entry.clone())
    }

    pub fn remove(&mut self, id: &TaskId) -> Option<TaskEntry> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evict finished entries last updated more than the TTL before `now`
    ///
    /// Pending entries stay until their run records an outcome.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.done || now - entry.updated_at <= ttl);
        let evicted = before - self.entries.len();
        debug!(evicted, remaining = self.entries.len(), "TaskMap::sweep: swept");
        evicted
    }
}
