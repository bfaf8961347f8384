//! TaskRegistry - actor that owns the task map
//!
//! Pipeline workers and HTTP handlers share one registry handle. All access
//! goes through a command channel, so updates never race with reads.

mod memory;
mod messages;
mod store;

pub use memory::TaskMap;
pub use messages::{EntryUpdate, RegistryCommand, RegistryError, RegistryResponse};
pub use store::TaskStore;

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::domain::{TaskEntry, TaskId};

/// Handle to send commands to the registry actor
#[derive(Clone)]
pub struct TaskRegistry {
    tx: mpsc::Sender<RegistryCommand>,
}

impl TaskRegistry {
    /// Spawn the registry actor and, when a TTL is configured, its sweeper
    pub fn spawn(config: &RegistryConfig) -> Self {
        debug!(ttl_secs = config.ttl_secs, sweep_interval_secs = config.sweep_interval_secs, "spawn: called");
        let ttl = config.ttl().unwrap_or_else(|e| {
            warn!(error = %e, "spawn: TTL unusable, eviction disabled");
            None
        });
        let (tx, rx) = mpsc::channel(256);

        tokio::spawn(actor_loop(TaskMap::new(ttl), rx));

        if ttl.is_some() && config.sweep_interval_secs > 0 {
            tokio::spawn(sweep_loop(tx.downgrade(), StdDuration::from_secs(config.sweep_interval_secs)));
        }

        info!("TaskRegistry spawned");
        Self { tx }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<RegistryResponse<T>>) -> RegistryCommand,
    ) -> RegistryResponse<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RegistryError::ChannelError)?;
        reply_rx.await.map_err(|_| RegistryError::ChannelError)?
    }

    /// Evict entries older than the TTL at `now`, returning how many went
    pub async fn sweep(&self, now: DateTime<Utc>) -> RegistryResponse<usize> {
        debug!(%now, "sweep: called");
        self.request(|reply| RegistryCommand::Sweep { now, reply }).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> Result<(), RegistryError> {
        debug!("shutdown: called");
        self.tx
            .send(RegistryCommand::Shutdown)
            .await
            .map_err(|_| RegistryError::ChannelError)
    }
}

#[async_trait]
impl TaskStore for TaskRegistry {
    async fn create(&self, id: TaskId, entry: TaskEntry) -> RegistryResponse<()> {
        debug!(%id, "create: called");
        self.request(|reply| RegistryCommand::Create { id, entry, reply }).await
    }

    async fn get(&self, id: &TaskId) -> RegistryResponse<Option<TaskEntry>> {
        debug!(%id, "get: called");
        let id = id.clone();
        self.request(|reply| RegistryCommand::Get { id, reply }).await
    }

    async fn update(&self, id: &TaskId, apply: EntryUpdate) -> RegistryResponse<TaskEntry> {
        debug!(%id, "update: called");
        let id = id.clone();
        self.request(|reply| RegistryCommand::Update { id, apply, reply }).await
    }

    async fn remove(&self, id: &TaskId) -> RegistryResponse<Option<TaskEntry>> {
        debug!(%id, "remove: called");
        let id = id.clone();
        self.request(|reply| RegistryCommand::Remove { id, reply }).await
    }

    async fn len(&self) -> RegistryResponse<usize> {
        self.request(|reply| RegistryCommand::Len { reply }).await
    }
}

/// Periodically ask the actor to sweep; exits once every handle is dropped
async fn sweep_loop(tx: mpsc::WeakSender<RegistryCommand>, every: StdDuration) {
    debug!(every_secs = every.as_secs(), "sweep_loop: called");
    let mut interval = tokio::time::interval(every);
    interval.tick().await;

    loop {
        interval.tick().await;
        let Some(tx) = tx.upgrade() else {
            break;
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        let command = RegistryCommand::Sweep {
            now: Utc::now(),
            reply: reply_tx,
        };
        if tx.send(command).await.is_err() {
            break;
        }
        drop(tx);
        match reply_rx.await {
            Ok(Ok(evicted)) if evicted > 0 => info!(evicted, "sweep_loop: evicted expired tasks"),
            Ok(_) => {}
            Err(_) => {
                warn!("sweep_loop: registry stopped before replying");
                break;
            }
        }
    }

    debug!("sweep_loop: stopped");
}

/// The actor loop that processes commands
async fn actor_loop(mut map: TaskMap, mut rx: mpsc::Receiver<RegistryCommand>) {
    debug!("TaskRegistry actor started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            RegistryCommand::Create { id, entry, reply } => {
                debug!(%id, "actor_loop: Create command");
                let _ = reply.send(map.create(id, entry));
            }

            RegistryCommand::Get { id, reply } => {
                debug!(%id, "actor_loop: Get command");
                let _ = reply.send(Ok(map.get(&id)));
            }

            RegistryCommand::Update { id, apply, reply } => {
                debug!(%id, "actor_loop: Update command");
                let _ = reply.send(map.update(&id, apply));
            }

            RegistryCommand::Remove { id, reply } => {
                debug!(%id, "actor_loop: Remove command");
                let _ = reply.send(Ok(map.remove(&id)));
            }

            RegistryCommand::Len { reply } => {
                let _ = reply.send(Ok(map.len()));
            }

            RegistryCommand::Sweep { now, reply } => {
                debug!(%now, "actor_loop: Sweep command");
                let _ = reply.send(Ok(map.sweep(now)));
            }

            RegistryCommand::Shutdown => {
                info!("TaskRegistry shutting down");
                break;
            }
        }
    }

    debug!("TaskRegistry actor stopped");
}
