//! Durable FIFO queue of actions with per-action failure isolation on replay.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::executor::ActionExecutor;
use super::store::DurableStore;
use super::{ActionError, OfflineAction, QueueError, ReplayReport};
use crate::metrics;

/// Persists queued actions as one JSON array under a fixed store key.
///
/// Mutations of the stored list are serialized by `write_lock`; replays are
/// serialized by `replay_lock`. A replay works on a snapshot taken when it
/// starts, so actions enqueued while it runs wait for the next pass. The
/// outcome of every action is persisted as soon as it settles.
pub struct OfflineQueue {
    store: Arc<dyn DurableStore>,
    key: String,
    write_lock: Mutex<()>,
    replay_lock: Mutex<()>,
}

impl OfflineQueue {
    pub fn new(store: Arc<dyn DurableStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
            replay_lock: Mutex::new(()),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Append an action to the end of the queue.
    pub async fn enqueue(&self, action: OfflineAction) -> Result<(), QueueError> {
        let _guard = self.write_lock.lock().await;
        let mut actions = self.load()?;
        debug!(action_id = %action.id, url = %action.request.url, "Enqueueing offline action");
        actions.push(action);
        self.persist(&actions)?;
        metrics::OFFLINE_ACTIONS_ENQUEUED.inc();
        Ok(())
    }

    /// Queued actions in enqueue order.
    pub async fn pending(&self) -> Result<Vec<OfflineAction>, QueueError> {
        let _guard = self.write_lock.lock().await;
        self.load()
    }

    pub async fn len(&self) -> Result<usize, QueueError> {
        Ok(self.pending().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, QueueError> {
        Ok(self.len().await? == 0)
    }

    /// Remove and return every queued action.
    pub async fn drain(&self) -> Result<Vec<OfflineAction>, QueueError> {
        let _guard = self.write_lock.lock().await;
        let actions = self.load()?;
        self.store.remove(&self.key)?;
        metrics::QUEUE_DEPTH.set(0);
        info!("Drained {} offline action(s)", actions.len());
        Ok(actions)
    }

    /// Run every queued action through `executor`, oldest first.
    ///
    /// Waits for a replay already in progress to finish first.
    pub async fn replay(&self, executor: &dyn ActionExecutor) -> Result<ReplayReport, QueueError> {
        let _replaying = self.replay_lock.lock().await;
        self.replay_locked(executor).await
    }

    /// Like [`OfflineQueue::replay`], but returns `None` without doing anything
    /// when a replay is already in progress.
    pub async fn try_replay(
        &self,
        executor: &dyn ActionExecutor,
    ) -> Result<Option<ReplayReport>, QueueError> {
        let Ok(_replaying) = self.replay_lock.try_lock() else {
            metrics::QUEUE_REPLAYS_SKIPPED.inc();
            debug!("Replay already in progress, skipping trigger");
            return Ok(None);
        };
        self.replay_locked(executor).await.map(Some)
    }

    async fn replay_locked(
        &self,
        executor: &dyn ActionExecutor,
    ) -> Result<ReplayReport, QueueError> {
        let snapshot = {
            let _guard = self.write_lock.lock().await;
            self.load()?
        };
        if snapshot.is_empty() {
            return Ok(ReplayReport::default());
        }

        metrics::QUEUE_REPLAYS_STARTED.inc();
        let _timer = metrics::QUEUE_REPLAY_DURATION.start_timer();
        info!("Replaying {} offline action(s)", snapshot.len());

        let mut report = ReplayReport::default();

        // Each outcome is persisted before the next action runs.
        for action in snapshot {
            let outcome = Self::execute_isolated(executor, &action).await;

            let _guard = self.write_lock.lock().await;
            let mut current = self.load()?;
            match outcome {
                Ok(()) => {
                    report.processed += 1;
                    metrics::OFFLINE_ACTIONS_REPLAYED
                        .with_label_values(&["success"])
                        .inc();
                    debug!(action_id = %action.id, "Offline action succeeded");
                    current.retain(|a| a.id != action.id);
                }
                Err(e) => {
                    report.failed += 1;
                    metrics::OFFLINE_ACTIONS_REPLAYED
                        .with_label_values(&[e.kind()])
                        .inc();
                    warn!(action_id = %action.id, error = %e, "Offline action failed, keeping it queued");
                    // Updated in place: failures keep their position ahead of
                    // later arrivals. A failure drained mid-pass stays gone.
                    if let Some(stored) = current.iter_mut().find(|a| a.id == action.id) {
                        stored.attempts += 1;
                        stored.last_error = Some(e.to_string());
                    }
                }
            }
            self.persist(&current)?;
        }

        info!(
            "Replay finished: {} processed, {} failed",
            report.processed, report.failed
        );
        Ok(report)
    }

    /// Execute one action, converting a panic in the executor into a failure.
    async fn execute_isolated(
        executor: &dyn ActionExecutor,
        action: &OfflineAction,
    ) -> Result<(), ActionError> {
        match AssertUnwindSafe(executor.execute(action))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(ActionError::Panicked(message))
            }
        }
    }

    /// Read the stored list. A corrupt payload reads as an empty queue.
    fn load(&self) -> Result<Vec<OfflineAction>, QueueError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(actions) => Ok(actions),
            Err(e) => {
                warn!(
                    key = %self.key,
                    error = %e,
                    "Stored offline queue is unreadable, treating it as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Write the list back; an empty list removes the key.
    fn persist(&self, actions: &[OfflineAction]) -> Result<(), QueueError> {
        if actions.is_empty() {
            self.store.remove(&self.key)?;
        } else {
            let raw = serde_json::to_string(actions)
                .map_err(|e| QueueError::Serialization(e.to_string()))?;
            self.store.set(&self.key, &raw)?;
        }
        metrics::QUEUE_DEPTH.set(actions.len() as i64);
        Ok(())
    }
}
