//! Connectivity-triggered replay of the offline queue.
//!
//! The listener owns one connectivity subscription and replays the queue on
//! start (when online) and on every transition back to connected.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::executor::ActionExecutor;
use super::offline::OfflineQueue;
use super::ReplayReport;
use crate::connectivity::{ConnectivityError, ConnectivityMonitor};

/// Called after every replay pass the listener triggers.
pub type ReplayCallback = Arc<dyn Fn(&ReplayReport) + Send + Sync>;

/// Replays the offline queue whenever connectivity comes back.
///
/// Nothing happens until [`ReplayListener::start`] is called; the returned handle
/// stops the listener when dropped.
pub struct ReplayListener {
    queue: Arc<OfflineQueue>,
    executor: Arc<dyn ActionExecutor>,
    monitor: Arc<dyn ConnectivityMonitor>,
    on_replay: Option<ReplayCallback>,
}

impl ReplayListener {
    pub fn new(
        queue: Arc<OfflineQueue>,
        executor: Arc<dyn ActionExecutor>,
        monitor: Arc<dyn ConnectivityMonitor>,
    ) -> Self {
        Self {
            queue,
            executor,
            monitor,
            on_replay: None,
        }
    }

    pub fn with_callback(mut self, callback: ReplayCallback) -> Self {
        self.on_replay = Some(callback);
        self
    }

    /// Subscribe to the monitor and start listening.
    ///
    /// Replays once right away if already connected, then on every transition to
    /// connected. Fails if the monitor cannot be subscribed to; the queue itself
    /// keeps working, it just never replays automatically.
    pub fn start(&self) -> Result<ReplayListenerHandle, ConnectivityError> {
        let mut subscription = self.monitor.subscribe()?;
        let queue = Arc::clone(&self.queue);
        let executor = Arc::clone(&self.executor);
        let monitor = Arc::clone(&self.monitor);
        let on_replay = self.on_replay.clone();

        let task = tokio::spawn(async move {
            info!("Offline replay listener started");
            if monitor.is_connected() {
                Self::trigger(&queue, executor.as_ref(), on_replay.as_ref()).await;
            }
            while let Some(connected) = subscription.changed().await {
                if connected {
                    debug!("Connectivity restored, replaying offline queue");
                    Self::trigger(&queue, executor.as_ref(), on_replay.as_ref()).await;
                }
            }
            info!("Connectivity monitor closed, offline replay listener exiting");
        });

        Ok(ReplayListenerHandle { task })
    }

    async fn trigger(
        queue: &OfflineQueue,
        executor: &dyn ActionExecutor,
        on_replay: Option<&ReplayCallback>,
    ) {
        match queue.try_replay(executor).await {
            Ok(Some(report)) => {
                if let Some(callback) = on_replay {
                    callback(&report);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Offline replay failed: {}", e),
        }
    }
}

/// Running listener. Dropping it unsubscribes.
#[derive(Debug)]
pub struct ReplayListenerHandle {
    task: JoinHandle<()>,
}

impl ReplayListenerHandle {
    /// Stop listening. A pass cut short here leaves the action it was running
    /// queued; actions it already settled are persisted.
    pub fn stop(self) {
        self.task.abort();
        info!("Offline replay listener stopped");
    }
}

impl Drop for ReplayListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
