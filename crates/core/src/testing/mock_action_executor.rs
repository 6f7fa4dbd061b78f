//! Mock action executor for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, Mutex};

use crate::queue::{ActionError, ActionExecutor, OfflineAction};

/// A recorded execution for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedAction {
    pub action: OfflineAction,
    pub timestamp: Instant,
}

/// Mock implementation of the ActionExecutor trait.
///
/// Succeeds for every action unless told otherwise:
/// - `fail_url` / `fail_with` make actions for a URL fail
/// - `panic_on` makes actions for a URL panic
/// - `hold_next` blocks the next execution until released
#[derive(Debug, Default)]
pub struct MockActionExecutor {
    calls: Mutex<Vec<RecordedAction>>,
    failures: Mutex<HashMap<String, ActionError>>,
    panics: Mutex<HashSet<String>>,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl MockActionExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to actions for `url` with a non-success status.
    pub async fn fail_url(&self, url: &str, status: u16) {
        self.fail_with(url, ActionError::Status(status)).await;
    }

    pub async fn fail_with(&self, url: &str, error: ActionError) {
        self.failures.lock().await.insert(url.to_string(), error);
    }

    /// Let actions for `url` succeed again.
    pub async fn clear_failure(&self, url: &str) {
        self.failures.lock().await.remove(url);
    }

    pub async fn panic_on(&self, url: &str) {
        self.panics.lock().await.insert(url.to_string());
    }

    /// Hold the next execution until the returned sender fires (or is dropped).
    pub async fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().await.push_back(rx);
        tx
    }

    /// Executed actions, in call order.
    pub async fn calls(&self) -> Vec<OfflineAction> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|c| c.action.clone())
            .collect()
    }

    pub async fn recorded_calls(&self) -> Vec<RecordedAction> {
        self.calls.lock().await.clone()
    }

    /// Wait until at least `n` executions have started.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls.lock().await.len() < n {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl ActionExecutor for MockActionExecutor {
    async fn execute(&self, action: &OfflineAction) -> Result<(), ActionError> {
        self.calls.lock().await.push(RecordedAction {
            action: action.clone(),
            timestamp: Instant::now(),
        });

        let gate = self.gates.lock().await.pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let url = &action.request.url;
        if self.panics.lock().await.contains(url) {
            panic!("mock executor panic for {}", url);
        }
        if let Some(error) = self.failures.lock().await.get(url).cloned() {
            return Err(error);
        }
        Ok(())
    }
}
