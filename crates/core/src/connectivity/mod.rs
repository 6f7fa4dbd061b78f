//! Network connectivity detection.
//!
//! A monitor exposes the current state and hands out subscriptions that yield
//! every change. Dropping a subscription unsubscribes it.

mod probe;

pub use probe::ProbeConnectivityMonitor;

use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum ConnectivityError {
    #[error("Connectivity monitor unavailable: {0}")]
    Unavailable(String),

    #[error("Probe setup failed: {0}")]
    Probe(String),
}

/// Source of online/offline state.
pub trait ConnectivityMonitor: Send + Sync {
    /// Current state.
    fn is_connected(&self) -> bool;

    /// Subscribe to state changes.
    fn subscribe(&self) -> Result<ConnectivitySubscription, ConnectivityError>;
}

/// Stream of connectivity changes from one monitor.
#[derive(Debug)]
pub struct ConnectivitySubscription {
    rx: watch::Receiver<bool>,
}

impl ConnectivitySubscription {
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// Wait for the next change and return the new state.
    ///
    /// Returns `None` once the monitor has gone away.
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

/// A monitor whose state never changes. Used when no probe is configured.
#[derive(Debug)]
pub struct StaticConnectivity {
    state: watch::Sender<bool>,
}

impl StaticConnectivity {
    pub fn new(connected: bool) -> Self {
        let (state, _) = watch::channel(connected);
        Self { state }
    }

    pub fn online() -> Self {
        Self::new(true)
    }
}

impl ConnectivityMonitor for StaticConnectivity {
    fn is_connected(&self) -> bool {
        *self.state.borrow()
    }

    fn subscribe(&self) -> Result<ConnectivitySubscription, ConnectivityError> {
        Ok(ConnectivitySubscription::new(self.state.subscribe()))
    }
}
