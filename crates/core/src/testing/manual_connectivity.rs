//! Hand-driven connectivity monitor for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

use crate::connectivity::{ConnectivityError, ConnectivityMonitor, ConnectivitySubscription};

/// Connectivity monitor whose state is set by the test.
#[derive(Debug)]
pub struct ManualConnectivity {
    state: watch::Sender<bool>,
    fail_subscribe: AtomicBool,
}

impl ManualConnectivity {
    pub fn new(connected: bool) -> Self {
        let (state, _) = watch::channel(connected);
        Self {
            state,
            fail_subscribe: AtomicBool::new(false),
        }
    }

    /// Change the state, notifying subscribers if it differs.
    pub fn set_connected(&self, connected: bool) {
        self.state.send_if_modified(|current| {
            let changed = *current != connected;
            *current = connected;
            changed
        });
    }

    /// Make `subscribe` fail, as if the platform monitor could not start.
    pub fn fail_subscribe(&self) {
        self.fail_subscribe.store(true, Ordering::SeqCst);
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.state.receiver_count()
    }
}

impl ConnectivityMonitor for ManualConnectivity {
    fn is_connected(&self) -> bool {
        *self.state.borrow()
    }

    fn subscribe(&self) -> Result<ConnectivitySubscription, ConnectivityError> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(ConnectivityError::Unavailable(
                "manual monitor set to fail".to_string(),
            ));
        }
        Ok(ConnectivitySubscription::new(self.state.subscribe()))
    }
}
