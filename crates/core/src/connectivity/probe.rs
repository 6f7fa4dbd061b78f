use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{ConnectivityError, ConnectivityMonitor, ConnectivitySubscription};
use crate::metrics;

/// Detects connectivity by periodically sending a `HEAD` request to a probe URL.
///
/// Any HTTP response, whatever its status, counts as connected. Starts out
/// offline until the first probe completes.
pub struct ProbeConnectivityMonitor {
    client: Client,
    url: String,
    interval: Duration,
    state: Arc<watch::Sender<bool>>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ProbeConnectivityMonitor {
    pub fn new(
        url: impl Into<String>,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Self, ConnectivityError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectivityError::Probe(e.to_string()))?;
        let (state, _) = watch::channel(false);
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            client,
            url: url.into(),
            interval,
            state: Arc::new(state),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        })
    }

    /// Probe once, publish the result and return it.
    pub async fn probe_once(&self) -> bool {
        Self::probe_and_publish(&self.client, &self.url, &self.state).await
    }

    async fn probe_and_publish(client: &Client, url: &str, state: &watch::Sender<bool>) -> bool {
        let connected = match client.head(url).send().await {
            Ok(_) => true,
            Err(e) => {
                debug!(url = url, "Connectivity probe failed: {}", e);
                false
            }
        };

        let changed = state.send_if_modified(|current| {
            if *current == connected {
                false
            } else {
                *current = connected;
                true
            }
        });
        if changed {
            let label = if connected { "online" } else { "offline" };
            metrics::CONNECTIVITY_TRANSITIONS
                .with_label_values(&[label])
                .inc();
            info!("Connectivity changed: {}", label);
        }
        connected
    }

    /// Probe immediately, then keep probing in the background until stopped.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Connectivity monitor already running");
            return;
        }

        self.probe_once().await;

        let client = self.client.clone();
        let url = self.url.clone();
        let interval = self.interval;
        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!(url = %url, "Connectivity probe loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        Self::probe_and_publish(&client, &url, &state).await;
                    }
                }
            }
            info!("Connectivity probe loop stopped");
        });
    }

    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

impl ConnectivityMonitor for ProbeConnectivityMonitor {
    fn is_connected(&self) -> bool {
        *self.state.borrow()
    }

    fn subscribe(&self) -> Result<ConnectivitySubscription, ConnectivityError> {
        Ok(ConnectivitySubscription::new(self.state.subscribe()))
    }
}

impl Drop for ProbeConnectivityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal HTTP endpoint answering every request with the given status line.
    async fn spawn_probe_target(status: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!("HTTP/1.1 {}\r\ncontent-length: 0\r\n\r\n", status);
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{}/", addr)
    }

    fn monitor(url: &str) -> ProbeConnectivityMonitor {
        ProbeConnectivityMonitor::new(url, Duration::from_millis(20), Duration::from_millis(500))
            .unwrap()
    }

    #[tokio::test]
    async fn test_starts_offline() {
        let monitor = monitor("http://127.0.0.1:9/");
        assert!(!monitor.is_connected());
    }

    #[tokio::test]
    async fn test_any_response_counts_as_connected() {
        let url = spawn_probe_target("503 Service Unavailable").await;
        let monitor = monitor(&url);
        assert!(monitor.probe_once().await);
        assert!(monitor.is_connected());
    }

    #[tokio::test]
    async fn test_unreachable_probe_is_offline() {
        let monitor = monitor("http://127.0.0.1:9/");
        assert!(!monitor.probe_once().await);
    }

    #[tokio::test]
    async fn test_subscribers_see_transition() {
        let url = spawn_probe_target("200 OK").await;
        let monitor = monitor(&url);
        let mut sub = monitor.subscribe().unwrap();

        monitor.start().await;
        assert!(monitor.is_running());
        let state = tokio::time::timeout(Duration::from_secs(1), sub.changed())
            .await
            .unwrap();
        assert_eq!(state, Some(true));

        monitor.stop();
        assert!(!monitor.is_running());
    }
}
