use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::debug;

use super::{ActionError, OfflineAction};
use crate::config::ExecutorConfig;

/// Performs a queued action against the network.
///
/// `Ok` means the action took effect and may be dropped from the queue.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, action: &OfflineAction) -> Result<(), ActionError>;
}

/// Replays actions as HTTP requests. Any 2xx response counts as success.
pub struct HttpActionExecutor {
    client: Client,
}

impl HttpActionExecutor {
    pub fn new(config: &ExecutorConfig) -> Result<Self, ActionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ActionError::Invalid(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ActionExecutor for HttpActionExecutor {
    async fn execute(&self, action: &OfflineAction) -> Result<(), ActionError> {
        let request = &action.request;
        let method = Method::from_bytes(request.method.to_uppercase().as_bytes())
            .map_err(|_| ActionError::Invalid(format!("unsupported method {}", request.method)))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(action_id = %action.id, url = %request.url, "Replaying action");

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ActionError::Timeout
            } else if e.is_builder() {
                ActionError::Invalid(e.to_string())
            } else {
                ActionError::Unreachable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ActionError::Status(status.as_u16()));
        }
        Ok(())
    }
}
