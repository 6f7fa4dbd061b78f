//! Types for the offline action queue.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::store::StoreError;

fn default_method() -> String {
    "POST".to_string()
}

/// An HTTP request captured while offline, to be replayed later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl ActionRequest {
    /// A `POST` to `url` with no headers and no body.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A queued action. Opaque to the queue apart from its identity and bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineAction {
    pub id: String,
    #[serde(flatten)]
    pub request: ActionRequest,
    pub enqueued_at: DateTime<Utc>,
    /// Failed replay attempts so far.
    #[serde(default)]
    pub attempts: u32,
    /// Error from the most recent failed attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl OfflineAction {
    pub fn new(request: ActionRequest) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            request,
            enqueued_at: Utc::now(),
            attempts: 0,
            last_error: None,
        }
    }
}

/// Outcome of one replay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Actions that succeeded and were removed from the queue.
    pub processed: usize,
    /// Actions that failed and were kept for the next pass.
    pub failed: usize,
}

/// Why executing an action failed.
///
/// All kinds are retried on the next pass; the distinction is kept for logs and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Network error: {0}")]
    Unreachable(String),

    #[error("Request failed with status {0}")]
    Status(u16),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid action: {0}")]
    Invalid(String),

    #[error("Executor panicked: {0}")]
    Panicked(String),
}

impl ActionError {
    /// Metric label for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionError::Unreachable(_) => "unreachable",
            ActionError::Status(_) => "status",
            ActionError::Timeout => "timeout",
            ActionError::Invalid(_) => "invalid",
            ActionError::Panicked(_) => "panicked",
        }
    }
}

/// Errors for queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
