//! Offline action queue.
//!
//! Side-effecting requests that could not be sent are persisted in a durable
//! key-value store and replayed, oldest first, once the network is back. A
//! failing action is kept for the next pass without blocking the others.

mod executor;
mod listener;
mod offline;
mod sqlite;
mod store;
mod types;

pub use executor::{ActionExecutor, HttpActionExecutor};
pub use listener::{ReplayCallback, ReplayListener, ReplayListenerHandle};
pub use offline::OfflineQueue;
pub use sqlite::SqliteDurableStore;
pub use store::{DurableStore, MemoryDurableStore, StoreError};
pub use types::*;
