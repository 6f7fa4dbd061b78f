pub mod cart;
pub mod catalog;
pub mod config;
pub mod connectivity;
pub mod metrics;
pub mod queue;
pub mod testing;

pub use cart::{Cart, CartItem, Wishlist, WishlistItem};
pub use catalog::{
    apply_filter_change, CatalogEngine, CatalogError, CatalogSnapshot, Facets, FetchOutcome,
    FilterChange, FilterConfig, MergeMode, Page, PageMeta, PageRequest, PriceRange, Product,
    ProductSource, SortKey, StaticProductSource, ViewMode,
};
pub use config::{
    load_config, load_config_from_str, validate_config, CatalogConfig, Config, ConfigError,
    ConnectivityConfig, DatabaseConfig, ExecutorConfig, QueueConfig, SanitizedConfig,
    ServerConfig,
};
pub use connectivity::{
    ConnectivityError, ConnectivityMonitor, ConnectivitySubscription, ProbeConnectivityMonitor,
    StaticConnectivity,
};
pub use queue::{
    ActionError, ActionExecutor, ActionRequest, DurableStore, HttpActionExecutor,
    MemoryDurableStore, OfflineAction, OfflineQueue, QueueError, ReplayCallback, ReplayListener,
    ReplayListenerHandle, ReplayReport, SqliteDurableStore, StoreError,
};
