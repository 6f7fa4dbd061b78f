use std::sync::Arc;

use tokio::sync::RwLock;

use storefront_core::{
    ActionExecutor, Cart, CatalogEngine, Config, ConnectivityMonitor, OfflineQueue,
    SanitizedConfig, Wishlist,
};

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: Arc<CatalogEngine>,
    queue: Arc<OfflineQueue>,
    executor: Arc<dyn ActionExecutor>,
    connectivity: Arc<dyn ConnectivityMonitor>,
    cart: RwLock<Cart>,
    wishlist: RwLock<Wishlist>,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<CatalogEngine>,
        queue: Arc<OfflineQueue>,
        executor: Arc<dyn ActionExecutor>,
        connectivity: Arc<dyn ConnectivityMonitor>,
    ) -> Self {
        Self {
            config,
            catalog,
            queue,
            executor,
            connectivity,
            cart: RwLock::new(Cart::new()),
            wishlist: RwLock::new(Wishlist::new()),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn catalog(&self) -> &CatalogEngine {
        self.catalog.as_ref()
    }

    pub fn queue(&self) -> &OfflineQueue {
        self.queue.as_ref()
    }

    pub fn executor(&self) -> &dyn ActionExecutor {
        self.executor.as_ref()
    }

    pub fn connectivity(&self) -> &dyn ConnectivityMonitor {
        self.connectivity.as_ref()
    }

    pub fn cart(&self) -> &RwLock<Cart> {
        &self.cart
    }

    pub fn wishlist(&self) -> &RwLock<Wishlist> {
        &self.wishlist
    }
}
