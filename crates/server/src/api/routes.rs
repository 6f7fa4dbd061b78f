use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{cart, catalog, handlers, middleware::metrics_middleware, products, queue};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Catalog state
        .route("/catalog", get(catalog::get_catalog))
        .route("/catalog/fetch", post(catalog::fetch))
        .route("/catalog/load-more", post(catalog::load_more))
        .route("/catalog/filters", put(catalog::set_filter))
        .route("/catalog/filters/reset", post(catalog::reset_filters))
        .route("/catalog/sort", put(catalog::set_sort))
        .route("/catalog/page", put(catalog::set_page))
        .route("/catalog/view-mode", put(catalog::set_view_mode))
        .route("/catalog/facets", post(catalog::load_facets))
        // Product lookups (do not touch the working set)
        .route("/products/search", get(products::search))
        .route("/products/{id}", get(products::get_product))
        // Offline queue
        .route("/queue", get(queue::list_queue))
        .route("/queue", post(queue::enqueue))
        .route("/queue/replay", post(queue::replay))
        .route("/queue/drain", post(queue::drain))
        // Cart
        .route("/cart", get(cart::get_cart))
        .route("/cart", delete(cart::clear_cart))
        .route("/cart/items", post(cart::add_to_cart))
        .route("/cart/items/{id}", put(cart::update_cart_item))
        .route("/cart/items/{id}", delete(cart::remove_cart_item))
        // Wishlist
        .route("/wishlist", get(cart::get_wishlist))
        .route("/wishlist", post(cart::add_to_wishlist))
        .route("/wishlist/{id}", delete(cart::remove_from_wishlist));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
