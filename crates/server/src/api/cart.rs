//! Cart and wishlist API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use storefront_core::{Cart, CartItem, Product, Wishlist, WishlistItem};

use super::handlers::{ApiError, ErrorResponse};
use super::products::catalog_error_status;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub subtotal: f64,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().to_vec(),
            item_count: cart.item_count(),
            subtotal: cart.subtotal(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WishlistResponse {
    pub items: Vec<WishlistItem>,
    pub count: usize,
}

impl From<&Wishlist> for WishlistResponse {
    fn from(wishlist: &Wishlist) -> Self {
        Self {
            items: wishlist.items().to_vec(),
            count: wishlist.len(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct AddToWishlistRequest {
    pub product_id: String,
}

async fn lookup(state: &AppState, id: &str) -> Result<Product, ApiError> {
    state
        .catalog()
        .product(id)
        .await
        .map_err(|e| ErrorResponse::new(catalog_error_status(&e), e))
}

// ============================================================================
// Cart
// ============================================================================

/// GET /api/v1/cart
pub async fn get_cart(State(state): State<Arc<AppState>>) -> Json<CartResponse> {
    let cart = state.cart().read().await;
    Json(CartResponse::from(&*cart))
}

/// POST /api/v1/cart/items
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    if req.quantity == 0 {
        return Err(ErrorResponse::new(
            StatusCode::BAD_REQUEST,
            "quantity must be at least 1",
        ));
    }

    let product = lookup(&state, &req.product_id).await?;
    let mut cart = state.cart().write().await;
    cart.add(CartItem::from_product(&product, req.quantity));
    Ok(Json(CartResponse::from(&*cart)))
}

/// PUT /api/v1/cart/items/{id}
///
/// A quantity of zero removes the line.
pub async fn update_cart_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<CartResponse>, impl IntoResponse> {
    let mut cart = state.cart().write().await;
    if cart.update_quantity(&id, req.quantity) {
        Ok(Json(CartResponse::from(&*cart)))
    } else {
        Err(ErrorResponse::new(
            StatusCode::NOT_FOUND,
            format!("Product {} is not in the cart", id),
        ))
    }
}

/// DELETE /api/v1/cart/items/{id}
pub async fn remove_cart_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, impl IntoResponse> {
    let mut cart = state.cart().write().await;
    if cart.remove(&id) {
        Ok(Json(CartResponse::from(&*cart)))
    } else {
        Err(ErrorResponse::new(
            StatusCode::NOT_FOUND,
            format!("Product {} is not in the cart", id),
        ))
    }
}

/// DELETE /api/v1/cart
pub async fn clear_cart(State(state): State<Arc<AppState>>) -> Json<CartResponse> {
    let mut cart = state.cart().write().await;
    cart.clear();
    Json(CartResponse::from(&*cart))
}

// ============================================================================
// Wishlist
// ============================================================================

/// GET /api/v1/wishlist
pub async fn get_wishlist(State(state): State<Arc<AppState>>) -> Json<WishlistResponse> {
    let wishlist = state.wishlist().read().await;
    Json(WishlistResponse::from(&*wishlist))
}

/// POST /api/v1/wishlist
///
/// Adding a product that is already on the list is a no-op.
pub async fn add_to_wishlist(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddToWishlistRequest>,
) -> Result<Json<WishlistResponse>, ApiError> {
    let product = lookup(&state, &req.product_id).await?;
    let mut wishlist = state.wishlist().write().await;
    wishlist.add(WishlistItem::from(&product));
    Ok(Json(WishlistResponse::from(&*wishlist)))
}

/// DELETE /api/v1/wishlist/{id}
pub async fn remove_from_wishlist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WishlistResponse>, impl IntoResponse> {
    let mut wishlist = state.wishlist().write().await;
    if wishlist.remove(&id) {
        Ok(Json(WishlistResponse::from(&*wishlist)))
    } else {
        Err(ErrorResponse::new(
            StatusCode::NOT_FOUND,
            format!("Product {} is not on the wishlist", id),
        ))
    }
}
