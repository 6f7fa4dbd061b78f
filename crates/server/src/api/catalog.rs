//! Catalog state API handlers.
//!
//! These drive the catalog engine the way a product list screen does: mutate the
//! query, then fetch the first page or append the next one.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use storefront_core::{CatalogSnapshot, Facets, FetchOutcome, FilterChange, SortKey, ViewMode};

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    #[serde(flatten)]
    pub outcome: FetchOutcome,
    pub catalog: CatalogSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub sort_by: SortKey,
}

#[derive(Debug, Deserialize)]
pub struct ViewModeRequest {
    pub view_mode: ViewMode,
}

#[derive(Debug, Deserialize)]
pub struct PageRequestBody {
    pub page: u32,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/catalog
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<CatalogSnapshot> {
    Json(state.catalog().snapshot())
}

/// POST /api/v1/catalog/fetch
///
/// Fetch the page under the cursor. Page 1 (or `refresh`) replaces the working
/// set, later pages append. The body is optional.
pub async fn fetch(
    State(state): State<Arc<AppState>>,
    body: Option<Json<FetchRequest>>,
) -> Json<FetchResponse> {
    let refresh = body.map(|Json(b)| b.refresh).unwrap_or_default();
    let outcome = state.catalog().fetch_page(refresh).await;
    Json(FetchResponse {
        outcome,
        catalog: state.catalog().snapshot(),
    })
}

/// POST /api/v1/catalog/load-more
pub async fn load_more(State(state): State<Arc<AppState>>) -> Json<FetchResponse> {
    let outcome = state.catalog().load_more().await;
    Json(FetchResponse {
        outcome,
        catalog: state.catalog().snapshot(),
    })
}

/// PUT /api/v1/catalog/filters
///
/// Apply a single-field filter change, e.g. `{"key": "search_query", "value": "kale"}`.
pub async fn set_filter(
    State(state): State<Arc<AppState>>,
    Json(change): Json<FilterChange>,
) -> Json<CatalogSnapshot> {
    state.catalog().set_filter(change);
    Json(state.catalog().snapshot())
}

/// POST /api/v1/catalog/filters/reset
pub async fn reset_filters(State(state): State<Arc<AppState>>) -> Json<CatalogSnapshot> {
    state.catalog().reset_filters();
    Json(state.catalog().snapshot())
}

/// PUT /api/v1/catalog/sort
pub async fn set_sort(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SortRequest>,
) -> Json<CatalogSnapshot> {
    state.catalog().set_sort_by(req.sort_by);
    Json(state.catalog().snapshot())
}

/// PUT /api/v1/catalog/page
pub async fn set_page(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PageRequestBody>,
) -> Json<CatalogSnapshot> {
    state.catalog().set_page(req.page);
    Json(state.catalog().snapshot())
}

/// PUT /api/v1/catalog/view-mode
pub async fn set_view_mode(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ViewModeRequest>,
) -> Json<CatalogSnapshot> {
    state.catalog().set_view_mode(req.view_mode);
    Json(state.catalog().snapshot())
}

/// POST /api/v1/catalog/facets
///
/// Load categories, farming methods and price bounds and reset the filters.
pub async fn load_facets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Facets>, impl IntoResponse> {
    match state.catalog().load_facets().await {
        Some(facets) => Ok(Json(facets)),
        None => Err(ErrorResponse::new(
            StatusCode::BAD_GATEWAY,
            state
                .catalog()
                .error_message()
                .unwrap_or_else(|| "Failed to load facets".to_string()),
        )),
    }
}
