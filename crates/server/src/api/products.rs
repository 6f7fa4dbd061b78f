//! Product lookup handlers. These read the data source directly and never touch
//! the catalog working set.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use storefront_core::{CatalogError, Product};

use super::handlers::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub products: Vec<Product>,
    pub total: usize,
}

pub(crate) fn catalog_error_status(error: &CatalogError) -> StatusCode {
    match error {
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::DataSource(_) => StatusCode::BAD_GATEWAY,
        CatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// GET /api/v1/products/search?q=...
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, impl IntoResponse> {
    match state.catalog().search(&params.q).await {
        Ok(products) => {
            let total = products.len();
            Ok(Json(SearchResponse { products, total }))
        }
        Err(e) => Err(ErrorResponse::new(catalog_error_status(&e), e)),
    }
}

/// GET /api/v1/products/{id}
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, impl IntoResponse> {
    state
        .catalog()
        .product(&id)
        .await
        .map(Json)
        .map_err(|e| ErrorResponse::new(catalog_error_status(&e), e))
}
