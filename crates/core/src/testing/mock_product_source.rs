//! Mock paged data source for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::{oneshot, Mutex, RwLock};

use crate::catalog::{
    CatalogError, FilterConfig, Page, PageRequest, PriceRange, Product, ProductSource, SortKey,
    StaticProductSource,
};

/// A recorded fetch for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    pub page: PageRequest,
    pub filters: FilterConfig,
    pub sort: SortKey,
}

/// Mock implementation of the ProductSource trait.
///
/// Provides controllable behavior for testing:
/// - Serve a product list through the real filter/sort/paging logic
/// - Return scripted pages in order, ahead of the product list
/// - Fail the next fetch, or every facet lookup
/// - Hold a fetch until the test releases it, to force responses out of order
/// - Record every fetch for assertions
///
/// # Example
///
/// ```rust,ignore
/// let source = MockProductSource::new();
/// source.push_page(page).await;
/// let release = source.hold_next().await;
///
/// // ... the next fetch blocks until:
/// release.send(()).ok();
/// ```
#[derive(Debug, Default)]
pub struct MockProductSource {
    products: RwLock<Vec<Product>>,
    scripted: Mutex<VecDeque<Page<Product>>>,
    next_error: Mutex<Option<String>>,
    facets_error: Mutex<Option<String>>,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    fetches: Mutex<Vec<RecordedFetch>>,
}

impl MockProductSource {
    /// Create a mock source with no products.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source serving the given products.
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
            ..Default::default()
        }
    }

    pub async fn set_products(&self, products: Vec<Product>) {
        *self.products.write().await = products;
    }

    /// Queue a page to be returned, regardless of the request, by a future fetch.
    pub async fn push_page(&self, page: Page<Product>) {
        self.scripted.lock().await.push_back(page);
    }

    /// Make the next fetch fail with a data source error.
    pub async fn set_next_error(&self, message: &str) {
        *self.next_error.lock().await = Some(message.to_string());
    }

    /// Make every facet lookup fail until cleared.
    pub async fn set_facets_error(&self, message: &str) {
        *self.facets_error.lock().await = Some(message.to_string());
    }

    pub async fn clear_facets_error(&self) {
        *self.facets_error.lock().await = None;
    }

    /// Hold the next fetch until the returned sender fires (or is dropped).
    pub async fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().await.push_back(rx);
        tx
    }

    /// Get recorded fetches.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.lock().await.clone()
    }

    pub async fn fetch_count(&self) -> usize {
        self.fetches.lock().await.len()
    }

    async fn snapshot_source(&self) -> Result<StaticProductSource, CatalogError> {
        if let Some(message) = self.facets_error.lock().await.clone() {
            return Err(CatalogError::DataSource(message));
        }
        Ok(StaticProductSource::new(self.products.read().await.clone()))
    }
}

#[async_trait]
impl ProductSource for MockProductSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_page(
        &self,
        page: PageRequest,
        filters: &FilterConfig,
        sort: SortKey,
    ) -> Result<Page<Product>, CatalogError> {
        self.fetches.lock().await.push(RecordedFetch {
            page,
            filters: filters.clone(),
            sort,
        });
        let gate = self.gates.lock().await.pop_front();
        let error = self.next_error.lock().await.take();
        let scripted = if error.is_none() {
            self.scripted.lock().await.pop_front()
        } else {
            None
        };

        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if let Some(message) = error {
            return Err(CatalogError::DataSource(message));
        }
        if let Some(scripted) = scripted {
            return Ok(scripted);
        }

        let products = self.products.read().await.clone();
        StaticProductSource::new(products)
            .fetch_page(page, filters, sort)
            .await
    }

    async fn categories(&self) -> Result<Vec<String>, CatalogError> {
        self.snapshot_source().await?.categories().await
    }

    async fn farming_methods(&self) -> Result<Vec<String>, CatalogError> {
        self.snapshot_source().await?.farming_methods().await
    }

    async fn price_range(&self) -> Result<PriceRange, CatalogError> {
        self.snapshot_source().await?.price_range().await
    }

    async fn product(&self, id: &str) -> Result<Product, CatalogError> {
        let products = self.products.read().await.clone();
        StaticProductSource::new(products).product(id).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Product>, CatalogError> {
        let products = self.products.read().await.clone();
        StaticProductSource::new(products).search(query).await
    }
}
