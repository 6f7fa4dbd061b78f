//! Paged data source abstraction and the in-process static implementation.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use super::filter::paginate;
use super::{CatalogError, FilterConfig, Page, PageRequest, PriceRange, Product, SortKey};

/// A remote (or simulated) service that serves products one page at a time.
///
/// Implementations must be idempotent for identical inputs so callers can retry freely.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Fetch one page of products matching `filters`, ordered by `sort`.
    async fn fetch_page(
        &self,
        page: PageRequest,
        filters: &FilterConfig,
        sort: SortKey,
    ) -> Result<Page<Product>, CatalogError>;

    /// All category labels.
    async fn categories(&self) -> Result<Vec<String>, CatalogError>;

    /// All farming method labels.
    async fn farming_methods(&self) -> Result<Vec<String>, CatalogError>;

    /// Lowest and highest product price.
    async fn price_range(&self) -> Result<PriceRange, CatalogError>;

    /// A single product by ID.
    async fn product(&self, id: &str) -> Result<Product, CatalogError>;

    /// Quick search over name and description. An empty query returns nothing.
    async fn search(&self, query: &str) -> Result<Vec<Product>, CatalogError>;
}

/// Serves a fixed product list, applying filters, sorting and pagination in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticProductSource {
    products: Vec<Product>,
    latency: Option<Duration>,
}

impl StaticProductSource {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            latency: None,
        }
    }

    /// Load the product list from a JSON array on disk.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::Internal(format!("failed to read {}: {}", path.display(), e))
        })?;
        let products: Vec<Product> = serde_json::from_str(&raw).map_err(|e| {
            CatalogError::Internal(format!("failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Self::new(products))
    }

    /// Delay every call by `latency` to simulate a network round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn distinct_labels<'a>(labels: impl Iterator<Item = &'a String>) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for label in labels {
            if !seen.contains(label) {
                seen.push(label.clone());
            }
        }
        seen
    }
}

#[async_trait]
impl ProductSource for StaticProductSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_page(
        &self,
        page: PageRequest,
        filters: &FilterConfig,
        sort: SortKey,
    ) -> Result<Page<Product>, CatalogError> {
        self.simulate_latency().await;
        Ok(paginate(&self.products, page, filters, sort))
    }

    async fn categories(&self) -> Result<Vec<String>, CatalogError> {
        self.simulate_latency().await;
        Ok(Self::distinct_labels(
            self.products.iter().map(|p| &p.category),
        ))
    }

    async fn farming_methods(&self) -> Result<Vec<String>, CatalogError> {
        self.simulate_latency().await;
        Ok(Self::distinct_labels(
            self.products.iter().map(|p| &p.farming_method),
        ))
    }

    async fn price_range(&self) -> Result<PriceRange, CatalogError> {
        self.simulate_latency().await;
        let mut prices = self.products.iter().map(|p| p.price);
        let Some(first) = prices.next() else {
            return Ok(PriceRange::new(0.0, 0.0));
        };
        let (min, max) = prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Ok(PriceRange::new(min, max))
    }

    async fn product(&self, id: &str) -> Result<Product, CatalogError> {
        self.simulate_latency().await;
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    async fn search(&self, query: &str) -> Result<Vec<Product>, CatalogError> {
        self.simulate_latency().await;
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let filters = FilterConfig {
            search_query: query.to_string(),
            price_range: PriceRange::new(f64::MIN, f64::MAX),
            ..Default::default()
        };
        Ok(self
            .products
            .iter()
            .filter(|p| filters.matches(p))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source() -> StaticProductSource {
        StaticProductSource::new(fixtures::sample_products())
    }

    #[tokio::test]
    async fn test_fetch_page_applies_filters_and_sort() {
        let filters = FilterConfig {
            categories: ["Fruits".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let page = source()
            .fetch_page(PageRequest::first(10), &filters, SortKey::PriceAsc)
            .await
            .unwrap();

        assert!(!page.data.is_empty());
        assert!(page.data.iter().all(|p| p.category == "Fruits"));
        assert!(page.data.windows(2).all(|w| w[0].price <= w[1].price));
        assert_eq!(page.meta.current_page, 1);
    }

    #[tokio::test]
    async fn test_discovery_endpoints() {
        let source = source();
        let categories = source.categories().await.unwrap();
        assert_eq!(categories[0], "Vegetables");
        assert!(categories.contains(&"Fruits".to_string()));

        let methods = source.farming_methods().await.unwrap();
        assert!(methods.contains(&"Organic".to_string()));
        assert_eq!(
            methods.len(),
            methods
                .iter()
                .collect::<std::collections::HashSet<_>>()
                .len()
        );

        let range = source.price_range().await.unwrap();
        assert_eq!(range.min(), 1.45);
        assert_eq!(range.max(), 8.99);
    }

    #[tokio::test]
    async fn test_price_range_of_empty_source() {
        let range = StaticProductSource::default().price_range().await.unwrap();
        assert_eq!(range, PriceRange::new(0.0, 0.0));
    }

    #[tokio::test]
    async fn test_product_lookup() {
        let source = source();
        let product = source.product("4").await.unwrap();
        assert_eq!(product.name, "Heirloom Tomatoes");

        let err = source.product("missing").await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
        assert_eq!(err.to_string(), "Product with ID missing not found");
    }

    #[tokio::test]
    async fn test_search() {
        let source = source();
        assert!(source.search("").await.unwrap().is_empty());
        let hits = source.search("tomato").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "4");
    }

    #[tokio::test]
    async fn test_simulated_latency() {
        let source = source().with_latency(Duration::from_millis(20));
        assert!(!source.is_empty());

        let started = std::time::Instant::now();
        source.categories().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&fixtures::sample_products()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let source = StaticProductSource::from_json_file(file.path()).unwrap();
        assert_eq!(source.len(), fixtures::sample_products().len());
    }

    #[test]
    fn test_from_json_file_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        let err = StaticProductSource::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Internal(_)));
    }
}
