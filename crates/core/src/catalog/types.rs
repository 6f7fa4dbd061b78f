//! Types for the product catalog: product records, query configuration and pagination.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A product as returned by the paged data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable product identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: f64,
    /// Long description (searched together with the name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Category label (e.g., "Vegetables").
    pub category: String,
    /// Farming method label (e.g., "Organic").
    pub farming_method: String,
    /// Units in stock. Zero means unavailable.
    pub available_quantity: u32,
    /// When the product was listed.
    pub created_at: DateTime<Utc>,
    /// Popularity score, higher is more popular.
    pub popularity: u32,
}

impl Product {
    /// Whether any stock is left.
    pub fn is_available(&self) -> bool {
        self.available_quantity > 0
    }
}

/// Inclusive price bounds.
///
/// Fields are private so that `min <= max` always holds: every constructor
/// (including deserialization) goes through [`PriceRange::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPriceRange")]
pub struct PriceRange {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawPriceRange {
    min: f64,
    max: f64,
}

impl From<RawPriceRange> for PriceRange {
    fn from(raw: RawPriceRange) -> Self {
        PriceRange::new(raw.min, raw.max)
    }
}

impl PriceRange {
    /// Create a range, clamping an inverted pair so that `min` never exceeds `max`.
    ///
    /// A NaN lower bound becomes 0 and a NaN upper bound collapses onto the lower one.
    pub fn new(min: f64, max: f64) -> Self {
        let min = if min.is_nan() { 0.0 } else { min };
        let max = if max.is_nan() { min } else { max };
        Self {
            min: min.min(max),
            max,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Inclusive on both bounds.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1000.0,
        }
    }
}

/// The active product query.
///
/// Empty sets and an empty search query mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub farming_methods: BTreeSet<String>,
    #[serde(default)]
    pub price_range: PriceRange,
    #[serde(default)]
    pub only_available: bool,
    #[serde(default)]
    pub search_query: String,
}

/// A single-field update to a [`FilterConfig`].
///
/// Serialized as `{"key": "<field>", "value": <value>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "snake_case")]
pub enum FilterChange {
    Categories(BTreeSet<String>),
    FarmingMethods(BTreeSet<String>),
    PriceRange(PriceRange),
    OnlyAvailable(bool),
    SearchQuery(String),
}

/// Sort order for product listings. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Price: low to high.
    PriceAsc,
    /// Price: high to low.
    PriceDesc,
    /// Newest first.
    DateDesc,
    /// Most popular first.
    #[default]
    PopularityDesc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::DateDesc => "date-desc",
            SortKey::PopularityDesc => "popularity-desc",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the product list is laid out by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

/// Pagination cursor: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Create a cursor; both fields are raised to at least 1.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// First page with the given size.
    pub fn first(limit: u32) -> Self {
        Self::new(1, limit)
    }

    /// Zero-based index of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }
}

/// Pagination metadata returned with every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total_count: u64,
    pub total_pages: u32,
    pub current_page: u32,
}

impl PageMeta {
    /// True iff pages remain after the current one.
    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// Labels and bounds discovered from the data source, used to seed the filter UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Facets {
    pub categories: Vec<String>,
    pub farming_methods: Vec<String>,
    pub price_bounds: PriceRange,
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Product with ID {0} not found")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
