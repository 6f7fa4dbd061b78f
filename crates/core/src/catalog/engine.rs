//! Catalog state engine.
//!
//! Owns the working set of products, the active query (filters + sort), the
//! pagination cursor and the loading/error flags. Every filter or sort change
//! starts a new epoch: the cursor goes back to page 1 and any response issued
//! under an older epoch is discarded when it settles.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::filter::apply_filter_change;
use super::source::ProductSource;
use super::{
    CatalogError, Facets, FilterChange, FilterConfig, Page, PageRequest, Product, SortKey,
    ViewMode,
};
use crate::metrics;

/// Whether a settled page replaced or extended the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    Replace,
    Append,
}

/// Result of a fetch. Fetches never return errors; failures land in the state flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The page was merged into the working set.
    Applied {
        mode: MergeMode,
        page: u32,
        items: usize,
    },
    /// The query changed while the request was in flight; the response was dropped.
    Stale { epoch: u64 },
    /// The data source failed; the working set is untouched.
    Failed { message: String },
    /// `load_more` had nothing to do (no more pages, or a fetch already in flight).
    Skipped,
}

/// Consistent, point-in-time copy of the engine state.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub filters: FilterConfig,
    pub sort_by: SortKey,
    pub view_mode: ViewMode,
    pub pagination: PageRequest,
    pub has_more_products: bool,
    pub is_loading: bool,
    pub has_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub facets: Facets,
    pub epoch: u64,
}

#[derive(Debug)]
struct CatalogState {
    products: Vec<Product>,
    filters: FilterConfig,
    sort: SortKey,
    view_mode: ViewMode,
    cursor: PageRequest,
    /// Last page applied in the current epoch (0 = nothing loaded yet).
    loaded_page: u32,
    has_more: bool,
    in_flight: usize,
    error: Option<String>,
    epoch: u64,
    facets: Facets,
}

/// Everything a fetch needs, captured under the lock when the fetch is issued.
#[derive(Debug, Clone)]
struct FetchTicket {
    epoch: u64,
    page: PageRequest,
    filters: FilterConfig,
    sort: SortKey,
    replace: bool,
}

impl CatalogState {
    fn new(default_limit: u32, sort: SortKey) -> Self {
        Self {
            products: Vec::new(),
            filters: FilterConfig::default(),
            sort,
            view_mode: ViewMode::default(),
            cursor: PageRequest::first(default_limit),
            loaded_page: 0,
            has_more: true,
            in_flight: 0,
            error: None,
            epoch: 0,
            facets: Facets::default(),
        }
    }

    /// Start a new epoch: page 1, nothing loaded, more assumed. The working set
    /// stays until a replace fetch settles.
    fn new_epoch(&mut self) {
        self.epoch += 1;
        self.cursor.page = 1;
        self.loaded_page = 0;
        self.has_more = true;
    }

    fn begin_fetch(&mut self, refresh: bool) -> FetchTicket {
        self.in_flight += 1;
        FetchTicket {
            epoch: self.epoch,
            page: self.cursor,
            filters: self.filters.clone(),
            sort: self.sort,
            replace: refresh || self.cursor.page == 1,
        }
    }

    fn settle(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Page<Product>, CatalogError>,
    ) -> FetchOutcome {
        if ticket.epoch != self.epoch {
            metrics::CATALOG_FETCHES.with_label_values(&["stale"]).inc();
            debug!(
                "Discarding stale page {} (epoch {}, current {})",
                ticket.page.page, ticket.epoch, self.epoch
            );
            return FetchOutcome::Stale {
                epoch: ticket.epoch,
            };
        }

        match result {
            Ok(page) => {
                let items = page.data.len();
                let mode = if ticket.replace {
                    self.products = page.data;
                    MergeMode::Replace
                } else {
                    self.products.extend(page.data);
                    MergeMode::Append
                };
                self.has_more = page.meta.has_more();
                self.loaded_page = ticket.page.page;
                self.error = None;
                metrics::CATALOG_FETCHES.with_label_values(&["applied"]).inc();
                debug!(
                    "Applied page {} ({:?}, {} items, has_more={})",
                    ticket.page.page, mode, items, self.has_more
                );
                FetchOutcome::Applied {
                    mode,
                    page: ticket.page.page,
                    items,
                }
            }
            Err(e) => {
                let message = e.to_string();
                // Step back so the next load-more asks for the same page again.
                if !ticket.replace && self.cursor == ticket.page {
                    self.cursor.page = self.loaded_page.max(1);
                }
                self.error = Some(message.clone());
                metrics::CATALOG_FETCHES.with_label_values(&["failed"]).inc();
                warn!("Failed to fetch page {}: {}", ticket.page.page, message);
                FetchOutcome::Failed { message }
            }
        }
    }

    fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            products: self.products.clone(),
            filters: self.filters.clone(),
            sort_by: self.sort,
            view_mode: self.view_mode,
            pagination: self.cursor,
            has_more_products: self.has_more,
            is_loading: self.in_flight > 0,
            has_error: self.error.is_some(),
            error_message: self.error.clone(),
            facets: self.facets.clone(),
            epoch: self.epoch,
        }
    }
}

/// Releases the in-flight slot of a fetch when dropped, so the loading flag clears
/// on every exit path: success, failure, panic in the source, or a dropped future.
struct InFlight<'a> {
    state: &'a RwLock<CatalogState>,
    armed: bool,
}

impl InFlight<'_> {
    fn release(mut self, state: &mut CatalogState) {
        state.in_flight = state.in_flight.saturating_sub(1);
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self
                .state
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            state.in_flight = state.in_flight.saturating_sub(1);
        }
    }
}

/// Single source of truth for the visible product list.
pub struct CatalogEngine {
    source: Arc<dyn ProductSource>,
    default_limit: u32,
    state: RwLock<CatalogState>,
}

impl CatalogEngine {
    /// Create an engine with the given page size and initial sort.
    pub fn new(source: Arc<dyn ProductSource>, default_limit: u32, sort: SortKey) -> Self {
        let default_limit = default_limit.max(1);
        Self {
            source,
            default_limit,
            state: RwLock::new(CatalogState::new(default_limit, sort)),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Merge one filter field and reset the cursor to page 1.
    ///
    /// Does not fetch. The current working set stays visible until the next
    /// replace fetch settles.
    pub fn set_filter(&self, change: FilterChange) {
        let mut state = self.write_state();
        state.filters = apply_filter_change(&state.filters, change);
        state.new_epoch();
        debug!("Filters changed (epoch {})", state.epoch);
    }

    /// Restore default filters over the discovered price bounds, keeping the search query.
    pub fn reset_filters(&self) {
        let mut state = self.write_state();
        let search_query = std::mem::take(&mut state.filters.search_query);
        state.filters = FilterConfig::reset(state.facets.price_bounds, search_query);
        state.new_epoch();
        debug!("Filters reset (epoch {})", state.epoch);
    }

    /// Change the sort key. Always a fresh epoch with the default page size.
    pub fn set_sort_by(&self, sort: SortKey) {
        let mut state = self.write_state();
        state.sort = sort;
        state.new_epoch();
        state.cursor = PageRequest::first(self.default_limit);
        debug!("Sort changed to {} (epoch {})", sort, state.epoch);
    }

    /// Move the cursor to `page` without starting a new epoch.
    ///
    /// Only meant for "load more": callers must check `has_more_products()` and
    /// `is_loading()` first. [`CatalogEngine::load_more`] does both atomically.
    pub fn set_page(&self, page: u32) {
        self.write_state().cursor.page = page.max(1);
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        self.write_state().view_mode = mode;
    }

    /// Fetch the page under the cursor.
    ///
    /// With `refresh`, the cursor is forced back to page 1 and a new epoch starts.
    /// Page 1 replaces the working set; later pages are appended in order.
    pub async fn fetch_page(&self, refresh: bool) -> FetchOutcome {
        let ticket = {
            let mut state = self.write_state();
            if refresh {
                state.new_epoch();
            }
            state.begin_fetch(refresh)
        };
        self.run_fetch(ticket).await
    }

    /// Advance to the next page and append it, unless there is nothing more to
    /// load or a fetch is already in flight.
    pub async fn load_more(&self) -> FetchOutcome {
        let ticket = {
            let mut state = self.write_state();
            if !state.has_more || state.in_flight > 0 {
                return FetchOutcome::Skipped;
            }
            state.cursor.page = state.loaded_page + 1;
            state.begin_fetch(false)
        };
        self.run_fetch(ticket).await
    }

    async fn run_fetch(&self, ticket: FetchTicket) -> FetchOutcome {
        let in_flight = InFlight {
            state: &self.state,
            armed: true,
        };

        debug!(
            "Fetching page {} (limit {}, sort {}, epoch {}) from {}",
            ticket.page.page,
            ticket.page.limit,
            ticket.sort,
            ticket.epoch,
            self.source.name()
        );

        let result = self
            .source
            .fetch_page(ticket.page, &ticket.filters, ticket.sort)
            .await;

        let mut state = self.write_state();
        in_flight.release(&mut state);
        state.settle(&ticket, result)
    }

    /// Load category labels, farming methods and price bounds, then reset the
    /// filters to defaults over the discovered price range.
    ///
    /// Returns `None` on failure, with the error recorded in the state flags.
    pub async fn load_facets(&self) -> Option<Facets> {
        let result = futures::try_join!(
            self.source.categories(),
            self.source.farming_methods(),
            self.source.price_range(),
        );

        let mut state = self.write_state();
        match result {
            Ok((categories, farming_methods, price_bounds)) => {
                let facets = Facets {
                    categories,
                    farming_methods,
                    price_bounds,
                };
                info!(
                    "Loaded facets: {} categories, {} farming methods, price {}..{}",
                    facets.categories.len(),
                    facets.farming_methods.len(),
                    price_bounds.min(),
                    price_bounds.max()
                );
                let search_query = std::mem::take(&mut state.filters.search_query);
                state.filters = FilterConfig::reset(price_bounds, search_query);
                state.facets = facets.clone();
                state.new_epoch();
                Some(facets)
            }
            Err(e) => {
                warn!("Failed to load facets: {}", e);
                state.error = Some(e.to_string());
                None
            }
        }
    }

    /// Look up a single product. Does not touch the working set.
    pub async fn product(&self, id: &str) -> Result<Product, CatalogError> {
        self.source.product(id).await
    }

    /// Quick search. Does not touch the working set.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, CatalogError> {
        self.source.search(query).await
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.read_state().snapshot()
    }

    pub fn products(&self) -> Vec<Product> {
        self.read_state().products.clone()
    }

    pub fn filters(&self) -> FilterConfig {
        self.read_state().filters.clone()
    }

    pub fn sort_by(&self) -> SortKey {
        self.read_state().sort
    }

    pub fn pagination(&self) -> PageRequest {
        self.read_state().cursor
    }

    pub fn is_loading(&self) -> bool {
        self.read_state().in_flight > 0
    }

    pub fn has_more_products(&self) -> bool {
        self.read_state().has_more
    }

    pub fn error_message(&self) -> Option<String> {
        self.read_state().error.clone()
    }
}
