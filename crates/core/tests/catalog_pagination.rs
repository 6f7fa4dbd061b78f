//! Catalog engine integration tests.
//!
//! These tests drive the engine against the static and mock data sources the way
//! a product list screen does: facets first, then filter/sort changes, first-page
//! fetches and "load more" appends.

use std::sync::Arc;
use std::time::Duration;

use tokio_test::assert_ok;

use storefront_core::{
    testing::{fixtures, MockProductSource},
    CatalogEngine, FetchOutcome, FilterChange, MergeMode, PageRequest, PriceRange, ProductSource,
    SortKey, StaticProductSource,
};

fn static_engine(page_size: u32) -> CatalogEngine {
    let source = StaticProductSource::new(fixtures::numbered_products(30));
    CatalogEngine::new(Arc::new(source), page_size, SortKey::PopularityDesc)
}

fn sample_engine() -> CatalogEngine {
    let source = StaticProductSource::new(fixtures::sample_products());
    CatalogEngine::new(Arc::new(source), 10, SortKey::PopularityDesc)
}

fn ids(engine: &CatalogEngine) -> Vec<String> {
    engine.products().into_iter().map(|p| p.id).collect()
}

#[tokio::test]
async fn test_every_query_change_resets_to_first_page() {
    let engine = static_engine(5);
    engine.fetch_page(false).await;

    let changes = [
        FilterChange::SearchQuery("Product".into()),
        FilterChange::OnlyAvailable(true),
        FilterChange::PriceRange(PriceRange::new(2.0, 20.0)),
        FilterChange::Categories(["Vegetables".to_string()].into_iter().collect()),
        FilterChange::FarmingMethods(["Organic".to_string()].into_iter().collect()),
    ];
    for change in changes {
        engine.load_more().await;
        assert!(engine.pagination().page > 1);
        engine.set_filter(change);
        assert_eq!(engine.pagination().page, 1);
        engine.fetch_page(false).await;
    }

    for sort in [SortKey::PriceAsc, SortKey::PriceDesc, SortKey::DateDesc] {
        engine.load_more().await;
        engine.set_sort_by(sort);
        assert_eq!(engine.pagination(), PageRequest::first(5));
    }
}

#[tokio::test]
async fn test_load_more_accumulates_pages_in_order() {
    let engine = static_engine(10);
    engine.set_sort_by(SortKey::PriceAsc);

    engine.fetch_page(false).await;
    assert_eq!(engine.products().len(), 10);
    assert!(engine.has_more_products());

    engine.load_more().await;
    engine.load_more().await;
    let expected: Vec<String> = (1..=30).map(|i| i.to_string()).collect();
    assert_eq!(ids(&engine), expected);
    assert!(!engine.has_more_products());
    assert_eq!(engine.load_more().await, FetchOutcome::Skipped);
}

#[tokio::test]
async fn test_search_then_paginate() {
    let engine = sample_engine();
    engine.fetch_page(false).await;
    engine.load_more().await;

    engine.set_filter(FilterChange::SearchQuery("tomato".into()));
    assert_eq!(engine.pagination().page, 1);

    let outcome = engine.fetch_page(false).await;
    assert_eq!(
        outcome,
        FetchOutcome::Applied {
            mode: MergeMode::Replace,
            page: 1,
            items: 1
        }
    );
    assert_eq!(ids(&engine), vec!["4"]);
    assert!(!engine.has_more_products());
}

#[tokio::test]
async fn test_sort_change_discards_accumulated_pages() {
    let engine = static_engine(10);
    engine.fetch_page(false).await;
    engine.load_more().await;
    engine.load_more().await;
    assert_eq!(engine.products().len(), 30);
    assert_eq!(engine.pagination().page, 3);

    engine.set_sort_by(SortKey::PriceAsc);
    assert_eq!(engine.pagination(), PageRequest::first(10));

    engine.fetch_page(false).await;
    let expected: Vec<String> = (1..=10).map(|i| i.to_string()).collect();
    assert_eq!(ids(&engine), expected);
}

#[tokio::test]
async fn test_price_filter_is_inclusive_end_to_end() {
    let engine = sample_engine();
    engine.set_filter(FilterChange::PriceRange(PriceRange::new(1.99, 2.49)));
    engine.fetch_page(false).await;

    let mut found = ids(&engine);
    found.sort();
    // 1.99 (apples), 2.25 (carrots), 2.49 (lettuce)
    assert_eq!(found, vec!["2", "3", "8"]);
}

#[tokio::test]
async fn test_facets_seed_default_price_range() {
    let engine = sample_engine();
    let facets = engine.load_facets().await.unwrap();

    assert_eq!(facets.categories.len(), 5);
    assert_eq!(facets.farming_methods.len(), 6);
    assert_eq!(engine.filters().price_range, PriceRange::new(1.45, 8.99));

    engine.fetch_page(false).await;
    assert_eq!(engine.products().len(), 10);
    assert_eq!(engine.snapshot().facets, facets);
}

#[tokio::test]
async fn test_only_available_hides_sold_out_products() {
    let engine = sample_engine();
    engine.set_filter(FilterChange::OnlyAvailable(true));
    engine.set_filter(FilterChange::Categories(
        ["Fruits".to_string()].into_iter().collect(),
    ));
    engine.fetch_page(false).await;

    let mut found = ids(&engine);
    found.sort();
    assert_eq!(found, vec!["2", "7"]);
}

#[tokio::test]
async fn test_newer_query_wins_over_slow_older_response() {
    let source = Arc::new(MockProductSource::with_products(fixtures::sample_products()));
    let engine = Arc::new(CatalogEngine::new(
        Arc::clone(&source) as Arc<dyn ProductSource>,
        10,
        SortKey::PopularityDesc,
    ));

    // First query: everything, held in flight.
    let release = source.hold_next().await;
    let slow = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.fetch_page(false).await })
    };
    while source.fetch_count().await == 0 {
        tokio::task::yield_now().await;
    }

    // Second query: only tomatoes, resolves immediately.
    engine.set_filter(FilterChange::SearchQuery("tomato".into()));
    engine.fetch_page(false).await;
    assert_eq!(ids(&engine), vec!["4"]);

    // The first response arrives late and must not overwrite.
    release.send(()).ok();
    let outcome = slow.await.unwrap();
    assert!(matches!(outcome, FetchOutcome::Stale { .. }));
    assert_eq!(ids(&engine), vec!["4"]);
    assert!(!engine.is_loading());
}

#[tokio::test]
async fn test_loading_flag_clears_on_every_path() {
    let source = Arc::new(MockProductSource::with_products(fixtures::sample_products()));
    let engine = CatalogEngine::new(
        Arc::clone(&source) as Arc<dyn ProductSource>,
        5,
        SortKey::PriceAsc,
    );

    engine.fetch_page(false).await;
    assert!(!engine.is_loading());

    source.set_next_error("Network request failed").await;
    engine.load_more().await;
    assert!(!engine.is_loading());
    assert!(engine.snapshot().has_error);

    let _held = source.hold_next().await;
    let abandoned = tokio::time::timeout(Duration::from_millis(20), engine.load_more()).await;
    assert!(abandoned.is_err());
    assert!(!engine.is_loading());
}

#[tokio::test]
async fn test_product_lookup_and_search_leave_working_set_alone() {
    let engine = sample_engine();
    engine.fetch_page(false).await;
    let before = ids(&engine);

    let product = assert_ok!(engine.product("14").await);
    assert_eq!(product.name, "Permaculture Honey Jar");
    let hits = assert_ok!(engine.search("organic").await);
    assert!(hits.len() >= 3);
    assert!(engine.product("999").await.is_err());

    assert_eq!(ids(&engine), before);
}
