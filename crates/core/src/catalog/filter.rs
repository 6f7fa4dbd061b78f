//! Pure query logic: filter updates, product matching, sorting and paging.

use super::{FilterChange, FilterConfig, Page, PageMeta, PageRequest, PriceRange, Product, SortKey};

/// Merge one field change into a filter configuration.
///
/// Only the touched field differs in the returned value, so concurrent single-field
/// updates coalesce as last-write-wins per field.
pub fn apply_filter_change(config: &FilterConfig, change: FilterChange) -> FilterConfig {
    let mut next = config.clone();
    match change {
        FilterChange::Categories(categories) => next.categories = categories,
        FilterChange::FarmingMethods(methods) => next.farming_methods = methods,
        FilterChange::PriceRange(range) => {
            next.price_range = PriceRange::new(range.min(), range.max())
        }
        FilterChange::OnlyAvailable(only) => next.only_available = only,
        FilterChange::SearchQuery(query) => next.search_query = query,
    }
    next
}

impl FilterConfig {
    /// Default filters over the given price bounds, keeping the search query.
    pub fn reset(price_bounds: PriceRange, search_query: impl Into<String>) -> Self {
        Self {
            price_range: price_bounds,
            search_query: search_query.into(),
            ..Default::default()
        }
    }

    /// Whether a product passes every active filter.
    pub fn matches(&self, product: &Product) -> bool {
        if !self.search_query.is_empty() {
            let needle = self.search_query.to_lowercase();
            let in_name = product.name.to_lowercase().contains(&needle);
            let in_description = product
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_name && !in_description {
                return false;
            }
        }

        if !self.categories.is_empty() && !self.categories.contains(&product.category) {
            return false;
        }

        if !self.farming_methods.is_empty()
            && !self.farming_methods.contains(&product.farming_method)
        {
            return false;
        }

        if !self.price_range.contains(product.price) {
            return false;
        }

        !self.only_available || product.is_available()
    }
}

/// Sort products in place. Ties keep their relative order.
pub fn sort_products(products: &mut [Product], sort: SortKey) {
    match sort {
        SortKey::PriceAsc => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::PriceDesc => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortKey::DateDesc => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::PopularityDesc => products.sort_by(|a, b| b.popularity.cmp(&a.popularity)),
    }
}

/// Filter, sort and slice a product list into one page.
///
/// `total_pages` is `ceil(total / limit)`; `current_page` echoes the request even
/// when it lies past the end (the page is then empty).
pub fn paginate(
    products: &[Product],
    page: PageRequest,
    filters: &FilterConfig,
    sort: SortKey,
) -> Page<Product> {
    let mut matching: Vec<Product> = products
        .iter()
        .filter(|p| filters.matches(p))
        .cloned()
        .collect();
    sort_products(&mut matching, sort);

    let total_count = matching.len();
    let limit = page.limit.max(1) as usize;
    let total_pages = total_count.div_ceil(limit) as u32;

    let data = matching
        .into_iter()
        .skip(page.offset())
        .take(limit)
        .collect();

    Page {
        data,
        meta: PageMeta {
            total_count: total_count as u64,
            total_pages,
            current_page: page.page,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_apply_filter_change_touches_one_field() {
        let config = FilterConfig {
            search_query: "kale".to_string(),
            ..Default::default()
        };
        let next = apply_filter_change(&config, FilterChange::OnlyAvailable(true));
        assert!(next.only_available);
        assert_eq!(next.search_query, "kale");
        assert_eq!(next.price_range, config.price_range);
    }

    #[test]
    fn test_apply_filter_change_last_write_wins() {
        let config = FilterConfig::default();
        let first = apply_filter_change(&config, FilterChange::SearchQuery("apple".into()));
        let second = apply_filter_change(&first, FilterChange::SearchQuery("pear".into()));
        assert_eq!(second.search_query, "pear");
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let config = FilterConfig::default();
        let product = fixtures::product("1", "Anything", 5.0);
        assert!(config.matches(&product));
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_description() {
        let config = FilterConfig {
            search_query: "TOMATO".to_string(),
            ..Default::default()
        };
        let by_name = fixtures::product("1", "Heirloom Tomatoes", 4.25);
        let mut by_description = fixtures::product("2", "Salad Mix", 3.0);
        by_description.description = Some("with cherry tomatoes".to_string());
        let neither = fixtures::product("3", "Kale", 2.0);

        assert!(config.matches(&by_name));
        assert!(config.matches(&by_description));
        assert!(!config.matches(&neither));
    }

    #[test]
    fn test_price_filter_boundaries() {
        let config = FilterConfig {
            price_range: PriceRange::new(2.0, 5.0),
            ..Default::default()
        };
        assert!(config.matches(&fixtures::product("a", "At min", 2.0)));
        assert!(config.matches(&fixtures::product("b", "At max", 5.0)));
        assert!(!config.matches(&fixtures::product("c", "Below", 1.99)));
        assert!(!config.matches(&fixtures::product("d", "Above", 5.01)));
    }

    #[test]
    fn test_category_and_availability_filters() {
        let config = FilterConfig {
            categories: ["Fruits".to_string()].into_iter().collect(),
            only_available: true,
            ..Default::default()
        };
        let fruit = fixtures::product_in("1", "Apple", 1.0, "Fruits", "Organic", 10);
        let sold_out = fixtures::product_in("2", "Berry", 1.0, "Fruits", "Organic", 0);
        let vegetable = fixtures::product_in("3", "Kale", 1.0, "Vegetables", "Organic", 10);

        assert!(config.matches(&fruit));
        assert!(!config.matches(&sold_out));
        assert!(!config.matches(&vegetable));
    }

    #[test]
    fn test_sort_products() {
        let mut products = vec![
            fixtures::product("1", "Mid", 3.0),
            fixtures::product("2", "Cheap", 1.0),
            fixtures::product("3", "Dear", 9.0),
        ];
        sort_products(&mut products, SortKey::PriceAsc);
        let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);

        sort_products(&mut products, SortKey::PriceDesc);
        let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_paginate_metadata() {
        let products = fixtures::numbered_products(25);
        let page = paginate(
            &products,
            PageRequest::new(3, 10),
            &FilterConfig::default(),
            SortKey::PriceAsc,
        );
        assert_eq!(page.data.len(), 5);
        assert_eq!(page.meta.total_count, 25);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.meta.current_page, 3);
        assert!(!page.meta.has_more());
    }

    #[test]
    fn test_paginate_empty_result() {
        let page = paginate(
            &[],
            PageRequest::first(10),
            &FilterConfig::default(),
            SortKey::default(),
        );
        assert!(page.data.is_empty());
        assert_eq!(page.meta.total_pages, 0);
        assert!(!page.meta.has_more());
    }
}
