//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external collaborators
//! (paged data source, action executor, connectivity monitor), allowing the
//! engines to be tested without a network.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_core::testing::{fixtures, MockProductSource, ManualConnectivity};
//!
//! let source = MockProductSource::with_products(fixtures::sample_products());
//! let connectivity = ManualConnectivity::new(false);
//!
//! // Force the next fetch to fail
//! source.set_next_error("Network request failed").await;
//!
//! // Come back online
//! connectivity.set_connected(true);
//! ```

mod manual_connectivity;
mod mock_action_executor;
mod mock_product_source;

pub use manual_connectivity::ManualConnectivity;
pub use mock_action_executor::{MockActionExecutor, RecordedAction};
pub use mock_product_source::{MockProductSource, RecordedFetch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::catalog::Product;
    use crate::queue::{ActionRequest, OfflineAction};

    fn listed_at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, minute, 0)
            .single()
            .unwrap_or_default()
    }

    /// Create a test product with reasonable defaults.
    pub fn product(id: &str, name: &str, price: f64) -> Product {
        product_in(id, name, price, "Vegetables", "Organic", 10)
    }

    /// Create a test product with explicit category, farming method and stock.
    pub fn product_in(
        id: &str,
        name: &str,
        price: f64,
        category: &str,
        farming_method: &str,
        available_quantity: u32,
    ) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            price,
            description: None,
            image: format!("https://images.example.com/{}.jpg", id),
            category: category.to_string(),
            farming_method: farming_method.to_string(),
            available_quantity,
            created_at: listed_at(1, 12, 0),
            popularity: 50,
        }
    }

    /// `n` products with ids "1".."n", ascending prices and popularity.
    pub fn numbered_products(n: u32) -> Vec<Product> {
        (1..=n)
            .map(|i| {
                let mut p = product(&i.to_string(), &format!("Product {}", i), f64::from(i));
                p.popularity = i;
                p.created_at = listed_at(1 + (i % 28), 8, 0);
                p
            })
            .collect()
    }

    /// A small farm-shop catalog: 15 products over five categories.
    pub fn sample_products() -> Vec<Product> {
        #[rustfmt::skip]
        let rows: [(&str, &str, f64, &str, &str, &str, u32, u32, u32, u32, u32); 15] = [
            ("1", "Organic Kale Bunch", 3.99, "Fresh organic kale grown with sustainable farming practices", "Vegetables", "Organic", 45, 15, 14, 30, 95),
            ("2", "Red Delicious Apples", 1.99, "Sweet and crunchy apples picked at peak ripeness", "Fruits", "Traditional", 120, 13, 9, 45, 87),
            ("3", "Hydroponic Lettuce", 2.49, "Crisp lettuce grown using advanced hydroponic technology", "Vegetables", "Hydroponic", 80, 20, 11, 15, 75),
            ("4", "Heirloom Tomatoes", 4.25, "Colorful mix of heirloom tomato varieties with exceptional flavor", "Vegetables", "Biodynamic", 35, 18, 15, 30, 92),
            ("5", "Greenhouse Cucumbers", 1.75, "Tender cucumbers grown in controlled greenhouse environments", "Vegetables", "Greenhouse", 65, 16, 10, 20, 78),
            ("6", "Wild Strawberries", 5.99, "Sweet and aromatic wild strawberries with intense flavor", "Fruits", "Organic", 0, 12, 8, 45, 96),
            ("7", "Permaculture Blueberries", 6.49, "Nutrient-rich blueberries from permaculture farming systems", "Fruits", "Permaculture", 25, 21, 16, 10, 89),
            ("8", "Organic Carrots Bundle", 2.25, "Sweet, crunchy carrots perfect for snacking or cooking", "Vegetables", "Organic", 55, 14, 12, 15, 82),
            ("9", "Biodynamic Avocados", 2.99, "Creamy avocados grown using holistic biodynamic methods", "Fruits", "Biodynamic", 0, 19, 14, 25, 94),
            ("10", "Traditional Sweet Potatoes", 1.45, "Versatile sweet potatoes grown with traditional farming methods", "Vegetables", "Traditional", 90, 17, 9, 30, 71),
            ("11", "Greenhouse Bell Peppers", 3.25, "Colorful bell peppers with perfect texture and flavor", "Vegetables", "Greenhouse", 40, 22, 13, 0, 85),
            ("12", "Organic Fresh Herbs Set", 7.99, "Assorted fresh herbs: basil, cilantro, mint, and rosemary", "Herbs", "Organic", 20, 23, 15, 45, 88),
            ("13", "Hydroponic Spinach", 3.49, "Nutrient-rich spinach grown in hydroponic vertical farms", "Vegetables", "Hydroponic", 60, 24, 10, 10, 80),
            ("14", "Permaculture Honey Jar", 8.99, "Pure, unfiltered honey from permaculture farm pollinators", "Specialty", "Permaculture", 15, 11, 11, 30, 93),
            ("15", "Traditional Fresh Eggs", 4.75, "Farm-fresh eggs from free-range hens", "Dairy & Eggs", "Traditional", 30, 10, 8, 15, 91),
        ];

        rows.into_iter()
            .map(
                |(id, name, price, description, category, method, qty, day, hour, minute, popularity)| {
                    let mut p = product_in(id, name, price, category, method, qty);
                    p.description = Some(description.to_string());
                    p.created_at = listed_at(day, hour, minute);
                    p.popularity = popularity;
                    p
                },
            )
            .collect()
    }

    /// A queued `POST` to `url`.
    pub fn action(url: &str) -> OfflineAction {
        OfflineAction::new(ActionRequest::new(url).with_body(serde_json::json!({"source": "test"})))
    }
}
