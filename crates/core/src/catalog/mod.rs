//! Product catalog: query model, paged data sources and the state engine that
//! keeps the visible product list consistent with the active query.

mod engine;
mod filter;
mod source;
mod types;

pub use engine::{CatalogEngine, CatalogSnapshot, FetchOutcome, MergeMode};
pub use filter::{apply_filter_change, paginate, sort_products};
pub use source::{ProductSource, StaticProductSource};
pub use types::*;
