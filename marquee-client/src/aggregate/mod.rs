//! Paginated aggregation over a page-limited backend.
//!
//! [`fan_out`] requests every page concurrently and concatenates them in page
//! order. [`collect_unique`] walks pages one at a time, drops duplicate
//! entities by key and stops as soon as the backend runs dry.
//!
//! Both take a page fetcher closure; anything the request needs besides the
//! page (category, search criteria) is captured by the closure.

mod fan_out;
mod unique;

pub use fan_out::fan_out;
pub use unique::{MAX_SEARCH_PAGES, SearchOutcome, UniqueAccumulator, collect_unique};
