//! Service abstractions over the catalog HTTP API.
//!
//! State containers only ever talk to these traits; [`crate::api_client::ApiClient`]
//! implements them over HTTP and [`crate::testing`] provides in-memory stubs.

pub mod account;
pub mod catalog;
pub mod params;

pub use account::AccountApi;
pub use catalog::CatalogApi;
pub use params::SearchParams;
