//! In-memory service implementations for tests and offline demos.

pub mod stubs;

pub use stubs::{CatalogCall, RecordedRequest, StubAccountApi, StubCatalogApi};
