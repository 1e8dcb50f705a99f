//! Marquee catalog client library
//!
//! Talks to a page-limited movie catalog REST API and presents it as
//! unbounded, deduplicated result sets. The `marquee` binary in `src/main.rs`
//! is a thin front end over [`context::AppContext`].
//!
//! Layers, bottom up:
//! - [`api_client`]: the HTTP client, implementing the [`services`] traits.
//! - [`aggregate`]: concurrent fan-out and sequential deduplicating search.
//! - [`fetch_state`]: per-entity load state that ignores superseded loads.
//! - [`domains`]: catalog, detail loaders, favorites and session state.
//!
//! [`testing`] holds in-memory implementations of the service traits, used by
//! the unit and integration tests.

pub mod aggregate;
pub mod api_client;
pub mod config;
pub mod context;
pub mod domains;
pub mod error;
pub mod fetch_state;
pub mod services;
pub mod storage;
pub mod testing;

pub use api_client::ApiClient;
pub use config::ClientConfig;
pub use context::AppContext;
pub use error::{ClientError, ClientResult};
