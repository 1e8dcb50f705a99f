//! Catalog service trait: movies, reviews and people.

use async_trait::async_trait;
use std::fmt::Debug;

use marquee_model::{
    EntityKey, MovieDetails, MovieSummary, Page, PageRequest, PersonDetails, PersonSummary, Review,
};

use super::SearchParams;
use crate::error::ClientResult;

/// Read-only catalog operations. Every listing is one page; aggregation over
/// pages happens in [`crate::aggregate`].
#[async_trait]
pub trait CatalogApi: Send + Sync + Debug {
    /// Unfiltered movie listing used by the home page.
    async fn movies(&self, page: PageRequest) -> ClientResult<Page<MovieSummary>>;

    async fn popular_movies(&self, page: PageRequest) -> ClientResult<Page<MovieSummary>>;

    /// Top-rated listing for `category` (e.g. `IMDB_TOP_50`).
    async fn top_rated_movies(
        &self,
        category: &str,
        page: PageRequest,
    ) -> ClientResult<Page<MovieSummary>>;

    async fn search_movies(
        &self,
        params: &SearchParams,
        page: PageRequest,
    ) -> ClientResult<Page<MovieSummary>>;

    async fn movie(&self, id: &EntityKey) -> ClientResult<MovieDetails>;

    async fn reviews(&self, movie_id: &EntityKey) -> ClientResult<Page<Review>>;

    async fn persons(&self, params: &SearchParams) -> ClientResult<Page<PersonSummary>>;

    async fn person(&self, id: &EntityKey) -> ClientResult<PersonDetails>;
}
