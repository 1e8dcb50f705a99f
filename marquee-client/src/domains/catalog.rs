//! Movie catalog cache: popular, top-rated and search result lists.

use log::{debug, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use marquee_model::{
    DEFAULT_TOP_RATED_CATEGORY, EntityKey, LocalPages, MovieDetails, MovieSummary, Page,
    PageRequest, PersonSummary, Review,
};

use crate::aggregate::{SearchOutcome, collect_unique, fan_out};
use crate::error::{ClientError, ClientResult};
use crate::services::{CatalogApi, SearchParams};

/// Search results shown per page.
pub const SEARCH_RESULTS_PER_PAGE: usize = 4;

#[derive(Debug, Default)]
struct CatalogState {
    popular: Vec<MovieSummary>,
    top_rated: Vec<MovieSummary>,
    search_results: Vec<MovieSummary>,
    last_search: Option<SearchParams>,
    error: Option<String>,
}

/// Caller-facing catalog.
///
/// Listings go through the aggregators so callers ask for a total instead of
/// a page. The most recent list of each kind is cached, and the most recent
/// failure is kept as a display message until the next operation starts.
#[derive(Debug)]
pub struct MovieCatalog {
    api: Arc<dyn CatalogApi>,
    page_size: u32,
    state: RwLock<CatalogState>,
    in_flight: AtomicUsize,
}

/// Counts an operation as in flight until dropped.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MovieCatalog {
    pub fn new(api: Arc<dyn CatalogApi>, page_size: u32) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            state: RwLock::new(CatalogState::default()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn start(&self) -> LoadingGuard<'_> {
        self.state.write().error = None;
        LoadingGuard::enter(&self.in_flight)
    }

    fn fail(&self, context: &str, err: &ClientError) {
        warn!("[MovieCatalog] {}: {}", context, err);
        self.state.write().error = Some(format!("{context}: {err}"));
    }

    /// Top `total` most popular movies.
    pub async fn get_popular_movies(&self, total: u32) -> ClientResult<Vec<MovieSummary>> {
        let _loading = self.start();
        let api = &self.api;
        let result = fan_out(
            move |page| api.popular_movies(page),
            total,
            self.page_size,
        )
        .await;

        match result {
            Ok(movies) => {
                debug!("[MovieCatalog] Loaded {} popular movies", movies.len());
                self.state.write().popular = movies.clone();
                Ok(movies)
            }
            Err(e) => {
                self.fail("Could not load popular movies", &e);
                Err(e)
            }
        }
    }

    /// Top `total` movies of a ranking; `None` picks `IMDB_TOP_50`.
    pub async fn get_top_rated_movies(
        &self,
        category: Option<&str>,
        total: u32,
    ) -> ClientResult<Vec<MovieSummary>> {
        let _loading = self.start();
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_TOP_RATED_CATEGORY);
        let api = &self.api;
        let result = fan_out(
            move |page| api.top_rated_movies(category, page),
            total,
            self.page_size,
        )
        .await;

        match result {
            Ok(movies) => {
                debug!(
                    "[MovieCatalog] Loaded {} top-rated movies ({})",
                    movies.len(),
                    category
                );
                self.state.write().top_rated = movies.clone();
                Ok(movies)
            }
            Err(e) => {
                self.fail("Could not load top-rated movies", &e);
                Err(e)
            }
        }
    }

    /// Up to `total` unique movies matching `keyword` and `extra`.
    ///
    /// Fails only when no criterion is given. A page failure mid-search keeps
    /// the results gathered so far; the error is on the outcome and in
    /// [`Self::error`].
    pub async fn search_movies(
        &self,
        keyword: Option<&str>,
        extra: SearchParams,
        total: u32,
    ) -> ClientResult<SearchOutcome<MovieSummary, ClientError>> {
        let mut params = extra;
        if let Some(keyword) = keyword {
            params.insert("q", keyword);
        }
        if !params.has_criteria() {
            let err = ClientError::InvalidRequest("search needs at least one criterion".into());
            self.state.write().error = Some(err.to_string());
            return Err(err);
        }

        let _loading = self.start();
        let api = &self.api;
        let criteria = &params;
        let outcome = collect_unique(
            move |page| api.search_movies(criteria, page),
            total,
            self.page_size,
        )
        .await;

        debug!(
            "[MovieCatalog] Search '{}' gathered {} movies in {} requests",
            params.describe(),
            outcome.items.len(),
            outcome.requests
        );

        let mut state = self.state.write();
        state.search_results = outcome.items.clone();
        state.last_search = Some(params);
        if let Some(e) = &outcome.failure {
            state.error = Some(format!("Search incomplete: {e}"));
        }
        Ok(outcome)
    }

    /// One page of the unfiltered listing, with its pagination metadata.
    pub async fn browse(&self, page: u32, limit: u32) -> ClientResult<Page<MovieSummary>> {
        let _loading = self.start();
        self.api
            .movies(PageRequest::new(page, limit))
            .await
            .inspect_err(|e| self.fail("Could not load movies", e))
    }

    pub async fn get_movie_by_id(&self, id: &EntityKey) -> ClientResult<MovieDetails> {
        let _loading = self.start();
        self.api
            .movie(id)
            .await
            .inspect_err(|e| self.fail("Could not load movie details", e))
    }

    pub async fn get_reviews_by_movie_id(&self, id: &EntityKey) -> ClientResult<Vec<Review>> {
        let _loading = self.start();
        self.api
            .reviews(id)
            .await
            .map(Page::into_items)
            .inspect_err(|e| self.fail("Could not load reviews", e))
    }

    pub async fn persons(&self, params: &SearchParams) -> ClientResult<Page<PersonSummary>> {
        let _loading = self.start();
        self.api
            .persons(params)
            .await
            .inspect_err(|e| self.fail("Could not load people", e))
    }

    pub fn popular(&self) -> Vec<MovieSummary> {
        self.state.read().popular.clone()
    }

    pub fn top_rated(&self) -> Vec<MovieSummary> {
        self.state.read().top_rated.clone()
    }

    pub fn search_results(&self) -> Vec<MovieSummary> {
        self.state.read().search_results.clone()
    }

    /// One display page of the last search, 1-based.
    pub fn search_page(&self, page: usize) -> Vec<MovieSummary> {
        let state = self.state.read();
        LocalPages::new(&state.search_results, SEARCH_RESULTS_PER_PAGE)
            .page(page)
            .to_vec()
    }

    pub fn search_page_count(&self) -> usize {
        LocalPages::new(&self.state.read().search_results, SEARCH_RESULTS_PER_PAGE).total_pages()
    }

    pub fn last_search(&self) -> Option<SearchParams> {
        self.state.read().last_search.clone()
    }

    /// Message of the most recent failure, cleared when an operation starts.
    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Forget every cached list and the last error.
    pub fn clear(&self) {
        *self.state.write() = CatalogState::default();
    }
}
