//! Detail pages: a movie with its reviews, a person with related movies.

use log::{debug, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use marquee_model::{
    EntityKey, LocalPages, MovieDetails, MovieSummary, Page, PersonDetails, Review,
};

use crate::aggregate::{UniqueAccumulator, collect_unique};
use crate::fetch_state::{FetchState, StateSlot};
use crate::services::{CatalogApi, SearchParams};

/// Reviews shown per page on a movie page.
pub const REVIEWS_PER_PAGE: usize = 5;

/// Related movies gathered for a person page.
pub const RELATED_MOVIES_LIMIT: u32 = 50;

/// State of a movie page after a load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDetailView {
    pub id: Option<EntityKey>,
    pub movie: FetchState<MovieDetails>,
    pub reviews: FetchState<Vec<Review>>,
}

impl MovieDetailView {
    /// One page of reviews, 1-based; empty when out of range or not loaded.
    pub fn review_page(&self, page: usize) -> &[Review] {
        match self.reviews.data() {
            Some(reviews) => LocalPages::new(reviews, REVIEWS_PER_PAGE).page(page),
            None => &[],
        }
    }

    pub fn review_pages(&self) -> usize {
        self.reviews
            .data()
            .map_or(0, |reviews| LocalPages::new(reviews, REVIEWS_PER_PAGE).total_pages())
    }
}

/// Loads a movie and its reviews concurrently, each with its own state.
///
/// Selecting another movie drops the previous data at once; a load that was
/// overtaken by a newer one never writes its results.
#[derive(Debug)]
pub struct MovieDetailLoader {
    api: Arc<dyn CatalogApi>,
    selected: Mutex<Option<EntityKey>>,
    movie: StateSlot<MovieDetails>,
    reviews: StateSlot<Vec<Review>>,
}

impl MovieDetailLoader {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            selected: Mutex::new(None),
            movie: StateSlot::new("movie"),
            reviews: StateSlot::new("reviews"),
        }
    }

    pub async fn load(&self, id: &EntityKey) -> MovieDetailView {
        *self.selected.lock() = Some(id.clone());
        let movie_ticket = self.movie.begin();
        let reviews_ticket = self.reviews.begin();
        debug!("[MovieDetailLoader] Loading movie {}", id);

        // Each half settles its own slot as soon as its request returns.
        let movie = async {
            let result = self.api.movie(id).await;
            if let Err(e) = &result {
                warn!("[MovieDetailLoader] Movie {} failed: {}", id, e);
            }
            self.movie.finish(movie_ticket, result);
        };
        let reviews = async {
            let result = self.api.reviews(id).await;
            if let Err(e) = &result {
                warn!("[MovieDetailLoader] Reviews of {} failed: {}", id, e);
            }
            self.reviews
                .finish(reviews_ticket, result.map(Page::into_items));
        };
        futures::join!(movie, reviews);

        self.view()
    }

    pub fn view(&self) -> MovieDetailView {
        MovieDetailView {
            id: self.selected.lock().clone(),
            movie: self.movie.snapshot(),
            reviews: self.reviews.snapshot(),
        }
    }

    pub fn clear(&self) {
        *self.selected.lock() = None;
        self.movie.reset();
        self.reviews.reset();
    }
}

/// State of a person page after a load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonDetailView {
    pub id: Option<EntityKey>,
    pub person: FetchState<PersonDetails>,
    pub movies: FetchState<Vec<MovieSummary>>,
}

/// Loads a person, then the movies they appear in.
///
/// Related movies come from a search by the person's name; when that yields
/// nothing or fails, the person's own `known_for` list is used.
#[derive(Debug)]
pub struct PersonDetailLoader {
    api: Arc<dyn CatalogApi>,
    page_size: u32,
    selected: Mutex<Option<EntityKey>>,
    person: StateSlot<PersonDetails>,
    movies: StateSlot<Vec<MovieSummary>>,
}

impl PersonDetailLoader {
    pub fn new(api: Arc<dyn CatalogApi>, page_size: u32) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            selected: Mutex::new(None),
            person: StateSlot::new("person"),
            movies: StateSlot::new("person movies"),
        }
    }

    pub async fn load(&self, id: &EntityKey) -> PersonDetailView {
        *self.selected.lock() = Some(id.clone());
        let person_ticket = self.person.begin();
        let movies_ticket = self.movies.begin();

        let person = match self.api.person(id).await {
            Ok(person) => person,
            Err(e) => {
                warn!("[PersonDetailLoader] Person {} failed: {}", id, e);
                let message = e.to_string();
                self.person.finish(person_ticket, Err(e));
                self.movies.finish(movies_ticket, Err(message));
                return self.view();
            }
        };

        if !self.person.finish(person_ticket, Ok::<_, String>(person.clone())) {
            return self.view();
        }

        let movies = self.related_movies(&person).await;
        self.movies.finish(movies_ticket, Ok::<_, String>(movies));
        self.view()
    }

    async fn related_movies(&self, person: &PersonDetails) -> Vec<MovieSummary> {
        let name = person.person.name.trim();
        if !name.is_empty() {
            let params = SearchParams::new().person(name);
            let api = &self.api;
            let criteria = &params;
            let outcome = collect_unique(
                move |page| api.search_movies(criteria, page),
                RELATED_MOVIES_LIMIT,
                self.page_size,
            )
            .await;
            if !outcome.items.is_empty() {
                return outcome.items;
            }
            debug!(
                "[PersonDetailLoader] No search results for '{}', using known_for",
                name
            );
        }

        let mut known = UniqueAccumulator::new();
        known.extend(person.known_for.iter().map(|k| k.movie.clone()));
        let mut movies = known.into_items();
        movies.truncate(RELATED_MOVIES_LIMIT as usize);
        movies
    }

    pub fn view(&self) -> PersonDetailView {
        PersonDetailView {
            id: self.selected.lock().clone(),
            person: self.person.snapshot(),
            movies: self.movies.snapshot(),
        }
    }

    pub fn clear(&self) {
        *self.selected.lock() = None;
        self.person.reset();
        self.movies.reset();
    }
}
