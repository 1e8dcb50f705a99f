//! State containers built on the services and the aggregation engine.

pub mod catalog;
pub mod detail;
pub mod favorites;
pub mod session;

pub use catalog::{MovieCatalog, SEARCH_RESULTS_PER_PAGE};
pub use detail::{
    MovieDetailLoader, MovieDetailView, PersonDetailLoader, PersonDetailView,
    RELATED_MOVIES_LIMIT, REVIEWS_PER_PAGE,
};
pub use favorites::{FavoriteIndex, FavoritesStore};
pub use session::Session;
