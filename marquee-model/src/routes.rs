//! Catalog API route definitions.
//!
//! Paths are relative to the server origin. Routes with an `{id}` segment are
//! expanded with [`with_id`].

macro_rules! api_path {
    ($path:literal) => {
        concat!("/api", $path)
    };
}

pub mod movies {
    //! Movie listings, search, detail and reviews.
    pub const COLLECTION: &str = api_path!("/movies");
    pub const MOST_POPULAR: &str = api_path!("/movies/most-popular");
    pub const TOP_RATED: &str = api_path!("/movies/top-rated");
    pub const SEARCH: &str = api_path!("/movies/search");
    pub const ITEM: &str = api_path!("/movies/{id}");
    pub const REVIEWS: &str = api_path!("/movies/{id}/reviews");
}

pub mod persons {
    //! People listing and detail.
    pub const COLLECTION: &str = api_path!("/persons");
    pub const ITEM: &str = api_path!("/persons/{id}");
}

pub mod users {
    //! Account and favorites routes; everything except register and login
    //! needs a user token.
    pub const REGISTER: &str = api_path!("/users/register");
    pub const LOGIN: &str = api_path!("/users/login");
    pub const LOGOUT: &str = api_path!("/users/logout");
    pub const PROFILE: &str = api_path!("/users/profile");
    pub const FAVORITES: &str = api_path!("/users/favorites");
    pub const FAVORITE_ITEM: &str = api_path!("/users/favorites/{id}");
}

/// Substitute a percent-encoded id for the `{id}` placeholder.
pub fn with_id(route: &str, id: &str) -> String {
    route.replace("{id}", &urlencoding::encode(id))
}
