//! Movie schemas.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::identity::{EntityKey, Identified, Identity};
use crate::review::Review;
use crate::wire::{lenient_f64, lenient_i32, lenient_string, null_as_default};

/// Category used by the top-rated listing when the caller does not pick one.
pub const DEFAULT_TOP_RATED_CATEGORY: &str = "IMDB_TOP_50";

/// Movie as it appears in listings, search results and favorites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub short_description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<String>,
}

impl MovieSummary {
    /// Minimal summary, mostly useful for fixtures.
    pub fn new(id: impl Into<EntityKey>, title: impl Into<String>) -> Self {
        Self {
            identity: Identity::new(id),
            title: title.into(),
            ..Self::default()
        }
    }

    /// `id`, falling back to `_id`.
    pub fn key(&self) -> Option<&EntityKey> {
        self.identity.key()
    }
}

impl Identified for MovieSummary {
    fn entity_key(&self) -> Option<EntityKey> {
        self.identity.key().cloned()
    }
}

/// Person credited on a movie (actor or director).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub character: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: Option<String>,
}

impl Identified for Credit {
    fn entity_key(&self) -> Option<EntityKey> {
        self.identity.key().cloned()
    }
}

/// Box office figures, passed through as display strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxOffice {
    #[serde(default, deserialize_with = "lenient_string")]
    pub budget: Option<String>,
    #[serde(
        rename = "openingWeekendUSA",
        default,
        deserialize_with = "lenient_string"
    )]
    pub opening_weekend_usa: Option<String>,
    #[serde(rename = "grossUSA", default, deserialize_with = "lenient_string")]
    pub gross_usa: Option<String>,
    #[serde(
        rename = "cumulativeWorldwideGross",
        default,
        deserialize_with = "lenient_string"
    )]
    pub cumulative_worldwide_gross: Option<String>,
}

/// Full movie record returned by the detail endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub summary: MovieSummary,
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub runtime: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub plot_full: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub awards: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub countries: Vec<String>,
    /// Rating source to score, e.g. `imDb` to `8.6`; values are kept raw.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ratings: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub box_office: Option<BoxOffice>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub directors: Vec<Credit>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actors: Vec<Credit>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub similar_movies: Vec<MovieSummary>,
    /// Reviews embedded in the detail payload; the reviews endpoint is authoritative.
    #[serde(default, deserialize_with = "null_as_default")]
    pub reviews: Vec<Review>,
}

impl Identified for MovieDetails {
    fn entity_key(&self) -> Option<EntityKey> {
        self.summary.entity_key()
    }
}
