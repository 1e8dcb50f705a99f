//! People: actors, directors and writers.

use serde::{Deserialize, Serialize};

use crate::identity::{EntityKey, Identified, Identity};
use crate::movie::MovieSummary;
use crate::wire::{lenient_string, null_as_default};

/// Person as listed by the persons collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonSummary {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: Option<String>,
}

impl Identified for PersonSummary {
    fn entity_key(&self) -> Option<EntityKey> {
        self.identity.key().cloned()
    }
}

/// A movie the person is known for, with the part they played.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnownFor {
    #[serde(flatten)]
    pub movie: MovieSummary,
    #[serde(default, deserialize_with = "lenient_string")]
    pub character: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: Option<String>,
}

impl Identified for KnownFor {
    fn entity_key(&self) -> Option<EntityKey> {
        self.movie.entity_key()
    }
}

/// Full person record returned by the detail endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonDetails {
    #[serde(flatten)]
    pub person: PersonSummary,
    /// Biography text (`summary` on the wire).
    #[serde(rename = "summary", default, deserialize_with = "lenient_string")]
    pub biography: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub birth_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub death_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub height: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub known_for: Vec<KnownFor>,
}

impl Identified for PersonDetails {
    fn entity_key(&self) -> Option<EntityKey> {
        self.person.entity_key()
    }
}
