//! Movie reviews.

use serde::{Deserialize, Serialize};

use crate::identity::{EntityKey, Identified, Identity};
use crate::wire::{lenient_f64, lenient_string};

/// A user review of a movie.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    /// Score out of 10.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rate: Option<f64>,
    /// Display name of the reviewer.
    #[serde(default, deserialize_with = "lenient_string")]
    pub user: Option<String>,
    /// Review date exactly as the server formats it.
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
}

impl Review {
    /// Reviews scored 7 or higher.
    pub fn is_positive(&self) -> bool {
        self.rate.is_some_and(|r| r >= 7.0)
    }
}

impl Identified for Review {
    fn entity_key(&self) -> Option<EntityKey> {
        self.identity.key().cloned()
    }
}
