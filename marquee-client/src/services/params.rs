use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use marquee_model::PageRequest;

/// Free-form query parameters for search and person listings.
///
/// Keys are sorted so that identical criteria always produce identical query
/// strings. `page` and `limit` are owned by the aggregators: [`Self::with_page`]
/// overrides whatever the caller put there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchParams(BTreeMap<String, String>);

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-text keyword (`q`).
    pub fn keyword(self, keyword: impl Into<String>) -> Self {
        self.with("q", keyword)
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.with("title", title)
    }

    pub fn genre(self, genre: impl Into<String>) -> Self {
        self.with("genre", genre)
    }

    /// Actor or director name.
    pub fn person(self, person: impl Into<String>) -> Self {
        self.with("person", person)
    }

    /// Arbitrary parameter. Blank values are dropped.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.0.remove(&key);
        } else {
            self.0.insert(key, value.trim().to_string());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// True when at least one search criterion is set; paging keys do not count.
    pub fn has_criteria(&self) -> bool {
        self.0.keys().any(|k| k != "page" && k != "limit")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Query pairs for one page: the criteria with `page` and `limit` set from `page`.
    pub fn with_page(&self, page: PageRequest) -> Vec<(String, String)> {
        let mut merged = self.0.clone();
        for (key, value) in page.query_pairs() {
            merged.insert(key.to_string(), value);
        }
        merged.into_iter().collect()
    }

    /// Query pairs without paging.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Human-readable summary such as `title: Up • genre: Animation`.
    pub fn describe(&self) -> String {
        self.0
            .iter()
            .filter(|(k, _)| k.as_str() != "page" && k.as_str() != "limit")
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(" • ")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(SearchParams::new(), |params, (k, v)| params.with(k, v))
    }
}
