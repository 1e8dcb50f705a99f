//! Favorites of the signed-in user.

use log::{debug, warn};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

use marquee_model::{EntityKey, MovieSummary};

use crate::error::{ClientError, ClientResult};
use crate::services::AccountApi;

/// Ordered favorites list with a key set for membership checks.
///
/// The two are only mutated together, so every listed movie with a key is in
/// the set and nothing else is.
#[derive(Debug, Clone, Default)]
pub struct FavoriteIndex {
    movies: Vec<MovieSummary>,
    keys: HashSet<EntityKey>,
}

impl FavoriteIndex {
    pub fn from_movies(movies: Vec<MovieSummary>) -> Self {
        let mut index = Self::default();
        for movie in movies {
            index.insert(movie);
        }
        index
    }

    /// Append `movie` unless it is already present. Keyless movies are kept
    /// in the list but can never be looked up.
    pub fn insert(&mut self, movie: MovieSummary) -> bool {
        if let Some(key) = movie.key()
            && !self.keys.insert(key.clone())
        {
            return false;
        }
        self.movies.push(movie);
        true
    }

    pub fn remove(&mut self, key: &EntityKey) -> bool {
        if !self.keys.remove(key) {
            return false;
        }
        self.movies.retain(|movie| movie.key() != Some(key));
        true
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.keys.contains(key)
    }

    pub fn movies(&self) -> &[MovieSummary] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

/// Client-side cache of the user's favorites.
///
/// Local state changes only after the server accepted the change.
#[derive(Debug)]
pub struct FavoritesStore {
    api: Arc<dyn AccountApi>,
    index: RwLock<FavoriteIndex>,
    error: RwLock<Option<String>>,
}

impl FavoritesStore {
    pub fn new(api: Arc<dyn AccountApi>) -> Self {
        Self {
            api,
            index: RwLock::new(FavoriteIndex::default()),
            error: RwLock::new(None),
        }
    }

    /// Reload from the server. Signed out, the cache is emptied without a request.
    pub async fn refresh(&self) -> ClientResult<()> {
        *self.error.write() = None;
        if !self.api.has_token().await {
            self.clear();
            return Ok(());
        }

        match self.api.favorites().await {
            Ok(movies) => {
                debug!("[FavoritesStore] Loaded {} favorites", movies.len());
                *self.index.write() = FavoriteIndex::from_movies(movies);
                Ok(())
            }
            Err(e) => {
                warn!("[FavoritesStore] Failed to load favorites: {}", e);
                *self.index.write() = FavoriteIndex::default();
                *self.error.write() = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn is_favorite(&self, id: &EntityKey) -> bool {
        self.index.read().contains(id)
    }

    pub async fn add(&self, movie: &MovieSummary) -> ClientResult<()> {
        *self.error.write() = None;
        let key = movie
            .key()
            .cloned()
            .ok_or_else(|| ClientError::InvalidRequest("movie has no id".into()))?;

        self.api
            .add_favorite(&key)
            .await
            .inspect_err(|e| self.record("add", &key, e))?;
        self.index.write().insert(movie.clone());
        Ok(())
    }

    pub async fn remove(&self, id: &EntityKey) -> ClientResult<()> {
        *self.error.write() = None;
        self.api
            .remove_favorite(id)
            .await
            .inspect_err(|e| self.record("remove", id, e))?;
        self.index.write().remove(id);
        Ok(())
    }

    /// Add or remove `movie`; returns whether it is a favorite afterwards.
    pub async fn toggle(&self, movie: &MovieSummary) -> ClientResult<bool> {
        match movie.key() {
            Some(key) if self.is_favorite(key) => {
                self.remove(key).await?;
                Ok(false)
            }
            _ => {
                self.add(movie).await?;
                Ok(true)
            }
        }
    }

    fn record(&self, action: &str, id: &EntityKey, err: &ClientError) {
        warn!("[FavoritesStore] Failed to {} favorite {}: {}", action, id, err);
        *self.error.write() = Some(err.to_string());
    }

    pub fn favorites(&self) -> Vec<MovieSummary> {
        self.index.read().movies().to_vec()
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    pub fn error(&self) -> Option<String> {
        self.error.read().clone()
    }

    pub fn clear(&self) {
        *self.index.write() = FavoriteIndex::default();
        *self.error.write() = None;
    }
}
