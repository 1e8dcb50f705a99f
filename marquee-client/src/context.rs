//! Application wiring: one HTTP client shared by every state container.

use log::{info, warn};
use std::sync::Arc;

use marquee_model::UserProfile;

use crate::api_client::ApiClient;
use crate::config::ClientConfig;
use crate::domains::{FavoritesStore, MovieCatalog, MovieDetailLoader, PersonDetailLoader, Session};
use crate::error::ClientResult;
use crate::services::{AccountApi, CatalogApi};
use crate::storage::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Every state container of the client, built over the same services.
#[derive(Debug)]
pub struct AppContext {
    pub session: Session,
    pub catalog: MovieCatalog,
    pub favorites: FavoritesStore,
    pub movie_detail: MovieDetailLoader,
    pub person_detail: PersonDetailLoader,
}

impl AppContext {
    /// HTTP-backed context. The session is persisted to `token_path` when set.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let client = Arc::new(ApiClient::new(config)?);
        let store: Arc<dyn TokenStore> = match &config.token_path {
            Some(path) => Arc::new(FileTokenStore::new(path.clone())),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Ok(Self::with_services(
            client.clone(),
            client,
            store,
            config.page_size,
        ))
    }

    pub fn with_services(
        catalog_api: Arc<dyn CatalogApi>,
        account_api: Arc<dyn AccountApi>,
        store: Arc<dyn TokenStore>,
        page_size: u32,
    ) -> Self {
        Self {
            session: Session::new(account_api.clone(), store),
            catalog: MovieCatalog::new(catalog_api.clone(), page_size),
            favorites: FavoritesStore::new(account_api),
            movie_detail: MovieDetailLoader::new(catalog_api.clone()),
            person_detail: PersonDetailLoader::new(catalog_api, page_size),
        }
    }

    /// Restore the stored session and load its favorites.
    pub async fn start(&self) -> ClientResult<Option<UserProfile>> {
        let user = self.session.restore().await?;
        if user.is_some()
            && let Err(e) = self.favorites.refresh().await
        {
            warn!("[AppContext] Favorites unavailable after restore: {}", e);
        }
        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<UserProfile> {
        let user = self.session.login(username, password).await?;
        if let Err(e) = self.favorites.refresh().await {
            warn!("[AppContext] Favorites unavailable after login: {}", e);
        }
        Ok(user)
    }

    /// Sign out and drop everything cached for the previous user.
    pub async fn logout(&self) -> ClientResult<()> {
        self.session.logout().await?;
        self.favorites.clear();
        self.catalog.clear();
        self.movie_detail.clear();
        self.person_detail.clear();
        info!("[AppContext] Cleared cached state");
        Ok(())
    }
}
