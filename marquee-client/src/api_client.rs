use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tokio::sync::RwLock;

use marquee_model::{
    AuthSession, EntityKey, LoginRequest, MovieDetails, MovieSummary, Page, PageRequest,
    PersonDetails, PersonSummary, ProfileUpdate, RegisterRequest, Review, UserProfile,
    routes::{self, movies, persons, users},
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::services::{AccountApi, CatalogApi, SearchParams};

const APP_TOKEN_HEADER: &str = "x-app-token";

/// Which bearer token a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Catalog and auth routes: the app token.
    App,
    /// Routes acting on the signed-in user: the user token.
    User,
}

/// HTTP client for the catalog API.
///
/// Cloning is cheap; clones share the connection pool and the user token.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    app_token: Option<Arc<str>>,
    token_store: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_app_token", &self.app_token.is_some())
            .field(
                "has_token",
                &self
                    .token_store
                    .try_read()
                    .map(|t| t.is_some())
                    .unwrap_or(false),
            )
            .finish()
    }
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        info!(
            "[ApiClient] Creating new API client with base URL: {}",
            config.base_url
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_token: config.app_token.as_deref().map(Arc::from),
            token_store: Arc::new(RwLock::new(None)),
        })
    }

    /// Absolute URL for a route path.
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let p = path.as_ref();
        if p.starts_with("http://") || p.starts_with("https://") {
            return p.to_string();
        }
        format!("{}/{}", self.base_url, p.trim_start_matches('/'))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_token(&self) -> Option<String> {
        self.token_store.read().await.clone()
    }

    /// Token for a user-scoped call, or `LoginRequired` before anything is sent.
    async fn require_token(&self) -> ClientResult<String> {
        self.get_token().await.ok_or(ClientError::LoginRequired)
    }

    /// Attach the app token header and the bearer token for `scope`.
    fn authorize(
        &self,
        builder: RequestBuilder,
        scope: Scope,
        user_token: Option<&str>,
    ) -> RequestBuilder {
        let builder = match self.app_token.as_deref() {
            Some(app) => builder.header(APP_TOKEN_HEADER, app),
            None => builder,
        };
        let bearer = match scope {
            Scope::User => user_token,
            Scope::App => self.app_token.as_deref(),
        };
        match bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request. `Ok(None)` means a successful response without a body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> ClientResult<Option<T>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = ClientError::from_response(status.as_u16(), &body);
            debug!("[ApiClient] Request failed with status {}: {}", status, err);
            return Err(err);
        }

        if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
        scope: Scope,
    ) -> ClientResult<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let user_token = match scope {
            Scope::User => Some(self.require_token().await?),
            Scope::App => None,
        };

        let url = self.build_url(path);
        debug!("[ApiClient] {} {} {:?}", method, url, query);

        let mut request = self.client.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let request = self.authorize(request, scope, user_token.as_deref());
        self.execute(request).await
    }

    /// GET that must return a body.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        scope: Scope,
    ) -> ClientResult<T> {
        self.send::<T, ()>(Method::GET, path, query, None, scope)
            .await?
            .ok_or(ClientError::EmptyResponse)
    }

    /// GET of a listing; an empty body is an empty page.
    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        scope: Scope,
    ) -> ClientResult<Page<T>> {
        Ok(self
            .send::<Page<T>, ()>(Method::GET, path, query, None, scope)
            .await?
            .unwrap_or_default())
    }

    /// Request whose response body, if any, is not needed.
    async fn send_discarding<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        scope: Scope,
    ) -> ClientResult<()> {
        self.send::<serde_json::Value, B>(method, path, &[], body, scope)
            .await
            .map(|_| ())
    }
}

fn paging(page: PageRequest) -> Vec<(String, String)> {
    page.query_pairs()
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[async_trait]
impl CatalogApi for ApiClient {
    async fn movies(&self, page: PageRequest) -> ClientResult<Page<MovieSummary>> {
        self.get_page(movies::COLLECTION, &paging(page), Scope::App)
            .await
    }

    async fn popular_movies(&self, page: PageRequest) -> ClientResult<Page<MovieSummary>> {
        self.get_page(movies::MOST_POPULAR, &paging(page), Scope::App)
            .await
    }

    async fn top_rated_movies(
        &self,
        category: &str,
        page: PageRequest,
    ) -> ClientResult<Page<MovieSummary>> {
        let query = SearchParams::new()
            .with("category", category)
            .with_page(page);
        self.get_page(movies::TOP_RATED, &query, Scope::App).await
    }

    async fn search_movies(
        &self,
        params: &SearchParams,
        page: PageRequest,
    ) -> ClientResult<Page<MovieSummary>> {
        self.get_page(movies::SEARCH, &params.with_page(page), Scope::App)
            .await
    }

    async fn movie(&self, id: &EntityKey) -> ClientResult<MovieDetails> {
        self.get(&routes::with_id(movies::ITEM, id.as_str()), &[], Scope::App)
            .await
    }

    async fn reviews(&self, movie_id: &EntityKey) -> ClientResult<Page<Review>> {
        self.get_page(
            &routes::with_id(movies::REVIEWS, movie_id.as_str()),
            &[],
            Scope::App,
        )
        .await
    }

    async fn persons(&self, params: &SearchParams) -> ClientResult<Page<PersonSummary>> {
        self.get_page(persons::COLLECTION, &params.to_pairs(), Scope::App)
            .await
    }

    async fn person(&self, id: &EntityKey) -> ClientResult<PersonDetails> {
        self.get(&routes::with_id(persons::ITEM, id.as_str()), &[], Scope::App)
            .await
    }
}

#[async_trait]
impl AccountApi for ApiClient {
    async fn register(&self, request: &RegisterRequest) -> ClientResult<()> {
        self.send_discarding(Method::POST, users::REGISTER, Some(request), Scope::App)
            .await
    }

    async fn login(&self, request: &LoginRequest) -> ClientResult<AuthSession> {
        self.send::<AuthSession, _>(
            Method::POST,
            users::LOGIN,
            &[],
            Some(request),
            Scope::App,
        )
        .await?
        .ok_or(ClientError::EmptyResponse)
    }

    async fn logout(&self) -> ClientResult<()> {
        if self.get_token().await.is_none() {
            debug!("[ApiClient] No user token, skipping logout request");
            return Ok(());
        }
        self.send_discarding::<()>(Method::POST, users::LOGOUT, None, Scope::User)
            .await
    }

    async fn profile(&self) -> ClientResult<UserProfile> {
        self.get(users::PROFILE, &[], Scope::User).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<()> {
        self.send_discarding(Method::PATCH, users::PROFILE, Some(update), Scope::User)
            .await
    }

    async fn set_token(&self, token: Option<String>) {
        *self.token_store.write().await = token;
    }

    async fn has_token(&self) -> bool {
        self.token_store.read().await.is_some()
    }

    async fn favorites(&self) -> ClientResult<Vec<MovieSummary>> {
        if !self.has_token().await {
            return Ok(Vec::new());
        }
        let page: Page<MovieSummary> = self
            .get_page(users::FAVORITES, &[], Scope::User)
            .await?;
        Ok(page.into_items())
    }

    async fn add_favorite(&self, movie_id: &EntityKey) -> ClientResult<()> {
        let path = routes::with_id(users::FAVORITE_ITEM, movie_id.as_str());
        self.send_discarding::<()>(Method::POST, &path, None, Scope::User)
            .await
    }

    async fn remove_favorite(&self, movie_id: &EntityKey) -> ClientResult<()> {
        let path = routes::with_id(users::FAVORITE_ITEM, movie_id.as_str());
        self.send_discarding::<()>(Method::DELETE, &path, None, Scope::User)
            .await
    }
}
