use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use marquee_model::{
    AuthSession, EntityKey, Identity, LoginRequest, MovieDetails, MovieSummary, Page,
    PageRequest, Pagination, PersonDetails, PersonSummary, ProfileUpdate, RegisterRequest, Review,
    UserProfile,
};

use crate::error::{ClientError, ClientResult};
use crate::services::{AccountApi, CatalogApi, SearchParams};

fn http(status: u16, message: &str) -> ClientError {
    ClientError::Http {
        status,
        message: message.to_string(),
    }
}

/// Catalog operation recorded by [`StubCatalogApi`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogCall {
    Movies,
    Popular,
    TopRated,
    Search,
    Movie,
    Reviews,
    Persons,
    Person,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub call: CatalogCall,
    pub page: Option<PageRequest>,
    pub category: Option<String>,
    pub params: Option<SearchParams>,
    pub id: Option<EntityKey>,
}

impl RecordedRequest {
    fn new(call: CatalogCall) -> Self {
        Self {
            call,
            page: None,
            category: None,
            params: None,
            id: None,
        }
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    listing: Vec<MovieSummary>,
    search_pages: Option<Vec<Vec<MovieSummary>>>,
    failing_pages: HashSet<u32>,
    movies: HashMap<EntityKey, MovieDetails>,
    reviews: HashMap<EntityKey, Vec<Review>>,
    persons: BTreeMap<EntityKey, PersonDetails>,
    delays: HashMap<EntityKey, Duration>,
    review_delays: HashMap<EntityKey, Duration>,
    requests: Vec<RecordedRequest>,
}

/// Scripted catalog.
///
/// Every listing (browse, popular, top-rated and, unless scripted separately,
/// search) pages through the same `listing`. Pages marked failing answer
/// with a 500 on every listing.
#[derive(Debug, Clone, Default)]
pub struct StubCatalogApi {
    inner: Arc<RwLock<CatalogState>>,
}

impl StubCatalogApi {
    /// Listing of `count` movies with ids `tt0001`, `tt0002`, ...
    pub fn with_listing(count: u32) -> Self {
        let movies = (1..=count)
            .map(|i| MovieSummary::new(format!("tt{i:04}"), format!("Movie {i}")))
            .collect();
        Self::default().listing(movies)
    }

    pub fn listing(self, movies: Vec<MovieSummary>) -> Self {
        self.inner.write().listing = movies;
        self
    }

    /// Search answers page `n` with `pages[n - 1]`, and an empty page beyond.
    pub fn search_pages(self, pages: Vec<Vec<MovieSummary>>) -> Self {
        self.inner.write().search_pages = Some(pages);
        self
    }

    pub fn failing_page(self, page: u32) -> Self {
        self.inner.write().failing_pages.insert(page);
        self
    }

    pub fn movie(self, movie: MovieDetails) -> Self {
        if let Some(key) = movie.summary.key().cloned() {
            self.inner.write().movies.insert(key, movie);
        }
        self
    }

    pub fn reviews(self, movie_id: &str, reviews: Vec<Review>) -> Self {
        self.inner
            .write()
            .reviews
            .insert(EntityKey::new(movie_id), reviews);
        self
    }

    pub fn person(self, person: PersonDetails) -> Self {
        if let Some(key) = person.person.identity.key().cloned() {
            self.inner.write().persons.insert(key, person);
        }
        self
    }

    /// Delay movie and review answers for `id`.
    pub fn delay(self, id: &str, delay: Duration) -> Self {
        self.inner.write().delays.insert(EntityKey::new(id), delay);
        self
    }

    /// Delay only the review answers for `movie_id`, on top of [`Self::delay`].
    pub fn delay_reviews(self, movie_id: &str, delay: Duration) -> Self {
        self.inner
            .write()
            .review_delays
            .insert(EntityKey::new(movie_id), delay);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.read().requests.clone()
    }

    pub fn request_count(&self, call: CatalogCall) -> usize {
        self.inner
            .read()
            .requests
            .iter()
            .filter(|r| r.call == call)
            .count()
    }

    fn record(&self, request: RecordedRequest) {
        self.inner.write().requests.push(request);
    }

    fn listing_page(&self, page: PageRequest) -> ClientResult<Page<MovieSummary>> {
        let state = self.inner.read();
        if state.failing_pages.contains(&page.page) {
            return Err(http(500, "HTTP error: 500"));
        }
        Ok(slice(&state.listing, page))
    }

    async fn wait_for(&self, id: &EntityKey) {
        let delay = self.inner.read().delays.get(id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn slice<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    let limit = page.limit as usize;
    let start = (page.page as usize).saturating_sub(1).saturating_mul(limit);
    let data = items.iter().skip(start).take(limit).cloned().collect();
    Page::new(data).with_pagination(Pagination {
        current_page: Some(page.page),
        total_pages: Some(items.len().div_ceil(limit) as u32),
        total_items: Some(items.len() as u64),
    })
}

#[async_trait]
impl CatalogApi for StubCatalogApi {
    async fn movies(&self, page: PageRequest) -> ClientResult<Page<MovieSummary>> {
        self.record(RecordedRequest {
            page: Some(page),
            ..RecordedRequest::new(CatalogCall::Movies)
        });
        self.listing_page(page)
    }

    async fn popular_movies(&self, page: PageRequest) -> ClientResult<Page<MovieSummary>> {
        self.record(RecordedRequest {
            page: Some(page),
            ..RecordedRequest::new(CatalogCall::Popular)
        });
        self.listing_page(page)
    }

    async fn top_rated_movies(
        &self,
        category: &str,
        page: PageRequest,
    ) -> ClientResult<Page<MovieSummary>> {
        self.record(RecordedRequest {
            page: Some(page),
            category: Some(category.to_string()),
            ..RecordedRequest::new(CatalogCall::TopRated)
        });
        self.listing_page(page)
    }

    async fn search_movies(
        &self,
        params: &SearchParams,
        page: PageRequest,
    ) -> ClientResult<Page<MovieSummary>> {
        self.record(RecordedRequest {
            page: Some(page),
            params: Some(params.clone()),
            ..RecordedRequest::new(CatalogCall::Search)
        });
        let scripted = self.inner.read().search_pages.clone();
        match scripted {
            Some(pages) => {
                if self.inner.read().failing_pages.contains(&page.page) {
                    return Err(http(500, "HTTP error: 500"));
                }
                let index = (page.page as usize).saturating_sub(1);
                Ok(Page::new(pages.get(index).cloned().unwrap_or_default()))
            }
            None => self.listing_page(page),
        }
    }

    async fn movie(&self, id: &EntityKey) -> ClientResult<MovieDetails> {
        self.record(RecordedRequest {
            id: Some(id.clone()),
            ..RecordedRequest::new(CatalogCall::Movie)
        });
        self.wait_for(id).await;
        self.inner
            .read()
            .movies
            .get(id)
            .cloned()
            .ok_or_else(|| http(404, "Movie not found"))
    }

    async fn reviews(&self, movie_id: &EntityKey) -> ClientResult<Page<Review>> {
        self.record(RecordedRequest {
            id: Some(movie_id.clone()),
            ..RecordedRequest::new(CatalogCall::Reviews)
        });
        self.wait_for(movie_id).await;
        let extra = self.inner.read().review_delays.get(movie_id).copied();
        if let Some(extra) = extra {
            tokio::time::sleep(extra).await;
        }
        let reviews = self
            .inner
            .read()
            .reviews
            .get(movie_id)
            .cloned()
            .unwrap_or_default();
        Ok(Page::new(reviews))
    }

    async fn persons(&self, params: &SearchParams) -> ClientResult<Page<PersonSummary>> {
        self.record(RecordedRequest {
            params: Some(params.clone()),
            ..RecordedRequest::new(CatalogCall::Persons)
        });
        let needle = params.get("q").map(str::to_lowercase);
        let people = self
            .inner
            .read()
            .persons
            .values()
            .map(|p| p.person.clone())
            .filter(|p| {
                needle
                    .as_deref()
                    .is_none_or(|n| p.name.to_lowercase().contains(n))
            })
            .collect();
        Ok(Page::new(people))
    }

    async fn person(&self, id: &EntityKey) -> ClientResult<PersonDetails> {
        self.record(RecordedRequest {
            id: Some(id.clone()),
            ..RecordedRequest::new(CatalogCall::Person)
        });
        self.inner
            .read()
            .persons
            .get(id)
            .cloned()
            .ok_or_else(|| http(404, "Person not found"))
    }
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    profile: UserProfile,
}

#[derive(Debug, Default)]
struct AccountState {
    accounts: BTreeMap<String, Account>,
    token: Option<String>,
    favorites: Vec<MovieSummary>,
    known_movies: HashMap<EntityKey, MovieSummary>,
    failing_favorites: bool,
    failing_logout: bool,
    calls: Vec<&'static str>,
}

impl AccountState {
    fn token_for(username: &str) -> String {
        format!("token-{username}")
    }

    fn signed_in(&self) -> ClientResult<String> {
        let token = self.token.as_deref().ok_or(ClientError::LoginRequired)?;
        self.accounts
            .keys()
            .find(|name| Self::token_for(name) == token)
            .cloned()
            .ok_or_else(|| http(401, "Invalid token"))
    }
}

/// Scripted account service with its own user table and favorites list.
///
/// Tokens are `token-{username}`. Calls that need a token fail with
/// [`ClientError::LoginRequired`] before they are recorded, matching the HTTP
/// client which never sends them.
#[derive(Debug, Clone, Default)]
pub struct StubAccountApi {
    inner: Arc<RwLock<AccountState>>,
}

impl StubAccountApi {
    pub fn with_user(self, username: &str, password: &str) -> Self {
        let profile = UserProfile {
            identity: Identity::new(format!("u-{username}")),
            username: username.to_string(),
            email: Some(format!("{username}@example.com")),
            ..UserProfile::default()
        };
        self.inner.write().accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                profile,
            },
        );
        self
    }

    /// Server-side favorites of whoever signs in.
    pub fn with_favorites(self, movies: Vec<MovieSummary>) -> Self {
        self.inner.write().favorites = movies;
        self
    }

    /// Movies the server knows, returned in favorites after being added.
    pub fn with_movies(self, movies: Vec<MovieSummary>) -> Self {
        let mut state = self.inner.write();
        for movie in movies {
            if let Some(key) = movie.key().cloned() {
                state.known_movies.insert(key, movie);
            }
        }
        drop(state);
        self
    }

    pub fn failing_favorites(self) -> Self {
        self.inner.write().failing_favorites = true;
        self
    }

    pub fn failing_logout(self) -> Self {
        self.inner.write().failing_logout = true;
        self
    }

    /// Names of the calls that reached the server, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.inner.read().calls.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.read().token.clone()
    }

    pub fn server_favorites(&self) -> Vec<MovieSummary> {
        self.inner.read().favorites.clone()
    }
}

#[async_trait]
impl AccountApi for StubAccountApi {
    async fn register(&self, request: &RegisterRequest) -> ClientResult<()> {
        let mut state = self.inner.write();
        state.calls.push("register");
        if state.accounts.contains_key(&request.username) {
            return Err(http(409, "Username already exists"));
        }
        let profile = UserProfile {
            identity: Identity::new(format!("u-{}", request.username)),
            username: request.username.clone(),
            email: Some(request.email.clone()),
            phone: request.phone.clone(),
            dob: request.dob.clone(),
            role: Some("user".into()),
        };
        state.accounts.insert(
            request.username.clone(),
            Account {
                password: request.password.clone(),
                profile,
            },
        );
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> ClientResult<AuthSession> {
        let mut state = self.inner.write();
        state.calls.push("login");
        match state.accounts.get(&request.username) {
            Some(account) if account.password == request.password => Ok(AuthSession {
                user: account.profile.clone(),
                token: AccountState::token_for(&request.username),
            }),
            _ => Err(http(401, "Invalid username or password")),
        }
    }

    async fn logout(&self) -> ClientResult<()> {
        let mut state = self.inner.write();
        if state.token.is_none() {
            return Ok(());
        }
        state.calls.push("logout");
        if state.failing_logout {
            return Err(http(500, "HTTP error: 500"));
        }
        Ok(())
    }

    async fn profile(&self) -> ClientResult<UserProfile> {
        let mut state = self.inner.write();
        let username = state.signed_in()?;
        state.calls.push("profile");
        state
            .accounts
            .get(&username)
            .map(|a| a.profile.clone())
            .ok_or_else(|| http(404, "User not found"))
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<()> {
        let mut state = self.inner.write();
        let username = state.signed_in()?;
        state.calls.push("update_profile");
        let account = state
            .accounts
            .get_mut(&username)
            .ok_or_else(|| http(404, "User not found"))?;
        let profile = &mut account.profile;
        if let Some(email) = &update.email {
            profile.email = Some(email.clone());
        }
        if let Some(phone) = &update.phone {
            profile.phone = Some(phone.clone());
        }
        if let Some(dob) = &update.dob {
            profile.dob = Some(dob.clone());
        }
        if let Some(name) = &update.username {
            profile.username = name.clone();
        }
        Ok(())
    }

    async fn set_token(&self, token: Option<String>) {
        self.inner.write().token = token;
    }

    async fn has_token(&self) -> bool {
        self.inner.read().token.is_some()
    }

    async fn favorites(&self) -> ClientResult<Vec<MovieSummary>> {
        let mut state = self.inner.write();
        if state.token.is_none() {
            return Ok(Vec::new());
        }
        state.signed_in()?;
        state.calls.push("favorites");
        if state.failing_favorites {
            return Err(http(500, "HTTP error: 500"));
        }
        Ok(state.favorites.clone())
    }

    async fn add_favorite(&self, movie_id: &EntityKey) -> ClientResult<()> {
        let mut state = self.inner.write();
        state.signed_in()?;
        state.calls.push("add_favorite");
        if state.failing_favorites {
            return Err(http(500, "HTTP error: 500"));
        }
        if state.favorites.iter().any(|m| m.key() == Some(movie_id)) {
            return Err(http(400, "Movie already in favorites"));
        }
        let movie = state
            .known_movies
            .get(movie_id)
            .cloned()
            .unwrap_or_else(|| MovieSummary::new(movie_id.clone(), String::new()));
        state.favorites.push(movie);
        Ok(())
    }

    async fn remove_favorite(&self, movie_id: &EntityKey) -> ClientResult<()> {
        let mut state = self.inner.write();
        state.signed_in()?;
        state.calls.push("remove_favorite");
        if state.failing_favorites {
            return Err(http(500, "HTTP error: 500"));
        }
        let before = state.favorites.len();
        state.favorites.retain(|m| m.key() != Some(movie_id));
        if state.favorites.len() == before {
            return Err(http(404, "Favorite not found"));
        }
        Ok(())
    }
}
