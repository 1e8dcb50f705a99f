use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use marquee_client::domains::{FavoritesStore, MovieCatalog, Session};
use marquee_client::services::{AccountApi, CatalogApi, SearchParams};
use marquee_client::storage::MemoryTokenStore;
use marquee_client::{ApiClient, ClientConfig, ClientError};
use marquee_model::{EntityKey, MovieSummary, PageRequest};

const APP_TOKEN: &str = "app-secret";
const USER_TOKEN: &str = "user-secret";

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    authorization: Option<String>,
    app_token: Option<String>,
    body: String,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn numbered(ids: impl IntoIterator<Item = u32>) -> Value {
    Value::Array(
        ids.into_iter()
            .map(|id| json!({ "id": id, "title": format!("Movie {id}"), "rate": "7.5" }))
            .collect(),
    )
}

fn page_query(query: &HashMap<String, String>) -> (u32, u32) {
    let page = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    (page, limit)
}

/// Fake catalog server answering by method and path.
async fn handle(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    let path = uri.path().to_string();
    log.lock().push(Seen {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        authorization: header("authorization"),
        app_token: header("x-app-token"),
        body,
    });

    let user_bearer = format!("Bearer {USER_TOKEN}");
    let signed_in = header("authorization").as_deref() == Some(user_bearer.as_str());
    let ok = |value: Value| (StatusCode::OK, value.to_string());

    match (method.as_str(), path.as_str()) {
        ("GET", "/api/movies/most-popular") => {
            let (page, limit) = page_query(&query);
            let start = (page - 1) * limit + 1;
            let end = (start + limit - 1).min(30);
            ok(json!({
                "data": numbered(start..=end),
                "pagination": { "current_page": page, "total_pages": 3, "total_items": 30 }
            }))
        }
        ("GET", "/api/movies/top-rated") => {
            let (page, limit) = page_query(&query);
            let start = (page - 1) * limit + 1;
            ok(numbered(start..start + limit))
        }
        ("GET", "/api/movies/search") => match page_query(&query).0 {
            1 => ok(json!({ "data": numbered(1..=10) })),
            2 => ok(json!({ "data": numbered((1..=10).chain(11..=15)) })),
            _ => ok(json!({ "data": [] })),
        },
        ("GET", "/api/movies/tt0113277") => ok(json!({
            "_id": "tt0113277",
            "title": "Heat",
            "year": "1995",
            "rate": "8.3",
            "genres": ["Crime", "Drama"],
            "directors": [{ "id": "nm0000520", "name": "Michael Mann" }]
        })),
        ("GET", "/api/movies/tt0113277/reviews") => ok(json!({
            "data": [{ "id": "r1", "rate": 9, "title": "Classic" }]
        })),
        ("GET", "/api/movies/missing") => (
            StatusCode::NOT_FOUND,
            json!({ "message": "Movie not found" }).to_string(),
        ),
        ("GET", "/api/movies/weird") => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "boom" }).to_string(),
        ),
        ("GET", "/api/movies/broken") => (
            StatusCode::BAD_GATEWAY,
            "<html>Bad Gateway</html>".into(),
        ),
        ("GET", "/api/persons") => ok(json!([{ "id": "nm0000520", "name": "Michael Mann" }])),
        ("POST", "/api/users/login") => ok(json!({
            "user": { "_id": "u1", "username": "ada", "email": "ada@example.com" },
            "token": USER_TOKEN
        })),
        (_, p) if p.starts_with("/api/users/") && !signed_in => (
            StatusCode::UNAUTHORIZED,
            json!({ "message": "Unauthorized" }).to_string(),
        ),
        ("GET", "/api/users/favorites") => ok(json!([{ "_id": "tt0113277", "title": "Heat" }])),
        ("POST", "/api/users/favorites/tt0110912") => (StatusCode::NO_CONTENT, String::new()),
        ("DELETE", "/api/users/favorites/tt0113277") => ok(json!({ "message": "Removed" })),
        ("GET", "/api/users/profile") => ok(json!({
            "_id": "u1",
            "username": "ada",
            "phone": "555"
        })),
        ("PATCH", "/api/users/profile") => ok(json!({ "message": "Updated" })),
        ("POST", "/api/users/logout") => (StatusCode::NO_CONTENT, String::new()),
        _ => (
            StatusCode::NOT_FOUND,
            json!({ "message": format!("No route {path}") }).to_string(),
        ),
    }
}

async fn spawn_server() -> (String, Log) {
    let log: Log = Arc::default();
    let app = Router::new().fallback(handle).with_state(log.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), log)
}

fn client(base_url: &str) -> Arc<ApiClient> {
    let config = ClientConfig::new(base_url).unwrap().with_app_token(APP_TOKEN);
    Arc::new(ApiClient::new(&config).unwrap())
}

fn requests_to(log: &Log, path: &str) -> Vec<Seen> {
    log.lock().iter().filter(|s| s.path == path).cloned().collect()
}

#[tokio::test]
async fn popular_movies_fan_out_with_app_credentials() {
    let (url, log) = spawn_server().await;
    let catalog = MovieCatalog::new(client(&url), 10);

    let movies = catalog.get_popular_movies(25).await.unwrap();
    let ids: Vec<String> = movies
        .iter()
        .map(|m| m.key().unwrap().to_string())
        .collect();
    let expected: Vec<String> = (1..=25).map(|i| i.to_string()).collect();
    assert_eq!(ids, expected);
    assert_eq!(movies[0].rate, Some(7.5));

    let seen = requests_to(&log, "/api/movies/most-popular");
    assert_eq!(seen.len(), 3);
    let mut pages: Vec<&str> =
        seen.iter().map(|s| s.query["page"].as_str()).collect();
    pages.sort_unstable();
    assert_eq!(pages, vec!["1", "2", "3"]);
    for request in &seen {
        assert_eq!(request.query["limit"], "10");
        assert_eq!(request.app_token.as_deref(), Some(APP_TOKEN));
        assert_eq!(request.authorization.as_deref(), Some("Bearer app-secret"));
    }
}

#[tokio::test]
async fn small_listing_is_a_single_request_with_the_exact_limit() {
    let (url, log) = spawn_server().await;
    let catalog = MovieCatalog::new(client(&url), 10);

    let movies = catalog.get_top_rated_movies(None, 4).await.unwrap();
    assert_eq!(movies.len(), 4);

    let seen = requests_to(&log, "/api/movies/top-rated");
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].query["limit"], "4");
    assert_eq!(seen[0].query["page"], "1");
    assert_eq!(seen[0].query["category"], "IMDB_TOP_50");
}

#[tokio::test]
async fn search_deduplicates_across_pages() {
    let (url, log) = spawn_server().await;
    let catalog = MovieCatalog::new(client(&url), 10);

    let outcome = catalog
        .search_movies(Some("night"), SearchParams::new().genre("Drama"), 50)
        .await
        .unwrap();
    assert_eq!(outcome.items.len(), 15);
    assert_eq!(outcome.requests, 3);
    assert!(outcome.is_complete());

    let seen = requests_to(&log, "/api/movies/search");
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].query["q"], "night");
    assert_eq!(seen[0].query["genre"], "Drama");
    let pages: Vec<&str> = seen.iter().map(|s| s.query["page"].as_str()).collect();
    assert_eq!(pages, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn detail_payloads_decode_loose_fields() {
    let (url, _log) = spawn_server().await;
    let api = client(&url);

    let movie = api.movie(&EntityKey::new("tt0113277")).await.unwrap();
    assert_eq!(movie.summary.key(), Some(&EntityKey::new("tt0113277")));
    assert_eq!(movie.summary.year, Some(1995));
    assert_eq!(movie.summary.rate, Some(8.3));
    assert_eq!(movie.directors[0].name, "Michael Mann");

    let reviews = api.reviews(&EntityKey::new("tt0113277")).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert!(reviews.data[0].is_positive());

    let people = api
        .persons(&SearchParams::new().keyword("mann"))
        .await
        .unwrap();
    assert_eq!(people.data[0].name, "Michael Mann");
}

#[tokio::test]
async fn error_messages_follow_the_response_body() {
    let (url, _log) = spawn_server().await;
    let api = client(&url);

    let err = api.movie(&EntityKey::new("missing")).await.unwrap_err();
    assert_eq!(err.to_string(), "Movie not found");
    assert_eq!(err.status(), Some(404));

    let err = api.movie(&EntityKey::new("weird")).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP error: 500");

    let err = api.movie(&EntityKey::new("broken")).await.unwrap_err();
    assert_eq!(err.to_string(), "API error: 502");
}

#[tokio::test]
async fn user_calls_carry_the_user_token() {
    let (url, log) = spawn_server().await;
    let api = client(&url);
    let session = Session::new(api.clone(), Arc::new(MemoryTokenStore::new()));
    let favorites = FavoritesStore::new(api.clone());

    let user = session.login("ada", "hunter2").await.unwrap();
    assert_eq!(user.username, "ada");
    assert!(api.has_token().await);

    let login = &requests_to(&log, "/api/users/login")[0];
    let body: Value = serde_json::from_str(&login.body).unwrap();
    assert_eq!(body, json!({ "username": "ada", "password": "hunter2" }));
    assert_eq!(login.authorization.as_deref(), Some("Bearer app-secret"));

    favorites.refresh().await.unwrap();
    assert!(favorites.is_favorite(&EntityKey::new("tt0113277")));

    favorites
        .add(&MovieSummary::new("tt0110912", "Pulp Fiction"))
        .await
        .unwrap();
    favorites.remove(&EntityKey::new("tt0113277")).await.unwrap();
    let titles: Vec<String> = favorites
        .favorites()
        .into_iter()
        .map(|m| m.title)
        .collect();
    assert_eq!(titles, vec!["Pulp Fiction"]);

    let profile = session
        .update_profile(&marquee_model::ProfileUpdate {
            phone: Some("555".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(profile.phone.as_deref(), Some("555"));

    session.logout().await.unwrap();
    assert!(!api.has_token().await);

    for request in log.lock().iter().filter(|s| {
        s.path.starts_with("/api/users/") && !s.path.ends_with("/login")
    }) {
        assert_eq!(
            request.authorization.as_deref(),
            Some("Bearer user-secret"),
            "{} {}",
            request.method,
            request.path
        );
        assert_eq!(request.app_token.as_deref(), Some(APP_TOKEN));
    }
}

#[tokio::test]
async fn signed_out_calls_never_reach_the_server() {
    let (url, log) = spawn_server().await;
    let api = client(&url);

    assert!(api.favorites().await.unwrap().is_empty());
    api.logout().await.unwrap();
    assert!(matches!(api.profile().await, Err(ClientError::LoginRequired)));
    assert!(matches!(
        api.remove_favorite(&EntityKey::new("tt0113277")).await,
        Err(ClientError::LoginRequired)
    ));
    assert!(log.lock().is_empty());
}

#[tokio::test]
async fn listing_pages_keep_pagination_metadata() {
    let (url, _log) = spawn_server().await;
    let api = client(&url);
    let page = api
        .popular_movies(PageRequest::new(3, 10))
        .await
        .unwrap();
    assert_eq!(page.len(), 10);
    let pagination = page.pagination.unwrap();
    assert_eq!(pagination.current_page, Some(3));
    assert_eq!(pagination.total_items, Some(30));
}
