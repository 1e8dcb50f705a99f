use std::sync::Arc;

use marquee_client::storage::{
    FileTokenStore, MemoryTokenStore, StoredSession, TokenStore,
};
use marquee_client::testing::{StubAccountApi, StubCatalogApi};
use marquee_client::{AppContext, ClientError};
use marquee_model::{
    EntityKey, MovieSummary, ProfileUpdate, RegisterRequest, UserProfile,
};

fn app_with(account: &StubAccountApi, store: Arc<dyn TokenStore>) -> AppContext {
    AppContext::with_services(
        Arc::new(StubCatalogApi::default()),
        Arc::new(account.clone()),
        store,
        10,
    )
}

fn heat() -> MovieSummary {
    MovieSummary::new("tt0113277", "Heat")
}

fn pulp_fiction() -> MovieSummary {
    MovieSummary::new("tt0110912", "Pulp Fiction")
}

#[tokio::test]
async fn login_persists_and_a_new_run_restores_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session").join("token.json");
    let account = StubAccountApi::default()
        .with_user("ada", "secret")
        .with_favorites(vec![heat()]);

    let first = app_with(&account, Arc::new(FileTokenStore::new(&path)));
    let user = first.login("ada", "secret").await.unwrap();
    assert_eq!(user.username, "ada");
    assert!(path.exists());
    assert!(first.favorites.is_favorite(&EntityKey::new("tt0113277")));

    // Token lives in the service; a fresh service must get it from the file.
    let fresh = StubAccountApi::default()
        .with_user("ada", "secret")
        .with_favorites(vec![heat()]);
    let second = app_with(&fresh, Arc::new(FileTokenStore::new(&path)));
    let restored = second.start().await.unwrap();

    assert_eq!(restored.map(|u| u.username), Some("ada".to_string()));
    assert_eq!(fresh.token().as_deref(), Some("token-ada"));
    assert_eq!(second.favorites.len(), 1);
    assert_eq!(fresh.calls(), vec!["favorites"]);
}

#[tokio::test]
async fn unreadable_session_file_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    std::fs::write(&path, "{ not json").unwrap();

    let account = StubAccountApi::default();
    let app = app_with(&account, Arc::new(FileTokenStore::new(&path)));

    assert!(app.start().await.unwrap().is_none());
    assert!(!path.exists());
    assert!(!app.session.is_authenticated());
    assert!(account.calls().is_empty());
}

#[tokio::test]
async fn wrong_password_leaves_the_session_empty() {
    let store = Arc::new(MemoryTokenStore::new());
    let account = StubAccountApi::default().with_user("ada", "secret");
    let app = app_with(&account, store.clone());

    let err = app.login("ada", "nope").await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Invalid username or password");
    assert!(!app.session.is_authenticated());
    assert!(account.token().is_none());
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn register_then_login() {
    let account = StubAccountApi::default();
    let app = app_with(&account, Arc::new(MemoryTokenStore::new()));

    let request = RegisterRequest {
        username: "grace".into(),
        email: "grace@example.com".into(),
        password: "hopper".into(),
        ..RegisterRequest::default()
    };
    app.session.register(&request).await.unwrap();
    let duplicate = app.session.register(&request).await.unwrap_err();
    assert_eq!(duplicate.status(), Some(409));

    let blank = RegisterRequest {
        username: "  ".into(),
        ..request.clone()
    };
    assert!(matches!(
        app.session.register(&blank).await,
        Err(ClientError::InvalidRequest(_))
    ));

    let user = app.login("grace", "hopper").await.unwrap();
    assert_eq!(user.email.as_deref(), Some("grace@example.com"));
    assert_eq!(
        account.calls(),
        vec!["register", "register", "login", "favorites"]
    );
}

#[tokio::test]
async fn favorites_change_only_after_the_server_accepts() {
    let account = StubAccountApi::default()
        .with_user("ada", "secret")
        .with_favorites(vec![heat()]);
    let app = app_with(&account, Arc::new(MemoryTokenStore::new()));
    app.login("ada", "secret").await.unwrap();

    assert!(app.favorites.toggle(&pulp_fiction()).await.unwrap());
    assert_eq!(app.favorites.len(), 2);
    assert_eq!(account.server_favorites().len(), 2);

    // Already a favorite on the server: the local list stays as it was.
    let err = app.favorites.add(&heat()).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(app.favorites.len(), 2);
    assert!(app.favorites.error().is_some());

    assert!(!app.favorites.toggle(&heat()).await.unwrap());
    assert!(!app.favorites.is_favorite(&EntityKey::new("tt0113277")));
    let titles: Vec<String> = app
        .favorites
        .favorites()
        .into_iter()
        .map(|m| m.title)
        .collect();
    assert_eq!(titles, vec!["Pulp Fiction"]);
}

#[tokio::test]
async fn successful_favorite_change_clears_the_previous_error() {
    let account = StubAccountApi::default()
        .with_user("ada", "secret")
        .with_favorites(vec![heat()]);
    let app = app_with(&account, Arc::new(MemoryTokenStore::new()));
    app.login("ada", "secret").await.unwrap();

    app.favorites.add(&heat()).await.unwrap_err();
    assert!(app.favorites.error().is_some());

    app.favorites.add(&pulp_fiction()).await.unwrap();
    assert_eq!(app.favorites.error(), None);

    app.favorites
        .remove(&EntityKey::new("tt0000001"))
        .await
        .unwrap_err();
    assert!(app.favorites.error().is_some());

    app.favorites
        .remove(&EntityKey::new("tt0113277"))
        .await
        .unwrap();
    assert_eq!(app.favorites.error(), None);
}

#[tokio::test]
async fn failed_favorite_update_keeps_local_state() {
    let account = StubAccountApi::default()
        .with_user("ada", "secret")
        .with_favorites(vec![heat()]);
    let app = app_with(&account, Arc::new(MemoryTokenStore::new()));
    app.login("ada", "secret").await.unwrap();
    assert_eq!(app.favorites.len(), 1);

    // Clones share server state: this breaks favorites for `app` too.
    account.clone().failing_favorites();
    assert!(app.favorites.remove(&EntityKey::new("tt0113277")).await.is_err());
    assert!(app.favorites.add(&pulp_fiction()).await.is_err());
    assert!(app.favorites.is_favorite(&EntityKey::new("tt0113277")));
    assert!(!app.favorites.is_favorite(&EntityKey::new("tt0110912")));

    assert!(app.favorites.refresh().await.is_err());
    assert!(app.favorites.is_empty());
    assert_eq!(app.favorites.error().as_deref(), Some("HTTP error: 500"));
}

#[tokio::test]
async fn keyless_movies_cannot_be_favorited() {
    let account = StubAccountApi::default().with_user("ada", "secret");
    let app = app_with(&account, Arc::new(MemoryTokenStore::new()));
    app.login("ada", "secret").await.unwrap();

    let result = app.favorites.add(&MovieSummary::default()).await;

    assert!(matches!(result, Err(ClientError::InvalidRequest(_))));
    assert!(!account.calls().contains(&"add_favorite"));
}

#[tokio::test]
async fn signed_out_user_calls_fail_without_reaching_the_server() {
    let account = StubAccountApi::default().with_favorites(vec![heat()]);
    let app = app_with(&account, Arc::new(MemoryTokenStore::new()));

    app.favorites.refresh().await.unwrap();
    assert!(app.favorites.is_empty());

    let err = app.favorites.add(&heat()).await.unwrap_err();
    assert!(err.is_login_required());
    assert!(app.session.profile().await.unwrap_err().is_login_required());
    app.logout().await.unwrap();

    assert!(account.calls().is_empty());
}

#[tokio::test]
async fn logout_clears_local_state_even_when_the_server_fails() {
    let store = Arc::new(MemoryTokenStore::new());
    let account = StubAccountApi::default()
        .with_user("ada", "secret")
        .with_favorites(vec![heat()])
        .failing_logout();
    let app = app_with(&account, store.clone());
    app.login("ada", "secret").await.unwrap();

    app.logout().await.unwrap();

    assert!(account.calls().contains(&"logout"));
    assert!(account.token().is_none());
    assert!(!app.session.is_authenticated());
    assert!(app.favorites.is_empty());
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn profile_update_refreshes_the_stored_user() {
    let store = Arc::new(MemoryTokenStore::new());
    let account = StubAccountApi::default().with_user("ada", "secret");
    let app = app_with(&account, store.clone());
    app.login("ada", "secret").await.unwrap();

    let empty = ProfileUpdate::default();
    assert!(matches!(
        app.session.update_profile(&empty).await,
        Err(ClientError::InvalidRequest(_))
    ));

    let update = ProfileUpdate {
        phone: Some("555-0100".into()),
        ..ProfileUpdate::default()
    };
    let profile = app.session.update_profile(&update).await.unwrap();

    assert_eq!(profile.phone.as_deref(), Some("555-0100"));
    assert_eq!(
        app.session.current_user().and_then(|u| u.phone),
        Some("555-0100".to_string())
    );
    let stored: StoredSession = store.load().await.unwrap().unwrap();
    assert_eq!(stored.token, "token-ada");
    assert_eq!(stored.user.phone.as_deref(), Some("555-0100"));
}

#[tokio::test]
async fn restored_session_uses_the_stored_profile() {
    let store = Arc::new(MemoryTokenStore::new());
    let user = UserProfile {
        username: "ada".into(),
        ..UserProfile::default()
    };
    store.save(&StoredSession::new("token-ada", user)).await.unwrap();
    let account = StubAccountApi::default().with_user("ada", "secret");
    let app = app_with(&account, store);

    let restored = app.start().await.unwrap().unwrap();

    assert_eq!(restored.username, "ada");
    assert_eq!(app.session.current_user(), Some(restored));
    assert_eq!(account.calls(), vec!["favorites"]);
}
