//! Account service trait: authentication, profile and favorites.

use async_trait::async_trait;
use std::fmt::Debug;

use marquee_model::{
    AuthSession, EntityKey, LoginRequest, MovieSummary, ProfileUpdate, RegisterRequest,
    UserProfile,
};

use crate::error::ClientResult;

/// User-scoped operations.
///
/// Implementations hold the user token. Without one, favorites and profile
/// calls return [`crate::ClientError::LoginRequired`] before any request is made,
/// except [`AccountApi::favorites`] (empty) and [`AccountApi::logout`] (no-op).
#[async_trait]
pub trait AccountApi: Send + Sync + Debug {
    async fn register(&self, request: &RegisterRequest) -> ClientResult<()>;

    /// Exchange credentials for a session. Does not install the token.
    async fn login(&self, request: &LoginRequest) -> ClientResult<AuthSession>;

    async fn logout(&self) -> ClientResult<()>;

    async fn profile(&self) -> ClientResult<UserProfile>;

    async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<()>;

    /// Install or remove the user token used by user-scoped calls.
    async fn set_token(&self, token: Option<String>);

    async fn has_token(&self) -> bool;

    async fn favorites(&self) -> ClientResult<Vec<MovieSummary>>;

    async fn add_favorite(&self, movie_id: &EntityKey) -> ClientResult<()>;

    async fn remove_favorite(&self, movie_id: &EntityKey) -> ClientResult<()>;
}
