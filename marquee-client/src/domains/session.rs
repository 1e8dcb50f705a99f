//! Signed-in user and token lifecycle.

use log::{debug, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;

use marquee_model::{LoginRequest, ProfileUpdate, RegisterRequest, UserProfile};

use crate::error::{ClientError, ClientResult};
use crate::services::AccountApi;
use crate::storage::{StoredSession, TokenStore};

/// Authentication state.
///
/// The user token lives in the account service; the profile of the signed-in
/// user is cached here and persisted together with the token.
#[derive(Debug)]
pub struct Session {
    api: Arc<dyn AccountApi>,
    store: Arc<dyn TokenStore>,
    user: RwLock<Option<UserProfile>>,
}

impl Session {
    pub fn new(api: Arc<dyn AccountApi>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            store,
            user: RwLock::new(None),
        }
    }

    /// Reinstate the session persisted by an earlier run.
    ///
    /// An unreadable store is cleared and treated as signed out.
    pub async fn restore(&self) -> ClientResult<Option<UserProfile>> {
        match self.store.load().await {
            Ok(Some(stored)) => {
                debug!("[Session] Restored session for {}", stored.user.username);
                self.api.set_token(Some(stored.token)).await;
                *self.user.write() = Some(stored.user.clone());
                Ok(Some(stored.user))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                warn!("[Session] Discarding unreadable stored session: {}", e);
                self.store.clear().await?;
                Ok(None)
            }
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<()> {
        if request.username.trim().is_empty() || request.password.is_empty() {
            return Err(ClientError::InvalidRequest(
                "username and password are required".into(),
            ));
        }
        self.api.register(request).await?;
        info!("[Session] Registered {}", request.username);
        Ok(())
    }

    /// Sign in and persist the session.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<UserProfile> {
        let request = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        let session = self.api.login(&request).await?;

        self.api.set_token(Some(session.token.clone())).await;
        let stored = StoredSession::new(session.token, session.user.clone());
        if let Err(e) = self.store.save(&stored).await {
            warn!("[Session] Signed in but could not persist the session: {}", e);
        }
        *self.user.write() = Some(session.user.clone());
        info!("[Session] Signed in as {}", session.user.username);
        Ok(session.user)
    }

    /// Sign out. The server call is best effort; local state is always cleared.
    pub async fn logout(&self) -> ClientResult<()> {
        if let Err(e) = self.api.logout().await {
            warn!("[Session] Logout request failed, clearing locally: {}", e);
        }
        self.api.set_token(None).await;
        *self.user.write() = None;
        self.store.clear().await?;
        info!("[Session] Signed out");
        Ok(())
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.user.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.read().is_some()
    }

    /// Fetch the profile from the server and refresh the cached copy.
    pub async fn profile(&self) -> ClientResult<UserProfile> {
        let profile = self.api.profile().await?;
        self.remember(&profile).await;
        Ok(profile)
    }

    /// Apply `update`, then return the profile as the server now has it.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<UserProfile> {
        if update.is_empty() {
            return Err(ClientError::InvalidRequest("nothing to update".into()));
        }
        self.api.update_profile(update).await?;
        self.profile().await
    }

    async fn remember(&self, profile: &UserProfile) {
        *self.user.write() = Some(profile.clone());
        match self.store.load().await {
            Ok(Some(mut stored)) => {
                stored.user = profile.clone();
                if let Err(e) = self.store.save(&stored).await {
                    warn!("[Session] Could not persist refreshed profile: {}", e);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("[Session] Could not read stored session: {}", e),
        }
    }
}
