//! Client error types

use thiserror::Error;

/// Result type for catalog client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-success HTTP status. `message` is the server's own message when
    /// the body carried one.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Empty response from server")]
    EmptyResponse,

    /// A user-scoped operation was attempted without a user token.
    #[error("Login required")]
    LoginRequired,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ClientError {
    /// Build the error for a failed response from its status and raw body.
    ///
    /// A JSON body with a non-empty `message` string yields that message; any
    /// other JSON body yields `HTTP error: {status}`; an empty or non-JSON body
    /// yields `API error: {status}`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(json) => json
                .get("message")
                .and_then(serde_json::Value::as_str)
                .filter(|m| !m.trim().is_empty())
                .map(str::to_owned)
                .unwrap_or_else(|| format!("HTTP error: {status}")),
            Err(_) => format!("API error: {status}"),
        };
        ClientError::Http { status, message }
    }

    /// HTTP status, for errors that came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_login_required(&self) -> bool {
        matches!(self, ClientError::LoginRequired) || self.status() == Some(401)
    }
}
