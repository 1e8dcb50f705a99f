use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use marquee_model::DEFAULT_PAGE_SIZE;

use crate::error::{ClientError, ClientResult};

pub const ENV_API_URL: &str = "MARQUEE_API_URL";
pub const ENV_APP_TOKEN: &str = "MARQUEE_APP_TOKEN";
pub const ENV_PAGE_SIZE: &str = "MARQUEE_PAGE_SIZE";
pub const ENV_TIMEOUT_SECS: &str = "MARQUEE_TIMEOUT_SECS";
pub const ENV_TOKEN_PATH: &str = "MARQUEE_TOKEN_PATH";

const CONFIG_FILE: &str = "config.json";
const SESSION_FILE: &str = "session.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration of the catalog client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Server origin; routes add the `/api` prefix themselves.
    pub base_url: String,
    /// Application token sent with every request, when the server requires one.
    pub app_token: Option<String>,
    /// Items requested per page by the aggregators.
    pub page_size: u32,
    pub request_timeout: Duration,
    /// Where the signed-in session is persisted. `None` keeps it in memory.
    pub token_path: Option<PathBuf>,
}

/// On-disk shape of `config.json`; every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    base_url: Option<String>,
    app_token: Option<String>,
    page_size: Option<u32>,
    request_timeout_secs: Option<u64>,
    token_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            app_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_path: project_dirs().map(|dirs| dirs.data_dir().join(SESSION_FILE)),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "marquee", "marquee")
}

impl ClientConfig {
    /// Configuration pointing at `base_url` with every other field defaulted.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Ok(Self {
            base_url: normalize_base_url(&base_url.into())?,
            ..Self::default()
        })
    }

    /// Defaults, then the user config file, then the environment.
    pub fn load() -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::config_file_path()
            && path.exists()
        {
            match Self::read_file(&path) {
                Ok(file) => config.apply_file(file),
                Err(e) => log::warn!(
                    "[ClientConfig] Ignoring unreadable config file {}: {}",
                    path.display(),
                    e
                ),
            }
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        config.base_url = normalize_base_url(&config.base_url)?;
        Ok(config)
    }

    /// `config.json` in the platform config directory.
    pub fn config_file_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    fn read_file(path: &Path) -> ClientResult<ConfigFile> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(base_url) = file.base_url {
            self.base_url = base_url;
        }
        if file.app_token.is_some() {
            self.app_token = file.app_token;
        }
        if let Some(page_size) = file.page_size {
            self.page_size = page_size.max(1);
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if file.token_path.is_some() {
            self.token_path = file.token_path;
        }
    }

    /// Apply `MARQUEE_*` variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> ClientResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base_url) = var(ENV_API_URL) {
            self.base_url = base_url;
        }
        if let Some(token) = var(ENV_APP_TOKEN) {
            self.app_token = Some(token);
        }
        if let Some(raw) = var(ENV_PAGE_SIZE) {
            let page_size: u32 = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!(
                    "{ENV_PAGE_SIZE} must be a positive integer, got '{raw}'"
                ))
            })?;
            if page_size == 0 {
                return Err(ClientError::Config(format!(
                    "{ENV_PAGE_SIZE} must be at least 1"
                )));
            }
            self.page_size = page_size;
        }
        if let Some(raw) = var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!(
                    "{ENV_TIMEOUT_SECS} must be a number of seconds, got '{raw}'"
                ))
            })?;
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = var(ENV_TOKEN_PATH) {
            self.token_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn with_app_token(mut self, token: impl Into<String>) -> Self {
        self.app_token = Some(token.into());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_token_path(mut self, path: Option<PathBuf>) -> Self {
        self.token_path = path;
        self
    }
}

/// Normalize a user-supplied server URL.
///
/// Surrounding whitespace and trailing slashes are trimmed, `http://` is added
/// when no scheme is present, and a trailing `/api` is dropped because every
/// route already carries it.
pub fn normalize_base_url(raw: &str) -> ClientResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix("/api").unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(ClientError::Config("server URL is empty".into()));
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    url::Url::parse(&with_scheme)
        .map_err(|e| ClientError::Config(format!("invalid server URL '{}': {}", raw, e)))?;

    if with_scheme != raw {
        log::debug!(
            "[ClientConfig] Normalized base URL from '{}' to '{}'",
            raw,
            with_scheme
        );
    }
    Ok(with_scheme)
}
