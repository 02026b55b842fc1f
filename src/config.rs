//! Application configuration.

use std::path::PathBuf;

use crate::emotes::DEFAULT_API_URL;
use crate::host::HostOptions;

/// Default tracing filter when neither `RUST_LOG` nor `SILA_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "sila=info";

/// Runtime configuration for the client.
///
/// Use the builder pattern to customize it.
///
/// # Example
///
/// ```ignore
/// use sila::config::AppConfig;
///
/// let config = AppConfig::default()
///     .with_requires_auth(true)
///     .with_reload_on_auth_change(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the 7TV API (default: https://7tv.io/v3)
    pub emote_api_url: String,
    /// Only fetch emotes while signed in
    pub requires_auth: bool,
    /// Reload mounted screens as soon as the token changes
    pub reload_on_auth_change: bool,
    /// tracing filter directive (default: sila=info)
    pub log_filter: String,
    /// Override for the credentials file location
    pub credentials_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            emote_api_url: DEFAULT_API_URL.to_string(),
            requires_auth: false,
            reload_on_auth_change: false,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            credentials_path: None,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_emote_api_url(mut self, url: impl Into<String>) -> Self {
        self.emote_api_url = url.into();
        self
    }

    pub fn with_requires_auth(mut self, requires_auth: bool) -> Self {
        self.requires_auth = requires_auth;
        self
    }

    pub fn with_reload_on_auth_change(mut self, reload: bool) -> Self {
        self.reload_on_auth_change = reload;
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Options for hosts built from this config.
    pub fn host_options(&self) -> HostOptions {
        HostOptions {
            reload_on_auth_change: self.reload_on_auth_change,
        }
    }

    /// Create config from `SILA_*` environment variables.
    ///
    /// Unset or empty variables keep their defaults. Booleans accept
    /// `1`, `true`, `yes`, `on` (case-insensitive); anything else is false.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`AppConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("SILA_EMOTE_API_URL") {
            config = config.with_emote_api_url(url.trim());
        }
        if let Some(value) = get("SILA_REQUIRE_AUTH") {
            config = config.with_requires_auth(parse_flag(&value));
        }
        if let Some(value) = get("SILA_RELOAD_ON_AUTH_CHANGE") {
            config = config.with_reload_on_auth_change(parse_flag(&value));
        }
        if let Some(filter) = get("SILA_LOG") {
            config = config.with_log_filter(filter);
        }
        if let Some(path) = get("SILA_CREDENTIALS") {
            config = config.with_credentials_path(path);
        }

        config
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
