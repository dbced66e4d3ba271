//! Runtime configuration
//!
//! The API credential and endpoint base are resolved once at startup and
//! handed to the client explicitly, so tests can point it anywhere.

use crate::error::{CineSearchError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default TMDB v3 endpoint base
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Quiet period before typed text becomes the committed query
pub const DEFAULT_QUIET_INTERVAL: Duration = Duration::from_millis(500);

/// Environment variable holding the bearer token
pub const API_KEY_VAR: &str = "TMDB_API_KEY";

/// Name used by the web build of the same app; accepted as a fallback
pub const LEGACY_API_KEY_VAR: &str = "VITE_TMDB_API_KEY";

/// Environment variable overriding the endpoint base
pub const BASE_URL_VAR: &str = "TMDB_API_BASE_URL";

/// Connection settings for the movie API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Endpoint base without trailing slash
    pub base_url: String,
    /// Static bearer token. Empty is allowed; requests will just be rejected.
    pub api_key: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            request_timeout: None,
        }
    }
}

impl ApiConfig {
    /// Read configuration from the process environment, after loading a
    /// `.env` file from the working directory if there is one.
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .or_else(|| lookup(LEGACY_API_KEY_VAR))
            .unwrap_or_default();
        let base_url = lookup(BASE_URL_VAR)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            base_url,
            api_key,
            request_timeout: None,
        }
        .normalized()
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = base.into();
        self.normalized()
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check the base URL has a scheme reqwest can talk to
    pub fn validate(&self) -> Result<()> {
        if self.base_url.starts_with("http://") || self.base_url.starts_with("https://") {
            Ok(())
        } else {
            Err(CineSearchError::Config(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )))
        }
    }

    fn normalized(mut self) -> Self {
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        self
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    /// Debounce quiet interval
    pub quiet_interval: Duration,
    /// Where the file logger writes
    pub log_file: PathBuf,
    /// Minimum level written to the log file
    pub log_level: log::LevelFilter,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            quiet_interval: DEFAULT_QUIET_INTERVAL,
            log_file: default_log_path(),
            log_level: log::LevelFilter::Info,
        }
    }
}

/// Settings given on the command line. `None` defers to the environment,
/// then to the built-in default.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout: Option<Duration>,
    pub quiet_interval: Option<Duration>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<log::LevelFilter>,
}

impl AppConfig {
    /// Load `.env`, then merge command-line overrides over the environment
    pub fn from_env_with(overrides: Overrides) -> Self {
        let _ = dotenv::dotenv();
        Self::resolve(overrides, |name| std::env::var(name).ok())
    }

    /// Merge overrides over whatever `lookup` finds
    pub fn resolve<F>(overrides: Overrides, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut api = ApiConfig::from_lookup(lookup).with_timeout(overrides.request_timeout);
        if let Some(key) = overrides.api_key {
            api = api.with_api_key(key);
        }
        if let Some(base) = overrides.base_url.filter(|b| !b.trim().is_empty()) {
            api = api.with_base_url(base);
        }

        let defaults = AppConfig::default();
        AppConfig {
            api,
            quiet_interval: overrides.quiet_interval.unwrap_or(defaults.quiet_interval),
            log_file: overrides.log_file.unwrap_or(defaults.log_file),
            log_level: overrides.log_level.unwrap_or(defaults.log_level),
        }
    }
}

/// Log file location when none is given (system temp directory)
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("cinesearch.log")
}
