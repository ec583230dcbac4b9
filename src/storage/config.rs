//! Configuration file loading and settings resolution.
//!
//! Loads configuration from:
//! - Linux: `~/.config/gcall/config.toml`
//! - macOS: `~/Library/Application Support/com.gcall.gcall/config.toml`
//! - Windows: `%APPDATA%/gcall/gcall/config/config.toml`
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags (`execute --credentials` and `--access-token`, applied by
//!    the handler)
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `GCALL_CONFIG`: Override config file path
//! - `GCALL_DISCOVERY_URL`: Discovery service base URL
//! - `GCALL_TIMEOUT`: Request timeout in seconds
//! - `GCALL_CREDENTIALS`: Authorized-user credentials file
//! - `GCALL_ACCESS_TOKEN`: Bearer token sent as-is
//!
//! ```toml
//! [api]
//! discovery_url = "https://www.googleapis.com/discovery/v1"
//! timeout_seconds = 30
//!
//! [auth]
//! credentials_file = "/home/me/.config/gcloud/application_default_credentials.json"
//! token_url = "https://oauth2.googleapis.com/token"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::core::auth::DEFAULT_TOKEN_URL;
use crate::core::discovery::DEFAULT_DISCOVERY_URL;
use crate::core::http::DEFAULT_TIMEOUT;
use crate::error::DomainError;

type Result<T> = std::result::Result<T, DomainError>;

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Environment variable to override config file path.
pub const ENV_CONFIG: &str = "GCALL_CONFIG";
/// Environment variable for the discovery service base URL.
pub const ENV_DISCOVERY_URL: &str = "GCALL_DISCOVERY_URL";
/// Environment variable for the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "GCALL_TIMEOUT";
/// Environment variable for the credentials file.
pub const ENV_CREDENTIALS: &str = "GCALL_CREDENTIALS";
/// Environment variable for a bearer token.
pub const ENV_ACCESS_TOKEN: &str = "GCALL_ACCESS_TOKEN";

const MAX_TIMEOUT_SECONDS: u64 = 600;

// =============================================================================
// Config File
// =============================================================================

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
}

/// `[api]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Discovery service base URL.
    pub discovery_url: Option<String>,
    /// Timeout for each HTTP request in seconds; 30 when unset.
    pub timeout_seconds: Option<u64>,
}

/// `[auth]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Authorized-user credentials used by `execute`.
    pub credentials_file: Option<PathBuf>,
    /// OAuth 2 token endpoint.
    pub token_url: Option<String>,
}

impl Config {
    /// Load configuration from the default config file path.
    ///
    /// Returns default config if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidConfig`] if the file exists but is
    /// unreadable or invalid.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().config_file())
    }

    /// Load configuration from a specific path.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path).map_err(|e| {
            DomainError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| DomainError::InvalidConfig(format!("{}: {e}", path.display())))
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidConfig`] for a timeout outside
    /// 1-600 seconds or URLs that are not http(s).
    pub fn validate(&self) -> Result<()> {
        if let Some(seconds) = self.api.timeout_seconds {
            validate_timeout(seconds)?;
        }
        if let Some(url) = &self.api.discovery_url {
            validate_url("api.discovery_url", url)?;
        }
        if let Some(url) = &self.auth.token_url {
            validate_url("auth.token_url", url)?;
        }
        Ok(())
    }
}

fn validate_timeout(seconds: u64) -> Result<()> {
    if seconds == 0 || seconds > MAX_TIMEOUT_SECONDS {
        return Err(DomainError::InvalidConfig(format!(
            "timeout must be between 1 and {MAX_TIMEOUT_SECONDS} seconds, got {seconds}"
        )));
    }
    Ok(())
}

fn validate_url(key: &str, url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(DomainError::InvalidConfig(format!(
            "{key} must be an http(s) URL, got \"{url}\""
        )))
    }
}

// =============================================================================
// Resolved Settings
// =============================================================================

/// Where a setting came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value from environment variable.
    Env,
    /// Value from config file.
    ConfigFile,
    /// Built-in default.
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Source of each resolved setting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingSources {
    pub discovery_url: ConfigSource,
    pub timeout: ConfigSource,
    pub credentials_file: ConfigSource,
    pub token_url: ConfigSource,
    pub access_token: ConfigSource,
}

/// Settings the handlers run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub discovery_url: String,
    pub timeout: Duration,
    pub credentials_file: Option<PathBuf>,
    pub token_url: String,
    /// Bearer token from the environment; never read from the file.
    pub access_token: Option<String>,
    pub sources: SettingSources,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            credentials_file: None,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            access_token: None,
            sources: SettingSources::default(),
        }
    }
}

impl Settings {
    /// Resolve settings from the process environment and the config file.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidConfig`] for an invalid config file or
    /// environment value.
    pub fn resolve() -> Result<Self> {
        Self::resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve settings using `env` to look up environment variables.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve`].
    pub fn resolve_with(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = match env(ENV_CONFIG).filter(|p| !p.trim().is_empty()) {
            Some(path) => Config::load_from(Path::new(path.trim()))?,
            None => Config::load()?,
        };
        Self::from_config(&config, env)
    }

    /// Merge a loaded config with environment overrides.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve`].
    pub fn from_config(config: &Config, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        config.validate()?;
        let lookup = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut sources = SettingSources::default();

        let discovery_url = if let Some(url) = lookup(ENV_DISCOVERY_URL) {
            validate_url(ENV_DISCOVERY_URL, &url)?;
            sources.discovery_url = ConfigSource::Env;
            url
        } else if let Some(url) = &config.api.discovery_url {
            sources.discovery_url = ConfigSource::ConfigFile;
            url.clone()
        } else {
            DEFAULT_DISCOVERY_URL.to_string()
        };

        let timeout = if let Some(raw) = lookup(ENV_TIMEOUT) {
            let seconds = raw.parse::<u64>().map_err(|_| {
                DomainError::InvalidConfig(format!("{ENV_TIMEOUT} must be a number, got \"{raw}\""))
            })?;
            validate_timeout(seconds)?;
            sources.timeout = ConfigSource::Env;
            Duration::from_secs(seconds)
        } else if let Some(seconds) = config.api.timeout_seconds {
            sources.timeout = ConfigSource::ConfigFile;
            Duration::from_secs(seconds)
        } else {
            DEFAULT_TIMEOUT
        };

        let credentials_file = if let Some(path) = lookup(ENV_CREDENTIALS) {
            sources.credentials_file = ConfigSource::Env;
            Some(PathBuf::from(path))
        } else if let Some(path) = &config.auth.credentials_file {
            sources.credentials_file = ConfigSource::ConfigFile;
            Some(path.clone())
        } else {
            None
        };

        let access_token = lookup(ENV_ACCESS_TOKEN);
        if access_token.is_some() {
            sources.access_token = ConfigSource::Env;
        }

        let token_url = if let Some(url) = &config.auth.token_url {
            sources.token_url = ConfigSource::ConfigFile;
            url.clone()
        } else {
            DEFAULT_TOKEN_URL.to_string()
        };

        let settings = Self {
            discovery_url,
            timeout,
            credentials_file,
            token_url,
            access_token,
            sources,
        };
        tracing::debug!(
            discovery_url = %settings.discovery_url,
            discovery_url_source = %settings.sources.discovery_url,
            timeout_secs = settings.timeout.as_secs(),
            timeout_source = %settings.sources.timeout,
            credentials_source = %settings.sources.credentials_file,
            access_token_source = %settings.sources.access_token,
            "Resolved settings"
        );
        Ok(settings)
    }
}
