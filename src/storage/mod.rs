//! Configuration file and resolved settings.

pub mod config;
pub mod paths;

pub use config::{
    ApiConfig, AuthConfig, Config, ConfigSource, ENV_ACCESS_TOKEN, ENV_CONFIG, ENV_CREDENTIALS,
    ENV_DISCOVERY_URL, ENV_TIMEOUT, SettingSources, Settings,
};
pub use paths::AppPaths;
