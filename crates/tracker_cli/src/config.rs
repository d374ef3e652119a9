//! Configuration file support for tracker.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (`TRACKER_API_KEY`, `TRACKER_API_URL`, and
//!    `TRACKER_<SECTION>__<FIELD>` such as `TRACKER_BULK__CONCURRENCY`)
//! 3. Local config file (./tracker.toml)
//! 4. User config file (~/.config/tracker/config.toml)
//! 5. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [api]
//! url = "https://api.linear.app/graphql"
//! key = "lin_api_..."  # or use TRACKER_API_KEY env var
//!
//! [bulk]
//! concurrency = 5
//! show_progress = true
//! show_details = true
//! stdin_timeout_secs = 5
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config as ConfigBuilder, ConfigBuilder as Builder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

use tracker::DEFAULT_API_URL;
use tracker::bulk::{DEFAULT_CONCURRENCY, DEFAULT_STDIN_TIMEOUT_SECS};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "TRACKER_API_KEY";

/// Environment variable overriding the API endpoint.
pub const API_URL_ENV: &str = "TRACKER_API_URL";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API connection settings.
    pub api: ApiConfig,
    /// Defaults for bulk commands.
    pub bulk: BulkConfig,
}

/// API connection settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// GraphQL endpoint.
    pub url: String,
    /// Personal API key.
    pub key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            key: None,
        }
    }
}

/// Defaults for bulk commands.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BulkConfig {
    /// Maximum operations in flight.
    pub concurrency: usize,
    /// Draw the live status line on terminals.
    pub show_progress: bool,
    /// List each failure in the summary.
    pub show_details: bool,
    /// How long to wait for piped stdin; 0 waits indefinitely.
    pub stdin_timeout_secs: u64,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            show_progress: true,
            show_details: true,
            stdin_timeout_secs: DEFAULT_STDIN_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. XDG config file (~/.config/tracker/config.toml)
    /// 2. Local config file (./tracker.toml)
    /// 3. `TRACKER_` prefixed environment variables
    /// 4. `TRACKER_API_KEY` / `TRACKER_API_URL`
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("tracker.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./tracker.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., TRACKER_BULK__CONCURRENCY -> bulk.concurrency
        builder = builder.add_source(
            Environment::with_prefix("TRACKER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Self::from_builder(
            builder,
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(API_URL_ENV).ok(),
        )
    }

    /// Apply the dedicated API overrides, then build and deserialize.
    /// Any failure falls back to defaults with a warning.
    fn from_builder(
        builder: Builder<DefaultState>,
        api_key: Option<String>,
        api_url: Option<String>,
    ) -> Self {
        let built = builder
            .set_override_option("api.key", api_key.filter(|k| !k.trim().is_empty()))
            .and_then(|b| b.set_override_option("api.url", api_url.filter(|u| !u.trim().is_empty())))
            .and_then(|b| b.build());

        match built {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// The API key, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<String> {
        self.api
            .key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    }

    /// How long to wait for piped stdin, or `None` to wait indefinitely.
    pub fn stdin_timeout(&self) -> Option<Duration> {
        (self.bulk.stdin_timeout_secs > 0).then(|| Duration::from_secs(self.bulk.stdin_timeout_secs))
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tracker").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
