pub(crate) mod bulk;
pub(crate) mod list;
pub(crate) mod meta;

use thiserror::Error;
use tracker::GraphQlClient;

use crate::config::{API_KEY_ENV, Config};

/// Invalid combination of arguments or input. Exits with status 2.
#[derive(Debug, Error)]
#[error("{0}")]
pub(crate) struct UsageError(pub String);

impl UsageError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Build an API client from the loaded configuration.
pub(crate) fn build_client(config: &Config) -> Result<GraphQlClient, Box<dyn std::error::Error>> {
    let key = config.api_key().ok_or_else(|| {
        let location = Config::default_config_path()
            .map(|p| format!(" or add `key` under [api] in {}", p.display()))
            .unwrap_or_default();
        format!("No API key configured. Set {API_KEY_ENV}{location}.")
    })?;

    tracing::debug!(endpoint = %config.api.url, "Using API endpoint");
    Ok(GraphQlClient::new(&config.api.url, &key)?)
}
