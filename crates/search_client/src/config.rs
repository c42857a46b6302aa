use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub endpoint: String,
    pub app_id: String,
    pub index_id: String,
    pub token: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8999".into(),
            app_id: String::new(),
            index_id: String::new(),
            token: String::new(),
            user_id: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

pub fn ensure_repository_config_is_valid(config: &RepositoryConfig) -> Result<Url, ConfigError> {
    for (field, value) in [
        ("app_id", &config.app_id),
        ("index_id", &config.index_id),
        ("token", &config.token),
        ("endpoint", &config.endpoint),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(field));
        }
    }

    if config.timeout_ms == 0 {
        return Err(ConfigError::InvalidTimeout);
    }

    let endpoint = Url::parse(config.endpoint.trim()).map_err(|err| {
        ConfigError::InvalidEndpoint {
            endpoint: config.endpoint.clone(),
            reason: err.to_string(),
        }
    })?;

    if !matches!(endpoint.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEndpoint {
            endpoint: config.endpoint.clone(),
            reason: format!("unsupported scheme '{}'", endpoint.scheme()),
        });
    }

    Ok(endpoint)
}
