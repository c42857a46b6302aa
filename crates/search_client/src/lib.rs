use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use search_model::{ItemId, QueryValue, ResultValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

pub mod config;
pub mod error;

pub use config::{ensure_repository_config_is_valid, RepositoryConfig};
pub use error::{ConfigError, SearchError};

pub const TOKEN_HEADER: &str = "x-search-token";

/// Seam between the UI core and whatever executes searches.
#[async_trait]
pub trait SearchRepository: Send + Sync {
    async fn query(&self, query: &QueryValue) -> Result<ResultValue, SearchError>;
    async fn click(
        &self,
        app_id: &str,
        index_id: &str,
        item_id: &ItemId,
        user_id: Option<&str>,
    ) -> Result<(), SearchError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct HttpRepository {
    http: Client,
    endpoint: Url,
    config: RepositoryConfig,
}

impl HttpRepository {
    pub fn new(config: RepositoryConfig) -> Result<Self, ConfigError> {
        let endpoint = ensure_repository_config_is_valid(&config)?;
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| ConfigError::Client(err.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            config,
        })
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    fn endpoint_url(&self, segments: &[&str]) -> Result<Url, SearchError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SearchError::Transport(format!("endpoint {} cannot be a base", self.endpoint))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, SearchError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let raw = res.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&raw)
            .map(|body| body.message)
            .unwrap_or(raw);
        Err(SearchError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SearchRepository for HttpRepository {
    async fn query(&self, query: &QueryValue) -> Result<ResultValue, SearchError> {
        let url = self.endpoint_url(&[
            "v1",
            &self.config.app_id,
            "indices",
            &self.config.index_id,
            "query",
        ])?;
        debug!(%url, text = %query.text, page = query.page, "sending search query");

        let res = self
            .http
            .post(url)
            .header(TOKEN_HEADER, &self.config.token)
            .json(query)
            .send()
            .await?;
        let res = Self::check_status(res).await.inspect_err(|err| {
            warn!(error = %err, "search query rejected");
        })?;

        let raw = res.bytes().await?;
        serde_json::from_slice::<ResultValue>(&raw)
            .map_err(|err| SearchError::Decode(err.to_string()))
    }

    async fn click(
        &self,
        app_id: &str,
        index_id: &str,
        item_id: &ItemId,
        user_id: Option<&str>,
    ) -> Result<(), SearchError> {
        let item = item_id.to_string();
        let url = self.endpoint_url(&["v1", app_id, "indices", index_id, "items", &item, "click"])?;

        let res = self
            .http
            .post(url)
            .header(TOKEN_HEADER, &self.config.token)
            .json(&ClickEvent {
                user_id: user_id.map(str::to_string),
                clicked_at: Utc::now(),
            })
            .send()
            .await?;
        Self::check_status(res).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
