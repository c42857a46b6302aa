use search_client::ConfigError;
use thiserror::Error;

use crate::url_state::UrlStateError;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("invalid repository configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("rejected widget '{target}': {reason}")]
    InvalidWidget { target: String, reason: String },
    #[error(transparent)]
    UrlState(#[from] UrlStateError),
    #[error("search ui is already initialized")]
    AlreadyInitialized,
}
