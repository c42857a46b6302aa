use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("repository config field '{0}' must not be empty")]
    MissingField(&'static str),
    #[error("repository endpoint '{endpoint}' is invalid: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("repository timeout must be greater than zero")]
    InvalidTimeout,
    #[error("failed to build http client: {0}")]
    Client(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search transport failure: {0}")]
    Transport(String),
    #[error("search backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode search response: {0}")]
    Decode(String),
}

impl SearchError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else if let Some(status) = value.status() {
            Self::Status {
                status: status.as_u16(),
                message: value.to_string(),
            }
        } else {
            Self::Transport(value.to_string())
        }
    }
}
