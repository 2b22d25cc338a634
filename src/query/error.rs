use thiserror::Error;

/// Failure of a content query as seen by the consuming view.
///
/// Cloneable so one in-flight failure can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid content API URL: {0}")]
    Url(String),
    #[error("content request failed: {0}")]
    Transport(String),
    #[error("content API responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("content response could not be decoded: {0}")]
    Decode(String),
    #[error("content request task ended without a result: {0}")]
    Task(String),
}

impl From<url::ParseError> for QueryError {
    fn from(err: url::ParseError) -> Self {
        Self::Url(err.to_string())
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
