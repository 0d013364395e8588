use thiserror::Error;

/// Errors that abort a trigger-then-poll run
#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("Required configuration not set: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid configuration for {key}: {reason}")]
    ConfigurationInvalid { key: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API returned {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Response did not contain a request id")]
    MissingRequestId,

    #[error("Run cancelled before a build was triggered")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TriggerResult<T> = Result<T, TriggerError>;

impl From<serde_json::Error> for TriggerError {
    fn from(err: serde_json::Error) -> Self {
        TriggerError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for TriggerError {
    fn from(err: reqwest::Error) -> Self {
        TriggerError::Transport(err.to_string())
    }
}

impl TriggerError {
    /// Whether the error happened before any request could be sent
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TriggerError::ConfigurationMissing(_) | TriggerError::ConfigurationInvalid { .. }
        )
    }

    /// Whether a failed status check is worth repeating. Client errors other
    /// than timeouts and rate limits will not change between attempts.
    pub fn is_retryable(&self) -> bool {
        match self {
            TriggerError::Transport(_) | TriggerError::Decode(_) => true,
            TriggerError::ApiStatus { status, .. } => {
                !(400..500).contains(status) || *status == 408 || *status == 429
            }
            _ => false,
        }
    }
}
