use keeper_core::KeeperError;

/// Failure of a single HTTP attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connect, timeout or I/O failure. Worth retrying.
    #[error("network error: {0}")]
    Network(String),
    /// The request could not be built, e.g. a malformed endpoint. Never retried.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Network(_))
    }
}

/// Terminal outcome of delivering one payload to one listener.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("max retries reached for endpoint {endpoint}")]
    MaxRetries { endpoint: String },
    #[error("request to {endpoint} failed: {reason}")]
    Fatal { endpoint: String, reason: String },
    #[error("delivery to {endpoint} cancelled")]
    Cancelled { endpoint: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("invalid callback configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to load {stage} for file {file_id}: {source}")]
    Assembly {
        file_id: String,
        stage: &'static str,
        #[source]
        source: KeeperError,
    },
    #[error("failed to serialize payload for file {file_id}: {source}")]
    Serialize {
        file_id: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type CallbackResult<T> = std::result::Result<T, CallbackError>;
