use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Send was called with a message type this transport does not handle.
    /// Raised before any network I/O.
    #[error("Unsupported message type: expected {expected}")]
    UnsupportedMessage { expected: &'static str },

    /// Failure from the underlying HTTP client (connection error, timeout,
    /// non-success status). Propagated verbatim, no retry, no translation.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
