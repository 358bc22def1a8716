//! Error types of the quiz room client.

use std::time::Duration;

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The server refused the bearer token
    #[error("Unauthorized: the server rejected the token")]
    Unauthorized,

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Connection attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The connection is gone and no longer accepts commands
    #[error("Connection closed")]
    Closed,

    #[error("Failed to encode command: {0}")]
    Encode(String),

    #[error("Catalog request failed: {0}")]
    Catalog(String),

    /// Invalid line typed into the CLI
    #[error("{0}")]
    InvalidInput(String),
}
