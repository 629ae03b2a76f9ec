use thiserror::Error;

/// Result type for worker exchanges.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Reasons a computation could not be obtained from the worker.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Failed to connect to worker at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker closed the connection before replying")]
    ConnectionClosed,

    #[error("Worker connection is broken: {0}")]
    ConnectionBroken(String),

    #[error("Failed to encode message: {0}")]
    Encode(String),

    #[error("Malformed worker message: {0}")]
    Decode(String),

    #[error("Worker reported an error: {0}")]
    Worker(String),
}

impl BridgeError {
    /// Whether the error leaves the request/reply alternation out of sync.
    ///
    /// Once this is true the connection can no longer be used.
    pub fn breaks_connection(&self) -> bool {
        matches!(self, BridgeError::Io(_) | BridgeError::ConnectionClosed)
    }
}
