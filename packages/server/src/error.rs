//! Server-level errors.

use thiserror::Error;

/// Errors that stop the gateway
#[derive(Debug, Error)]
pub enum ServerError {
    /// Listener could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server loop failed
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}
