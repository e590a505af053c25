//! Relay error types.

use thiserror::Error;

/// Errors that can occur in the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Client-side WebSocket transport error.
    #[error("client transport error: {0}")]
    Client(#[from] axum::Error),

    /// Upstream WebSocket transport error.
    #[error("upstream transport error: {0}")]
    Upstream(#[from] tokio_tungstenite::tungstenite::Error),

    /// Upstream request could not be built.
    #[error("upstream handshake failed: {0}")]
    Handshake(String),

    /// No message arrived within the read deadline.
    #[error("no message within the read deadline")]
    ReadTimeout,

    /// A write stalled past the write deadline.
    #[error("write stalled past the write deadline")]
    WriteTimeout,
}
