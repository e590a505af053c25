//! WebSocket session relay for Voicegate.
//!
//! This crate holds the session-relay engine:
//!
//! - Accepting a browser client over a `/ws` WebSocket upgrade
//! - Dialing the OpenAI realtime gateway with the bearer credential
//! - Pumping messages in both directions, unmodified and in order
//! - Keepalive pings toward the client
//! - First-failure teardown of both connections

pub mod connection;
pub mod error;
pub mod server;
pub mod session;
pub mod upstream;

pub use connection::{Frame, MessageSink, MessageSource, SharedSink};
pub use error::RelayError;
pub use server::{RelayConfig, RelayServer};
pub use session::{Direction, Tunables};

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
