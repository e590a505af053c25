//! # voicegate-core
//!
//! Configuration and credential handling for Voicegate.
//!
//! This crate provides the pieces shared by the relay server and the CLI:
//!
//! - **Configuration**: loading the `config.env` file (listen port, API key)
//! - **Secrets**: a zeroize-on-drop wrapper for the bearer credential

pub mod config;
pub mod error;
pub mod secret;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use secret::SecretString;
