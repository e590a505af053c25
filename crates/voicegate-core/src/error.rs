//! Error types for Voicegate core.

use std::path::PathBuf;
use thiserror::Error;

/// Core result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
///
/// All of these are startup-fatal: the process must exit nonzero before
/// accepting any connection when one of them occurs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing required key: {0}")]
    MissingKey(String),

    #[error("Invalid listen port: {0}")]
    InvalidPort(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
