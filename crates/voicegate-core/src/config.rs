//! Configuration loading from the `config.env` file.
//!
//! The relay and the console utility both read a flat `KEY=value` file at a
//! fixed relative path. Two keys matter: `SERVER_PORT` (listen port for the
//! relay) and `OPENAI_API_KEY` (the bearer credential). A missing file or an
//! empty credential is fatal at startup.

use crate::error::ConfigError;
use crate::secret::SecretString;
use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

/// Fixed relative path of the configuration file.
pub const CONFIG_FILE: &str = "config.env";

/// Config key holding the listen port.
pub const KEY_SERVER_PORT: &str = "SERVER_PORT";

/// Config key holding the OpenAI API key.
pub const KEY_API_KEY: &str = "OPENAI_API_KEY";

/// Process configuration, constructed once at startup and passed by value.
///
/// Immutable after construction; there is no ambient global lookup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port for the relay server.
    pub server_port: u16,

    /// Bearer credential for the upstream gateway.
    pub api_key: SecretString,
}

impl Config {
    /// Load configuration from the default `config.env` path.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(Path::new(CONFIG_FILE))
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from `KEY=value` file content.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let vars = parse_env_file(content);

        let port_raw = vars
            .get(KEY_SERVER_PORT)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingKey(KEY_SERVER_PORT.to_string()))?;
        let server_port: u16 = port_raw
            .parse()
            .map_err(|_| ConfigError::InvalidPort(port_raw.clone()))?;

        let api_key = vars
            .get(KEY_API_KEY)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingKey(KEY_API_KEY.to_string()))?;

        Ok(Self {
            server_port,
            api_key: SecretString::new(api_key.clone()),
        })
    }

    /// Derive the listen address from the configured port.
    ///
    /// Binds all interfaces, matching the `:PORT` listen form.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.server_port))
    }
}

/// Parse a flat `KEY=value` env-style file.
///
/// Skips comments and blank lines; strips matching single or double quotes
/// around values.
fn parse_env_file(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim();

            // Remove quotes if present
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);

            vars.insert(key.to_string(), value.to_string());
        }
    }

    vars
}
