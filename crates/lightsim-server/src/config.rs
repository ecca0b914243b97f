//! Server configuration.

use std::path::Path;

use lightsim_core::LightState;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4983;

/// Configuration for the simulator.
///
/// Every field is optional in a config file; missing ones fall back to
/// the defaults below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `4983`, `0` for auto-assign).
    pub port: u16,
    /// Longest accepted frame in bytes. `None` means unbounded.
    pub max_frame_len: Option<usize>,
    /// Initial light records. The count is fixed for the process lifetime.
    pub lights: Vec<LightState>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            max_frame_len: None,
            lights: LightState::default_fixture(),
        }
    }
}

impl ServerConfig {
    /// Read a JSON config file and validate it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".into()));
        }
        if self.lights.is_empty() {
            return Err(ConfigError::Invalid("at least one light is required".into()));
        }
        if self.max_frame_len == Some(0) {
            return Err(ConfigError::Invalid("max_frame_len must be positive".into()));
        }
        Ok(())
    }

    /// `host:port`, as handed to `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
