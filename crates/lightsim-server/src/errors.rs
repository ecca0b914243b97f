use std::io;
use std::path::PathBuf;

use crate::codec::CodecError;

/// Errors from binding, serving, or talking to the simulator.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listening socket could not be bound. Fatal at startup.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    /// The listening socket stopped accepting. Fatal once the server is up.
    #[error("accept failed, listener stopped: {0}")]
    Accept(#[source] io::Error),
    #[error("connection error: {0}")]
    Connection(#[from] CodecError),
    #[error("connection closed by peer")]
    Closed,
    /// The peer sent something that does not fit the protocol.
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl ServerError {
    /// Bind and accept failures end the process; everything else stays inside one session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Bind { .. } | Self::Accept(_))
    }
}

/// Errors from loading or validating a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}
