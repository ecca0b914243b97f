//! # lightsim-server
//!
//! TCP front end of the light simulator.
//!
//! - Listener: binds, accepts, spawns one session task per connection
//! - Session: newline-delimited JSON protocol loop against the shared `StateStore`
//! - Codec: `\n` framing for `tokio_util::codec::Framed`
//! - Client: small async client speaking the same protocol
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod client;
pub mod codec;
pub mod config;
pub mod errors;
pub mod listener;
pub mod session;
pub mod shutdown;

pub use client::LightClient;
pub use config::ServerConfig;
pub use errors::{ConfigError, ServerError};
pub use listener::{LightServer, ServerHandle};
