use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use lightsim_core::StateStore;
use lightsim_server::{LightServer, ServerConfig};
use lightsim_telemetry::{LogFormat, TelemetryConfig};
use tracing::Level;

/// Stateful light-controller simulator speaking newline-delimited JSON over TCP.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file (host, port, max_frame_len, lights)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Longest accepted frame in bytes
    #[arg(long)]
    max_frame_len: Option<usize>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,

    /// Log output format: pretty or json
    #[arg(long, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Cli {
    fn server_config(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ServerConfig::default(),
        };
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.max_frame_len.is_some() {
            config.max_frame_len = self.max_frame_len;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    lightsim_telemetry::init_telemetry(&TelemetryConfig {
        log_level: cli.log_level,
        format: cli.log_format,
        ..Default::default()
    })?;

    let config = cli.server_config()?;
    let store = Arc::new(StateStore::new(config.lights.clone()));

    tracing::info!(addr = %config.bind_addr(), lights = store.len(), "starting light simulator");

    let mut handle = LightServer::new(config, store)
        .start()
        .await
        .context("starting listener")?;

    let stopped = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for ctrl+c")?;
            None
        }
        closed = handle.closed() => Some(closed),
    };

    tracing::info!("shutting down");
    handle.shutdown().await;

    match stopped {
        None => Ok(()),
        Some(closed) => {
            closed.context("listener stopped")?;
            anyhow::bail!("listener stopped unexpectedly")
        }
    }
}
