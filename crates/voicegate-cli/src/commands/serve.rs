//! `voicegate serve` - run the relay server.

use anyhow::Context;
use clap::Args;
use std::net::SocketAddr;
use tracing::info;
use voicegate_core::Config;
use voicegate_relay::{RelayConfig, RelayServer};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Listen address, overriding the SERVER_PORT from config.env
    #[arg(long)]
    pub addr: Option<SocketAddr>,
}

/// Run the relay server until the process is stopped.
///
/// Unreadable config, a missing credential, or a bind failure bubble out of
/// here and exit the process nonzero before any connection is accepted.
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let config = Config::load_default()
        .with_context(|| format!("loading {}", voicegate_core::config::CONFIG_FILE))?;

    let listen_addr = args.addr.unwrap_or_else(|| config.listen_addr());
    info!("voicegate {} starting", env!("CARGO_PKG_VERSION"));
    let server = RelayServer::new(RelayConfig::new(listen_addr, config.api_key));

    server.run().await.context("relay server failed")
}
