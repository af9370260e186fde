use anyhow::Context;
use clap::Parser;
use tracing::info;

use dns_relay::config::{Args, Config, ResolveMode};
use dns_relay::server::DnsServer;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_target(false)
        .init();

    let config = Config::from_args(&args).context("invalid configuration")?;
    match &config.mode {
        ResolveMode::Forward { upstream } => info!(%upstream, "forwarding questions upstream"),
        ResolveMode::Local { ip, ttl } => info!(%ip, ttl, "answering locally"),
    }

    let server = DnsServer::new(config)
        .with_context(|| format!("failed to bind to {}", args.bind))?;
    info!(addr = %server.local_addr()?, "listening");

    server.run();
    Ok(())
}
