use std::net::Ipv4Addr;
use std::time::Duration;

use clap::Parser;
use tracing::Level;

use crate::dns_record::parse_ipv4;
use crate::error::Result;
use crate::forwarder::UPSTREAM_TIMEOUT;

#[derive(Parser, Debug)]
#[command(name = "dns-relay", about = "Answers DNS queries locally or forwards them upstream")]
pub struct Args {
    /// Upstream DNS resolver address (e.g., 8.8.8.8:53)
    #[arg(long)]
    pub resolver: Option<String>,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:2053")]
    pub bind: String,

    /// IPv4 address returned for every question when no resolver is set
    #[arg(long, default_value = "8.8.8.8")]
    pub local_address: String,

    /// TTL of locally generated answers, in seconds
    #[arg(long, default_value_t = 60)]
    pub ttl: u32,

    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,
}

/// Where answers come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveMode {
    Local { ip: Ipv4Addr, ttl: u32 },
    Forward { upstream: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub mode: ResolveMode,
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self> {
        let mode = match &args.resolver {
            Some(upstream) => ResolveMode::Forward {
                upstream: upstream.clone(),
            },
            None => ResolveMode::Local {
                ip: parse_ipv4(&args.local_address)?,
                ttl: args.ttl,
            },
        };

        Ok(Config {
            bind_addr: args.bind.clone(),
            mode,
            upstream_timeout: UPSTREAM_TIMEOUT,
        })
    }
}
