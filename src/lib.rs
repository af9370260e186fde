//! A small DNS server: wire-format codec for headers, names and records,
//! plus a forwarding resolver that asks an upstream nameserver over UDP.

pub mod config;
pub mod dns_header;
pub mod dns_message;
pub mod dns_name;
pub mod dns_record;
pub mod error;
pub mod forwarder;
pub mod local;
pub mod server;

pub use error::{DnsError, Result};
