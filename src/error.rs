use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DnsError>;

/// Errors produced while decoding, encoding, or forwarding DNS messages.
#[derive(Debug, Error)]
pub enum DnsError {
    /// The buffer ended before a fixed-width field could be read.
    #[error("truncated input: expected at least {expected} bytes, got {actual}")]
    TruncatedInput { expected: usize, actual: usize },

    /// A domain name could not be decoded.
    #[error("malformed name at offset {offset}: {reason}")]
    MalformedName { offset: usize, reason: &'static str },

    #[error("invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("no response from upstream within {0:?}")]
    UpstreamTimeout(Duration),

    #[error("upstream response contained no answers")]
    NoAnswer,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DnsError {
    pub(crate) fn truncated(expected: usize, actual: usize) -> Self {
        DnsError::TruncatedInput { expected, actual }
    }

    pub(crate) fn malformed_name(offset: usize, reason: &'static str) -> Self {
        DnsError::MalformedName { offset, reason }
    }

    /// True for errors caused by bytes on the wire rather than the network.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            DnsError::TruncatedInput { .. } | DnsError::MalformedName { .. }
        )
    }
}
