use std::net::{SocketAddr, UdpSocket};

use bytes::Bytes;
use tracing::{debug, error, info, warn};

use crate::config::{Config, ResolveMode};
use crate::dns_header::{RCODE_NO_ERROR, RCODE_SERVER_FAILURE};
use crate::dns_message::{parse_request, DnsMessage};
use crate::error::Result;
use crate::forwarder::forward_questions;
use crate::local::create_response_answers;

/// Inbound datagrams are read into a buffer of this size.
const MAX_REQUEST_LEN: usize = 512;

/// DNS Server that handles incoming DNS requests
pub struct DnsServer {
    socket: UdpSocket,
    config: Config,
}

impl DnsServer {
    pub fn new(config: Config) -> Result<Self> {
        let socket = UdpSocket::bind(&config.bind_addr)?;
        Ok(Self { socket, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Serve one datagram at a time, forever. A bad datagram or a failed
    /// send is logged and the loop moves on.
    pub fn run(&self) {
        let mut buf = [0u8; MAX_REQUEST_LEN];

        loop {
            let (size, source) = match self.socket.recv_from(&mut buf) {
                Ok(received) => received,
                Err(e) => {
                    error!(error = %e, "failed to receive datagram");
                    continue;
                }
            };
            debug!(size, %source, "received datagram");

            match self.handle_request(&buf[..size]) {
                Ok(response) => {
                    if let Err(e) = self.socket.send_to(&response, source) {
                        error!(%source, error = %e, "failed to send response");
                    }
                }
                Err(e) if e.is_malformed() => {
                    warn!(%source, error = %e, "dropping malformed query");
                }
                Err(e) => {
                    error!(%source, error = %e, "failed to handle query");
                }
            }
        }
    }

    /// Decode a query, answer its questions, and encode the response.
    pub fn handle_request(&self, buf: &[u8]) -> Result<Bytes> {
        let (request_header, questions) = parse_request(buf)?;

        let (answers, all_failed) = match &self.config.mode {
            ResolveMode::Local { ip, ttl } => {
                (create_response_answers(&questions, *ip, *ttl), false)
            }
            ResolveMode::Forward { upstream } => {
                let results = forward_questions(upstream, &questions, self.config.upstream_timeout);
                let all_failed = !results.is_empty() && results.iter().all(|r| r.is_err());
                // Failed questions get no answer; the rest keep question order.
                let answers: Vec<_> = results.into_iter().filter_map(|r| r.ok()).collect();
                (answers, all_failed)
            }
        };

        let mut response = DnsMessage::response(&request_header, questions, answers);
        if all_failed && response.header.flags.response_code == RCODE_NO_ERROR {
            response.header.flags.response_code = RCODE_SERVER_FAILURE;
        }

        info!(
            id = request_header.id,
            questions = response.questions.len(),
            answers = response.answers.len(),
            rcode = response.header.flags.response_code,
            "answered query"
        );

        Ok(response.encode())
    }
}
