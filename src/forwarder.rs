use std::io;
use std::net::UdpSocket;
use std::time::Duration;

use tracing::{debug, warn};

use crate::dns_header::{DnsFlags, DnsHeader, HEADER_LEN};
use crate::dns_message::DnsMessage;
use crate::dns_record::{DnsAnswer, DnsQuestion};
use crate::error::{DnsError, Result};

/// How long to wait for an upstream reply before giving up.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest datagram read back from the upstream resolver.
const MAX_RESPONSE_LEN: usize = 512;

/// Resolve the address record for `name` through the upstream resolver
/// at `upstream` (host:port).
pub fn resolve(upstream: &str, name: &str) -> Result<DnsAnswer> {
    resolve_question(upstream, &DnsQuestion::address(name), UPSTREAM_TIMEOUT)
}

/// Forward one question, keeping its record type and class, and return the
/// first answer of the reply. The socket lives only for this exchange.
pub fn resolve_question(
    upstream: &str,
    question: &DnsQuestion,
    timeout: Duration,
) -> Result<DnsAnswer> {
    let query = build_single_question_query(rand::random(), question);

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(upstream)?;
    socket.set_read_timeout(Some(timeout))?;

    socket.send(&query.encode())?;
    debug!(upstream, name = %question.name, id = query.header.id, "forwarded question");

    let mut response_buf = [0u8; MAX_RESPONSE_LEN];
    let size = socket.recv(&mut response_buf).map_err(|e| match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => DnsError::UpstreamTimeout(timeout),
        _ => DnsError::Io(e),
    })?;

    parse_first_answer(&response_buf[..size])
}

/// Forward each question in turn. Results are in question order.
pub fn forward_questions(
    upstream: &str,
    questions: &[DnsQuestion],
    timeout: Duration,
) -> Vec<Result<DnsAnswer>> {
    questions
        .iter()
        .map(|question| {
            let result = resolve_question(upstream, question, timeout);
            if let Err(e) = &result {
                warn!(upstream, name = %question.name, error = %e, "forwarding failed");
            }
            result
        })
        .collect()
}

/// Build a DNS query with a single question to send to upstream resolver.
pub fn build_single_question_query(id: u16, question: &DnsQuestion) -> DnsMessage {
    DnsMessage {
        header: DnsHeader {
            id,
            flags: DnsFlags {
                recursion_desired: true,
                ..DnsFlags::default()
            },
            ..DnsHeader::default()
        },
        questions: vec![question.clone()],
        answers: Vec::new(),
    }
}

/// Skip the echoed question and decode the first answer of an upstream reply.
/// The echoed question is not compared with what was sent.
pub fn parse_first_answer(buf: &[u8]) -> Result<DnsAnswer> {
    let header = DnsHeader::from_bytes(buf)?;
    let (_, offset) = DnsQuestion::from_bytes(buf, HEADER_LEN)?;

    if header.answer_count == 0 {
        return Err(DnsError::NoAnswer);
    }

    let (answer, _) = DnsAnswer::from_bytes(buf, offset)?;
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::thread;
    use std::time::Instant;

    /// Answer every query on a loopback socket with `reply(query_bytes)`.
    fn spawn_upstream<F>(replies: usize, reply: F) -> String
    where
        F: Fn(&[u8]) -> Vec<u8> + Send + 'static,
    {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = socket.local_addr().unwrap().to_string();

        thread::spawn(move || {
            let mut buf = [0u8; 512];
            for _ in 0..replies {
                let (size, source) = socket.recv_from(&mut buf).unwrap();
                socket.send_to(&reply(&buf[..size]), source).unwrap();
            }
        });

        addr
    }

    /// Reply with two A records whose names point back at the question.
    fn answer_with(ip: [u8; 4]) -> impl Fn(&[u8]) -> Vec<u8> + Send + 'static {
        move |query: &[u8]| {
            let mut reply = query.to_vec();
            let mut header = DnsHeader::from_bytes(query).unwrap();
            header.flags.is_response = true;
            header.flags.recursion_available = true;
            header.answer_count = 2;
            reply[..12].copy_from_slice(&header.to_bytes());
            for last in [1, 2] {
                reply.extend_from_slice(&[0xC0, 12, 0, 1, 0, 1, 0, 0, 1, 0x2C, 0, 4]);
                reply.extend_from_slice(&[ip[0], ip[1], ip[2], ip[3] + last]);
            }
            reply
        }
    }

    #[test]
    fn test_build_single_question_query() {
        let query = build_single_question_query(0x1234, &DnsQuestion::address("example.com"));
        let bytes = query.encode();

        assert_eq!(&bytes[..12], &[0x12, 0x34, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(query.questions.len(), 1);
    }

    #[test]
    fn test_parse_first_answer_ignores_extra_answers() {
        let query = build_single_question_query(9, &DnsQuestion::address("example.com"));
        let reply = answer_with([1, 2, 3, 0])(&query.encode()[..]);

        let answer = parse_first_answer(&reply).unwrap();
        assert_eq!(answer.name, "example.com");
        assert_eq!(answer.ttl, 300);
        assert_eq!(answer.ipv4().unwrap(), Ipv4Addr::new(1, 2, 3, 1));
    }

    #[test]
    fn test_parse_first_answer_without_answers() {
        let query = build_single_question_query(9, &DnsQuestion::address("example.com"));
        let err = parse_first_answer(&query.encode()).unwrap_err();
        assert!(matches!(err, DnsError::NoAnswer));
    }

    #[test]
    fn test_parse_first_answer_truncated_reply() {
        let err = parse_first_answer(&[0u8; 6]).unwrap_err();
        assert!(matches!(err, DnsError::TruncatedInput { .. }));
    }

    #[test]
    fn test_resolve() {
        let upstream = spawn_upstream(1, answer_with([10, 0, 0, 0]));

        let answer = resolve(&upstream, "codecrafters.io").unwrap();
        assert_eq!(answer.name, "codecrafters.io");
        assert_eq!(answer.ipv4().unwrap(), Ipv4Addr::new(10, 0, 0, 1));
    }

    #[test]
    fn test_resolve_sends_recursion_desired() {
        let upstream = spawn_upstream(1, |query| {
            let header = DnsHeader::from_bytes(query).unwrap();
            assert!(header.flags.recursion_desired);
            assert_eq!(header.question_count, 1);
            answer_with([1, 1, 1, 0])(query)
        });

        assert!(resolve(&upstream, "example.com").is_ok());
    }

    #[test]
    fn test_resolve_no_answer() {
        // Echo the query back unchanged: zero answers.
        let upstream = spawn_upstream(1, |query| query.to_vec());

        let err = resolve(&upstream, "example.com").unwrap_err();
        assert!(matches!(err, DnsError::NoAnswer));
    }

    #[test]
    fn test_resolve_timeout() {
        // Bound but never answers.
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let upstream = silent.local_addr().unwrap().to_string();
        let timeout = Duration::from_millis(200);

        let started = Instant::now();
        let err = resolve_question(&upstream, &DnsQuestion::address("example.com"), timeout)
            .unwrap_err();

        assert!(matches!(err, DnsError::UpstreamTimeout(t) if t == timeout));
        assert!(started.elapsed() < timeout + Duration::from_secs(1));
    }

    #[test]
    fn test_forward_questions_keeps_order() {
        let upstream = spawn_upstream(2, |query| {
            let (question, _) = DnsQuestion::from_bytes(query, 12).unwrap();
            let last = if question.name == "first.test" { 0 } else { 10 };
            answer_with([192, 0, 2, last])(query)
        });

        let questions = vec![
            DnsQuestion::address("first.test"),
            DnsQuestion::address("second.test"),
        ];
        let results = forward_questions(&upstream, &questions, UPSTREAM_TIMEOUT);

        let ips: Vec<_> = results
            .into_iter()
            .map(|result| result.unwrap().ipv4().unwrap())
            .collect();
        assert_eq!(
            ips,
            vec![Ipv4Addr::new(192, 0, 2, 1), Ipv4Addr::new(192, 0, 2, 11)]
        );
    }
}
