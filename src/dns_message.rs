use bytes::{BufMut, Bytes, BytesMut};

use crate::dns_header::{DnsHeader, HEADER_LEN};
use crate::dns_record::{DnsAnswer, DnsQuestion};
use crate::error::Result;

/// A whole DNS message as this server handles it: no authority or
/// additional sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsMessage {
    pub header: DnsHeader,
    pub questions: Vec<DnsQuestion>,
    pub answers: Vec<DnsAnswer>,
}

impl DnsMessage {
    /// Response to `request_header` echoing `questions` and carrying `answers`.
    pub fn response(
        request_header: &DnsHeader,
        questions: Vec<DnsQuestion>,
        answers: Vec<DnsAnswer>,
    ) -> Self {
        DnsMessage {
            header: DnsHeader::response_to(request_header),
            questions,
            answers,
        }
    }

    /// The header as it goes on the wire, with counts taken from the sections.
    pub fn wire_header(&self) -> DnsHeader {
        DnsHeader {
            question_count: self.questions.len() as u16,
            answer_count: self.answers.len() as u16,
            authority_count: 0,
            additional_count: 0,
            ..self.header
        }
    }

    /// Encode header, then questions, then answers into one buffer.
    /// Section counts already set on `header` are ignored.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(512);

        buf.put_slice(&self.wire_header().to_bytes());
        for question in &self.questions {
            question.write_to(&mut buf);
        }
        for answer in &self.answers {
            answer.write_to(&mut buf);
        }

        buf.freeze()
    }

    /// Decode header, questions and answers. Authority and additional
    /// records, if any, are left unread.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let (header, questions, mut offset) = parse_questions(buf)?;

        let mut answers = Vec::with_capacity(header.answer_count as usize);
        for _ in 0..header.answer_count {
            let (answer, next) = DnsAnswer::from_bytes(buf, offset)?;
            answers.push(answer);
            offset = next;
        }

        Ok(DnsMessage {
            header,
            questions,
            answers,
        })
    }
}

/// Parse the header and question section of an inbound query.
/// Fails on the first malformed question.
pub fn parse_request(buf: &[u8]) -> Result<(DnsHeader, Vec<DnsQuestion>)> {
    let (header, questions, _) = parse_questions(buf)?;
    Ok((header, questions))
}

fn parse_questions(buf: &[u8]) -> Result<(DnsHeader, Vec<DnsQuestion>, usize)> {
    let header = DnsHeader::from_bytes(buf)?;

    let mut questions = Vec::new();
    let mut offset = HEADER_LEN;

    for _ in 0..header.question_count {
        let (question, next) = DnsQuestion::from_bytes(buf, offset)?;
        questions.push(question);
        offset = next;
    }

    Ok((header, questions, offset))
}
