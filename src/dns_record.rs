use std::net::Ipv4Addr;

use bytes::{Buf, BufMut};

use crate::dns_name::{parse_domain_name, write_domain_name};
use crate::error::{DnsError, Result};

/// DNS Question Section
/// Format: QNAME + QTYPE (2 bytes) + QCLASS (2 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuestion {
    pub name: String,
    pub record_type: u16,
    pub record_class: u16,
}

/// DNS Answer/Resource Record Section
/// Format: NAME + TYPE (2 bytes) + CLASS (2 bytes) + TTL (4 bytes) + RDLENGTH (2 bytes) + RDATA
///
/// RDLENGTH is not stored; it is always the length of `rdata`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsAnswer {
    pub name: String,
    pub record_type: u16,
    pub record_class: u16,
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

/// Common DNS record types. Anything else travels as a bare `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A = 1,     // IPv4 address
    NS = 2,    // Name server
    CNAME = 5, // Canonical name
    SOA = 6,   // Start of authority
    PTR = 12,  // Pointer record
    MX = 15,   // Mail exchange
    TXT = 16,  // Text record
    AAAA = 28, // IPv6 address
}

impl RecordType {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(RecordType::A),
            2 => Some(RecordType::NS),
            5 => Some(RecordType::CNAME),
            6 => Some(RecordType::SOA),
            12 => Some(RecordType::PTR),
            15 => Some(RecordType::MX),
            16 => Some(RecordType::TXT),
            28 => Some(RecordType::AAAA),
            _ => None,
        }
    }

    pub fn to_u16(self) -> u16 {
        self as u16
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordClass {
    IN = 1, // Internet
    CH = 3, // CHAOS
    HS = 4, // Hesiod
}

impl RecordClass {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(RecordClass::IN),
            3 => Some(RecordClass::CH),
            4 => Some(RecordClass::HS),
            _ => None,
        }
    }

    pub fn to_u16(self) -> u16 {
        self as u16
    }
}

/// Parse a dotted-quad IPv4 literal.
pub fn parse_ipv4(text: &str) -> Result<Ipv4Addr> {
    text.parse()
        .map_err(|_| DnsError::InvalidAddress(text.to_string()))
}

/// Bytes after the answer name: type, class, ttl, rdlength.
const ANSWER_FIXED_LEN: usize = 10;

impl DnsQuestion {
    /// An address/Internet question for `name`.
    pub fn address(name: impl Into<String>) -> Self {
        DnsQuestion {
            name: name.into(),
            record_type: RecordType::A.to_u16(),
            record_class: RecordClass::IN.to_u16(),
        }
    }

    /// Parse a DNS question from `bytes` starting at `offset`.
    /// Returns the question and the offset just past it.
    pub fn from_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (name, consumed) = parse_domain_name(bytes, offset)?;
        let pos = offset + consumed;

        let remaining = bytes.len().saturating_sub(pos);
        if remaining < 4 {
            return Err(DnsError::truncated(4, remaining));
        }

        let mut fields = &bytes[pos..pos + 4];
        let question = DnsQuestion {
            name,
            record_type: fields.get_u16(),
            record_class: fields.get_u16(),
        };

        Ok((question, pos + 4))
    }

    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        write_domain_name(&self.name, buf);
        buf.put_u16(self.record_type);
        buf.put_u16(self.record_class);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes);
        bytes
    }
}

impl DnsAnswer {
    pub fn new(
        name: String,
        record_type: u16,
        record_class: u16,
        ttl: u32,
        rdata: Vec<u8>,
    ) -> Self {
        DnsAnswer {
            name,
            record_type,
            record_class,
            ttl,
            rdata,
        }
    }

    /// Create an A record from a dotted-quad IPv4 literal.
    pub fn address(name: impl Into<String>, ttl: u32, address: &str) -> Result<Self> {
        Ok(Self::new_a_record(name.into(), ttl, parse_ipv4(address)?))
    }

    pub fn new_a_record(name: String, ttl: u32, ip: Ipv4Addr) -> Self {
        Self::new(
            name,
            RecordType::A.to_u16(),
            RecordClass::IN.to_u16(),
            ttl,
            ip.octets().to_vec(),
        )
    }

    pub fn rdata_length(&self) -> u16 {
        self.rdata.len() as u16
    }

    /// The IPv4 address carried by an A record.
    pub fn ipv4(&self) -> Result<Ipv4Addr> {
        let octets: [u8; 4] = self
            .rdata
            .as_slice()
            .try_into()
            .map_err(|_| DnsError::InvalidAddress(format!("{} bytes of rdata", self.rdata.len())))?;

        Ok(Ipv4Addr::from(octets))
    }

    /// Parse a resource record from `bytes` starting at `offset`.
    /// Returns the answer and the offset just past its rdata.
    pub fn from_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (name, consumed) = parse_domain_name(bytes, offset)?;
        let pos = offset + consumed;

        let remaining = bytes.len().saturating_sub(pos);
        if remaining < ANSWER_FIXED_LEN {
            return Err(DnsError::truncated(ANSWER_FIXED_LEN, remaining));
        }

        let mut fields = &bytes[pos..pos + ANSWER_FIXED_LEN];
        let record_type = fields.get_u16();
        let record_class = fields.get_u16();
        let ttl = fields.get_u32();
        let rdata_length = fields.get_u16() as usize;

        let data_start = pos + ANSWER_FIXED_LEN;
        let remaining = bytes.len() - data_start;
        if rdata_length > remaining {
            return Err(DnsError::truncated(rdata_length, remaining));
        }

        let data_end = data_start + rdata_length;
        let answer = DnsAnswer {
            name,
            record_type,
            record_class,
            ttl,
            rdata: bytes[data_start..data_end].to_vec(),
        };

        Ok((answer, data_end))
    }

    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        write_domain_name(&self.name, buf);
        buf.put_u16(self.record_type);
        buf.put_u16(self.record_class);
        buf.put_u32(self.ttl);
        buf.put_u16(self.rdata_length());
        buf.put_slice(&self.rdata);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes);
        bytes
    }
}
