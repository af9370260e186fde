use bytes::{Buf, BufMut};

use crate::error::{DnsError, Result};

pub const HEADER_LEN: usize = 12;

/// Response code: no error.
pub const RCODE_NO_ERROR: u8 = 0;
/// Response code: server failure.
pub const RCODE_SERVER_FAILURE: u8 = 2;
/// Response code: not implemented.
pub const RCODE_NOT_IMPLEMENTED: u8 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DnsHeader {
    pub id: u16,
    pub flags: DnsFlags,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

/// The 16 bits between the id and the section counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DnsFlags {
    pub is_response: bool,         // QR (false = query, true = response)
    pub opcode: u8,                // 4 bits, 0 = standard query
    pub authoritative: bool,       // AA
    pub truncated: bool,           // TC
    pub recursion_desired: bool,   // RD
    pub recursion_available: bool, // RA
    pub reserved: u8,              // Z, 3 bits, carried through untouched
    pub response_code: u8,         // 4 bits
}

impl DnsFlags {
    pub fn to_u16(&self) -> u16 {
        let mut flags: u16 = 0;

        if self.is_response { flags |= 1 << 15; }
        flags |= (self.opcode as u16 & 0xF) << 11;
        if self.authoritative { flags |= 1 << 10; }
        if self.truncated { flags |= 1 << 9; }
        if self.recursion_desired { flags |= 1 << 8; }
        if self.recursion_available { flags |= 1 << 7; }
        flags |= (self.reserved as u16 & 0x7) << 4;
        flags |= self.response_code as u16 & 0xF;

        flags
    }

    pub fn from_u16(flags: u16) -> Self {
        DnsFlags {
            is_response: (flags & (1 << 15)) != 0,
            opcode: ((flags >> 11) & 0xF) as u8,
            authoritative: (flags & (1 << 10)) != 0,
            truncated: (flags & (1 << 9)) != 0,
            recursion_desired: (flags & (1 << 8)) != 0,
            recursion_available: (flags & (1 << 7)) != 0,
            reserved: ((flags >> 4) & 0x7) as u8,
            response_code: (flags & 0xF) as u8,
        }
    }
}

impl DnsHeader {
    /// Unpack the first 12 bytes of `bytes`. No field is range-checked.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(DnsError::truncated(HEADER_LEN, bytes.len()));
        }

        let mut buf = &bytes[..HEADER_LEN];
        Ok(DnsHeader {
            id: buf.get_u16(),
            flags: DnsFlags::from_u16(buf.get_u16()),
            question_count: buf.get_u16(),
            answer_count: buf.get_u16(),
            authority_count: buf.get_u16(),
            additional_count: buf.get_u16(),
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];

        let mut buf = &mut bytes[..];
        buf.put_u16(self.id);
        buf.put_u16(self.flags.to_u16());
        buf.put_u16(self.question_count);
        buf.put_u16(self.answer_count);
        buf.put_u16(self.authority_count);
        buf.put_u16(self.additional_count);

        bytes
    }

    /// Header for a response to `request`. Section counts are left at zero;
    /// the message assembler fills them in.
    pub fn response_to(request: &DnsHeader) -> Self {
        let response_code = if request.flags.opcode == 0 {
            RCODE_NO_ERROR
        } else {
            RCODE_NOT_IMPLEMENTED
        };

        DnsHeader {
            id: request.id,
            flags: DnsFlags {
                is_response: true,
                opcode: request.flags.opcode,
                recursion_desired: request.flags.recursion_desired,
                response_code,
                ..DnsFlags::default()
            },
            ..DnsHeader::default()
        }
    }
}
