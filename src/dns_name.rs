use bytes::BufMut;

use crate::error::{DnsError, Result};

/// Upper bound on compression pointers followed while decoding one name.
const MAX_POINTER_HOPS: usize = 64;

/// A 255-byte wire name holds at most 127 labels.
const MAX_LABELS: usize = 128;

/// Parse a domain name from DNS message format.
///
/// `bytes` is the whole message so that compression pointers can be
/// followed. Returns the dotted name and the number of bytes the name
/// occupies at `offset`; when the name is compressed that count stops
/// right after the first pointer. The root name is returned as `"."`.
pub fn parse_domain_name(bytes: &[u8], offset: usize) -> Result<(String, usize)> {
    let mut labels: Vec<&str> = Vec::new();
    let mut pos = offset;
    let mut resume_at = None;
    let mut hops = 0;

    loop {
        let length = *bytes
            .get(pos)
            .ok_or_else(|| DnsError::malformed_name(pos, "name runs past end of buffer"))?;

        match length & 0xC0 {
            0xC0 => {
                let low = *bytes
                    .get(pos + 1)
                    .ok_or_else(|| DnsError::malformed_name(pos, "incomplete compression pointer"))?;
                let target = u16::from_be_bytes([length & 0x3F, low]) as usize;

                if target >= bytes.len() {
                    return Err(DnsError::malformed_name(
                        pos,
                        "compression pointer out of bounds",
                    ));
                }

                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return Err(DnsError::malformed_name(
                        pos,
                        "too many compression pointers",
                    ));
                }

                // Only the first pointer decides where the caller resumes.
                resume_at.get_or_insert(pos + 2);
                pos = target;
            }
            0x00 => {
                if length == 0 {
                    pos += 1;
                    break;
                }

                let start = pos + 1;
                let end = start + length as usize;
                if end > bytes.len() {
                    return Err(DnsError::malformed_name(pos, "label extends beyond buffer"));
                }
                if labels.len() == MAX_LABELS {
                    return Err(DnsError::malformed_name(pos, "too many labels"));
                }

                let label = std::str::from_utf8(&bytes[start..end])
                    .map_err(|_| DnsError::malformed_name(start, "label is not valid UTF-8"))?;
                labels.push(label);
                pos = end;
            }
            _ => return Err(DnsError::malformed_name(pos, "reserved label type")),
        }
    }

    let consumed = resume_at.unwrap_or(pos) - offset;
    let name = if labels.is_empty() {
        ".".to_string()
    } else {
        labels.join(".")
    };

    Ok((name, consumed))
}

/// Write a domain name as length-prefixed labels terminated with a null byte.
/// Never compresses. Empty labels are skipped, so `"."`, `""` and a
/// trailing dot all encode the same way. Label length is not checked.
pub fn write_domain_name<B: BufMut>(name: &str, buf: &mut B) {
    for label in name.split('.').filter(|label| !label.is_empty()) {
        buf.put_u8(label.len() as u8);
        buf.put_slice(label.as_bytes());
    }

    buf.put_u8(0);
}

/// Example: "example.com" -> [7]example[3]com[0]
pub fn encode_domain_name(name: &str) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(name.len() + 2);
    write_domain_name(name, &mut encoded);
    encoded
}
