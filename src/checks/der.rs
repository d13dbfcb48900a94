//! DER encoding helpers for building OCSP requests

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_BIT_STRING: u8 = 0x03;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_NULL: u8 = 0x05;
pub const TAG_OID: u8 = 0x06;
pub const TAG_ENUMERATED: u8 = 0x0a;
pub const TAG_GENERALIZED_TIME: u8 = 0x18;
pub const TAG_SEQUENCE: u8 = 0x30;

/// Context-specific constructed tag `[n]`
pub const fn context(n: u8) -> u8 {
    0xa0 | n
}

/// Context-specific primitive tag `[n] IMPLICIT`
pub const fn context_primitive(n: u8) -> u8 {
    0x80 | n
}

/// Encode a DER length
pub fn encode_length(buf: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        buf.push(len as u8);
    } else {
        let bytes = (len as u32).to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        buf.push(0x80 | (4 - skip) as u8);
        buf.extend_from_slice(&bytes[skip..]);
    }
}

/// Wrap content in a TLV with the given tag
pub fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 6);
    out.push(tag);
    encode_length(&mut out, content.len());
    out.extend_from_slice(content);
    out
}

/// Wrap content in a DER SEQUENCE
pub fn sequence(content: &[u8]) -> Vec<u8> {
    tlv(TAG_SEQUENCE, content)
}

/// Encode an INTEGER from big-endian magnitude bytes, adding a leading zero
/// when the high bit would otherwise mark it negative
pub fn integer(bytes: &[u8]) -> Vec<u8> {
    let trimmed = trim_leading_zeros(bytes);
    let mut content = Vec::with_capacity(trimmed.len() + 1);
    if trimmed.first().map_or(true, |b| b & 0x80 != 0) {
        content.push(0);
    }
    content.extend_from_slice(trimmed);
    tlv(TAG_INTEGER, &content)
}

/// Trim leading zero bytes (for serial number comparison)
pub fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let pos = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[pos..]
}
