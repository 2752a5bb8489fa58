//! Wire format of the image-delivery protocol.

use crate::streaming::error::ProtocolError;

/// Literal prefix of every response header.
pub const HEADER_PREFIX: &[u8; 3] = b":::";
/// Number of zero-padded decimal digits carrying the payload length.
pub const LENGTH_DIGITS: usize = 10;
/// Total header size: prefix plus length digits.
pub const HEADER_LEN: usize = HEADER_PREFIX.len() + LENGTH_DIGITS;
/// Largest payload expressible in the header.
pub const MAX_PAYLOAD_LEN: u64 = 9_999_999_999;

/// Builds the `":::"` + 10-digit length header for a payload of `len` bytes.
pub fn encode_header(len: usize) -> Result<[u8; HEADER_LEN], ProtocolError> {
    if len as u64 > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::PayloadTooLarge(len));
    }
    let text = format!(":::{:010}", len);
    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(text.as_bytes());
    Ok(header)
}

/// Parses a header produced by [`encode_header`], returning the payload length.
pub fn decode_header(header: &[u8]) -> Option<usize> {
    if header.len() != HEADER_LEN || !header.starts_with(HEADER_PREFIX) {
        return None;
    }
    let digits = &header[HEADER_PREFIX.len()..];
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}
