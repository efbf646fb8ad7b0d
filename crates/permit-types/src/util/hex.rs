//! Hex string codec.

use crate::error::ValidationError;

/// Encodes bytes as a lowercase, `0x`-prefixed hex string.
///
/// ```
/// use permit_types::util::encode_hex;
///
/// assert_eq!(encode_hex([0xde, 0xad]), "0xdead");
/// assert_eq!(encode_hex(b""), "0x");
/// ```
pub fn encode_hex<T: AsRef<[u8]>>(bytes: T) -> String {
    format!("0x{}", ::hex::encode(bytes.as_ref()))
}

/// Decodes a hex string, with or without the `0x` prefix.
///
/// # Errors
///
/// Returns [`ValidationError::Hex`] on odd length or a non-hex character.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, ValidationError> {
    let stripped = strip_hex_prefix(s);
    Ok(::hex::decode(stripped)?)
}

/// Strips a leading `0x`/`0X` if present.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
