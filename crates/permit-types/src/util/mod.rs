//! Byte codecs used on both chains.
//!
//! - [`b64`] - Base64 encoding/decoding of transaction blobs
//! - [`hex`] - `0x`-prefixed hex strings

pub mod b64;
pub mod hex;

pub use b64::*;
pub use self::hex::*;
