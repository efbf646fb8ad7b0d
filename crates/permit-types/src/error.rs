//! Error taxonomy shared by the EVM and Solana pipelines.
//!
//! Every top-level error of a chain crate reports one [`ErrorKind`], so callers
//! can branch on the category (retry after reconnecting, refetch a nonce, fix
//! the input) without matching on chain-specific variants.

use std::fmt::{Display, Formatter};

/// Category of a signing pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed caller input: address, signature, hex or base64 payload.
    Validation,
    /// No connected or matching wallet/account.
    Connection,
    /// Provider call rejected, or it returned malformed data.
    Rpc,
    /// Every path for resolving an EIP-712 domain failed.
    DomainResolution,
    /// A nonce, blockhash or deadline is no longer valid at use time.
    StaleData,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Connection => "connection",
            ErrorKind::Rpc => "rpc",
            ErrorKind::DomainResolution => "domain_resolution",
            ErrorKind::StaleData => "stale_data",
        };
        f.write_str(s)
    }
}

/// Malformed caller input. Never silently coerced.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The string is not valid hex (odd length or non-hex character).
    #[error("Invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    /// The string is not valid standard base64.
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The address is not `0x` followed by 40 hex characters.
    #[error("Invalid address length/charset: {0}")]
    InvalidAddress(String),
    /// An ECDSA signature is not exactly 65 bytes.
    #[error("Invalid signature length: expected 65 bytes, got {0}")]
    SignatureLength(usize),
    /// The signature recovery byte is neither a recovery id nor legacy `v`.
    #[error("Invalid signature recovery byte {0}")]
    RecoveryByte(u8),
    /// A deadline offset runs past the end of `u64` seconds.
    #[error("Timestamp offset of {amount} {unit} overflows")]
    TimestampOverflow { amount: u64, unit: &'static str },
    /// A value does not fit the declared unsigned integer width.
    #[error("Value {value} does not fit into uint{bits}")]
    UintOverflow { bits: usize, value: u64 },
}
