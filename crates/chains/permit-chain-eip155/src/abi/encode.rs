//! Call data for `nonces`, `name`, `version`, `allowance`, `eip712Domain` and
//! the Permit2 three-address `allowance`.
//!
//! Call data is `selector ++ address words`, each address left-padded with
//! zeros to 32 bytes. No other argument types are supported.

use alloy_primitives::{Address, Bytes};
use permit_types::error::ValidationError;
use permit_types::util::{decode_hex, encode_hex, strip_hex_prefix};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// A 4-byte function selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    /// `nonces(address)`
    pub const NONCES: Selector = Selector([0x7e, 0xce, 0xbe, 0x00]);
    /// `name()`
    pub const NAME: Selector = Selector([0x06, 0xfd, 0xde, 0x03]);
    /// `version()`
    pub const VERSION: Selector = Selector([0x54, 0xfd, 0x4d, 0x50]);
    /// ERC-20 `allowance(address,address)`
    pub const ALLOWANCE: Selector = Selector([0xdd, 0x62, 0xed, 0x3e]);
    /// EIP-5267 `eip712Domain()`
    pub const EIP712_DOMAIN: Selector = Selector([0x84, 0xb0, 0x19, 0x6e]);
    /// Permit2 `allowance(address,address,address)`
    pub const PERMIT2_ALLOWANCE: Selector = Selector([0x92, 0x7d, 0xa1, 0x05]);

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&encode_hex(self.0))
    }
}

/// A read-only contract call, sent verbatim as the first `eth_call` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
}

/// Parses a `0x`-prefixed (or bare) 40-character hex address.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidAddress`] on a wrong length or a non-hex
/// character.
pub fn parse_address(s: &str) -> Result<Address, ValidationError> {
    let stripped = strip_hex_prefix(s);
    if stripped.len() != 40 || !stripped.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidAddress(s.to_string()));
    }
    let bytes = decode_hex(stripped)?;
    Ok(Address::from_slice(&bytes))
}

/// Builds `selector ++ left-padded address words`.
pub fn encode_call(selector: Selector, args: &[Address]) -> Bytes {
    let mut data = Vec::with_capacity(4 + 32 * args.len());
    data.extend_from_slice(selector.as_bytes());
    for address in args {
        data.extend_from_slice(address.into_word().as_slice());
    }
    data.into()
}

/// `token.nonces(owner)`
pub fn nonces_call(token: Address, owner: Address) -> CallRequest {
    CallRequest {
        to: token,
        data: encode_call(Selector::NONCES, &[owner]),
    }
}

/// `token.name()`
pub fn name_call(token: Address) -> CallRequest {
    CallRequest {
        to: token,
        data: encode_call(Selector::NAME, &[]),
    }
}

/// `token.version()`
pub fn version_call(token: Address) -> CallRequest {
    CallRequest {
        to: token,
        data: encode_call(Selector::VERSION, &[]),
    }
}

/// `token.eip712Domain()`
pub fn eip712_domain_call(token: Address) -> CallRequest {
    CallRequest {
        to: token,
        data: encode_call(Selector::EIP712_DOMAIN, &[]),
    }
}

/// ERC-20 `token.allowance(owner, spender)`
pub fn allowance_call(token: Address, owner: Address, spender: Address) -> CallRequest {
    CallRequest {
        to: token,
        data: encode_call(Selector::ALLOWANCE, &[owner, spender]),
    }
}

/// Permit2 `permit2.allowance(owner, token, spender)`
pub fn permit2_allowance_call(
    permit2: Address,
    owner: Address,
    token: Address,
    spender: Address,
) -> CallRequest {
    CallRequest {
        to: permit2,
        data: encode_call(Selector::PERMIT2_ALLOWANCE, &[owner, token, spender]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, keccak256};

    fn selector_of(signature: &str) -> [u8; 4] {
        let hash = keccak256(signature.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    #[test]
    fn test_selectors_match_canonical_signatures() {
        assert_eq!(Selector::NONCES.0, selector_of("nonces(address)"));
        assert_eq!(Selector::NAME.0, selector_of("name()"));
        assert_eq!(Selector::VERSION.0, selector_of("version()"));
        assert_eq!(Selector::ALLOWANCE.0, selector_of("allowance(address,address)"));
        assert_eq!(Selector::EIP712_DOMAIN.0, selector_of("eip712Domain()"));
        assert_eq!(
            Selector::PERMIT2_ALLOWANCE.0,
            selector_of("allowance(address,address,address)")
        );
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(Selector::NONCES.to_string(), "0x7ecebe00");
    }

    #[test]
    fn test_encode_nonces() {
        let owner = address!("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
        let call = nonces_call(Address::ZERO, owner);
        assert_eq!(
            encode_hex(&call.data),
            "0x7ecebe00000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045"
        );
    }

    #[test]
    fn test_encode_lowercase_hex() {
        let owner = parse_address("0xD8DA6BF26964AF9D7EED9E03E53415D37AA96045").unwrap();
        let call = allowance_call(Address::ZERO, owner, crate::permit2::PERMIT2_ADDRESS);
        let hex = encode_hex(&call.data);
        assert_eq!(hex, hex.to_lowercase());
        assert!(hex.ends_with("000000000000000000000000000000000022d473030f116ddee9f6b43ac78ba3"));
    }

    #[test]
    fn test_encode_no_args() {
        let call = name_call(Address::ZERO);
        assert_eq!(encode_hex(&call.data), "0x06fdde03");
    }

    #[test]
    fn test_encode_permit2_allowance_three_words() {
        let owner = address!("0x1111111111111111111111111111111111111111");
        let token = address!("0x2222222222222222222222222222222222222222");
        let spender = address!("0x3333333333333333333333333333333333333333");
        let call = permit2_allowance_call(Address::ZERO, owner, token, spender);
        assert_eq!(call.data.len(), 4 + 3 * 32);
        assert_eq!(&call.data[..4], &Selector::PERMIT2_ALLOWANCE.0);
        assert_eq!(&call.data[4..16], &[0u8; 12]);
        assert_eq!(&call.data[16..36], owner.as_slice());
        assert_eq!(&call.data[48..68], token.as_slice());
        assert_eq!(&call.data[80..100], spender.as_slice());
    }

    #[test]
    fn test_parse_address_rejects_bad_input() {
        for bad in [
            "0x1234",
            "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA9604",
            "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA960450",
            "0xg8dA6BF26964aF9D7eEd9e03E53415D37aA96045",
            "",
        ] {
            assert!(
                matches!(parse_address(bad), Err(ValidationError::InvalidAddress(_))),
                "{bad} should be rejected"
            );
        }
    }
}
