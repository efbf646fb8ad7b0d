//! Address and integer wire forms used in typed data and signed payloads.

use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::abi::parse_address;
use permit_types::error::ValidationError;

/// An Ethereum address that always serializes in EIP-55 checksummed form.
///
/// Wallets compare typed-data addresses case-insensitively, but checksummed
/// output keeps the JSON shown to users readable and stable.
///
/// ```
/// use permit_chain_eip155::chain::ChecksummedAddress;
///
/// let addr: ChecksummedAddress = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045".parse().unwrap();
/// assert_eq!(addr.to_string(), "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ChecksummedAddress(pub Address);

impl FromStr for ChecksummedAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_address(s).map(Self)
    }
}

impl Display for ChecksummedAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_checksum(None))
    }
}

impl Serialize for ChecksummedAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_checksum(None))
    }
}

impl<'de> Deserialize<'de> for ChecksummedAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl From<ChecksummedAddress> for Address {
    fn from(value: ChecksummedAddress) -> Self {
        value.0
    }
}

impl From<Address> for ChecksummedAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl PartialEq<ChecksummedAddress> for Address {
    fn eq(&self, other: &ChecksummedAddress) -> bool {
        self.eq(&other.0)
    }
}

/// Any-width unsigned integer as a decimal string (`uint256`, `uint160`, `uint48`).
pub mod decimal_uint {
    use alloy_primitives::Uint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const BITS: usize, const LIMBS: usize>(
        value: &Uint<BITS, LIMBS>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D, const BITS: usize, const LIMBS: usize>(
        deserializer: D,
    ) -> Result<Uint<BITS, LIMBS>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Uint::from_str_radix(&s, 10).map_err(serde::de::Error::custom)
    }
}

/// A chain id as a JSON number, which is what `eth_signTypedData_v4` wallets
/// expect in the domain. Values beyond `u64` fall back to a decimal string.
pub mod chain_id_number {
    use alloy_primitives::U256;
    use serde::Serializer;

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match u64::try_from(*value) {
            Ok(id) => serializer.serialize_u64(id),
            Err(_) => serializer.serialize_str(&value.to_string()),
        }
    }
}
