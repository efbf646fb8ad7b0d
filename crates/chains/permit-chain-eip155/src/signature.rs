//! Raw 65-byte ECDSA signatures as returned by `eth_signTypedData_v4`.

use alloy_primitives::{Address, B256, Signature, U256};
use serde::Serialize;

use crate::error::Eip155Error;
use permit_types::error::ValidationError;
use permit_types::util::{decode_hex, encode_hex};

/// A signature split into `v`, `r` and `s`, with `v` in `{27, 28}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EvmSignature {
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

impl EvmSignature {
    /// Parses `0x`-prefixed hex of exactly 65 bytes: `r ++ s ++ v`.
    ///
    /// Wallets that return a bare recovery id (`0`/`1`) get it lifted to
    /// `27`/`28`. Any other `v` is rejected.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let bytes = decode_hex(raw)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        if bytes.len() != 65 {
            return Err(ValidationError::SignatureLength(bytes.len()));
        }
        let v = match bytes[64] {
            v @ (0 | 1) => v + 27,
            v @ (27 | 28) => v,
            other => return Err(ValidationError::RecoveryByte(other)),
        };
        Ok(Self {
            v,
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..64]),
        })
    }

    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(self.r.as_slice());
        out[32..64].copy_from_slice(self.s.as_slice());
        out[64] = self.v;
        out
    }

    pub fn to_hex(&self) -> String {
        encode_hex(self.to_bytes())
    }

    pub fn y_parity(&self) -> bool {
        self.v == 28
    }

    /// Recovers the address that signed the EIP-712 digest `hash`.
    pub fn recover_signer(&self, hash: &B256) -> Result<Address, Eip155Error> {
        let signature = Signature::new(
            U256::from_be_bytes(self.r.0),
            U256::from_be_bytes(self.s.0),
            self.y_parity(),
        );
        Ok(signature.recover_address_from_prehash(hash)?)
    }
}
