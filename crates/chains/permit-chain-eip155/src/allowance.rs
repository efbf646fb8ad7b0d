//! Pure allowance and deadline checks.
//!
//! The caller decides whether a fresh signature is needed by comparing what
//! is already approved on chain with what a payment requires.

use alloy_primitives::U256;
use alloy_primitives::aliases::{U48, U160};
use serde::Serialize;

use crate::chain::decimal_uint;
use permit_types::timestamp::UnixTimestamp;

/// ERC-20 allowance check: `allowance >= required`.
pub fn is_allowance_sufficient(allowance: U256, required: U256) -> bool {
    allowance >= required
}

/// EIP-2612 deadline check: still valid `buffer_secs` from `now`.
pub fn is_permit_valid(deadline: UnixTimestamp, now: UnixTimestamp, buffer_secs: u64) -> bool {
    deadline >= now + buffer_secs
}

/// Decoded Permit2 `allowance(owner, token, spender)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permit2Allowance {
    #[serde(with = "decimal_uint")]
    pub amount: U160,
    #[serde(with = "decimal_uint")]
    pub expiration: U48,
    #[serde(with = "decimal_uint")]
    pub nonce: U48,
}

impl From<(U160, U48, U48)> for Permit2Allowance {
    fn from((amount, expiration, nonce): (U160, U48, U48)) -> Self {
        Self {
            amount,
            expiration,
            nonce,
        }
    }
}

impl Permit2Allowance {
    pub fn expiration(&self) -> UnixTimestamp {
        UnixTimestamp::from_secs(self.expiration.to::<u64>())
    }

    /// Enough `amount`, and not expiring within `buffer_secs` of `now`.
    pub fn is_sufficient(&self, required: U256, now: UnixTimestamp, buffer_secs: u64) -> bool {
        U256::from(self.amount) >= required && self.expiration() >= now + buffer_secs
    }
}
