use alloy_primitives::Address;
use permit_types::error::{ErrorKind, ValidationError};
use permit_types::timestamp::UnixTimestamp;

use crate::abi::AbiDecodeError;
use crate::chain::ProviderError;

/// Failure of an EVM signing pipeline step.
#[derive(Debug, thiserror::Error)]
pub enum Eip155Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("ABI decoding failed: {0}")]
    Decode(#[from] AbiDecodeError),
    #[error("Provider call {method} failed: {source}")]
    Rpc {
        method: &'static str,
        #[source]
        source: ProviderError,
    },
    #[error("Malformed {method} result: {reason}")]
    MalformedResponse {
        method: &'static str,
        reason: String,
    },
    #[error("No connected account available to sign with")]
    NoAccount,
    #[error("Could not resolve EIP-712 domain of token {token}: {source}")]
    DomainResolution {
        token: Address,
        #[source]
        source: Box<Eip155Error>,
    },
    #[error("Permit deadline {deadline} is not valid {buffer_secs}s after {now}")]
    DeadlinePassed {
        deadline: UnixTimestamp,
        now: UnixTimestamp,
        buffer_secs: u64,
    },
    #[error("Signature recovery failed: {0}")]
    Recovery(#[from] alloy_primitives::SignatureError),
    #[error("Typed data serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Eip155Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Eip155Error::Validation(_) => ErrorKind::Validation,
            Eip155Error::Decode(AbiDecodeError::ValueOutOfRange { .. }) => ErrorKind::Validation,
            Eip155Error::Decode(_) => ErrorKind::Rpc,
            Eip155Error::Rpc { .. } => ErrorKind::Rpc,
            Eip155Error::MalformedResponse { .. } => ErrorKind::Rpc,
            Eip155Error::NoAccount => ErrorKind::Connection,
            Eip155Error::DomainResolution { .. } => ErrorKind::DomainResolution,
            Eip155Error::DeadlinePassed { .. } => ErrorKind::StaleData,
            Eip155Error::Recovery(_) => ErrorKind::Validation,
            Eip155Error::Serialization(_) => ErrorKind::Validation,
        }
    }
}
