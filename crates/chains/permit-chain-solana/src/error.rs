use permit_types::error::{ErrorKind, ValidationError};

use crate::chain::Address;
use crate::wallet::WalletCapability;

/// A wallet refused or failed an operation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WalletError {
    #[error("Wallet rejected the request: {0}")]
    Rejected(String),
    #[error("Wallet is not connected")]
    NotConnected,
    #[error("Wallet does not support {0:?}")]
    Unsupported(WalletCapability),
}

/// No usable wallet for the expected address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("Wallet is not connected")]
    NotConnected,
    #[error("Connected wallet {actual} does not match expected {expected}")]
    Mismatch { expected: Address, actual: Address },
    #[error("No wallet found for {expected}")]
    NotFound { expected: Address },
}

#[derive(Debug, thiserror::Error)]
pub enum SolanaSigningError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid transaction bytes: {0}")]
    Transaction(#[from] bincode::Error),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("Wallet signing failed: {0}")]
    Wallet(#[from] WalletError),
    #[error("Blockhash expires at {expires_at_ms}ms, within {buffer_ms}ms of {now_ms}ms")]
    BlockhashExpired {
        expires_at_ms: u64,
        now_ms: u64,
        buffer_ms: u64,
    },
    #[error("Invalid token account: {0}")]
    InvalidTokenAccount(String),
}

impl SolanaSigningError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SolanaSigningError::Validation(_) => ErrorKind::Validation,
            SolanaSigningError::Transaction(_) => ErrorKind::Validation,
            SolanaSigningError::Connection(_) => ErrorKind::Connection,
            SolanaSigningError::Wallet(WalletError::NotConnected) => ErrorKind::Connection,
            SolanaSigningError::Wallet(_) => ErrorKind::Rpc,
            SolanaSigningError::BlockhashExpired { .. } => ErrorKind::StaleData,
            SolanaSigningError::InvalidTokenAccount(_) => ErrorKind::Validation,
        }
    }
}
