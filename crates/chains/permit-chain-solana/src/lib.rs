#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Solana SPL Token delegate approvals signed through an injected wallet.
//!
//! The payment backend builds the `approve` transaction; this crate checks
//! blockhash freshness, finds the wallet for the expected signer, has it sign,
//! and hands the transaction back as base64. It also reads the current
//! delegate of a token account so callers can skip signing when an approval
//! already covers a payment.
//!
//! # Modules
//!
//! - [`chain`] - Base58 addresses and token program ids
//! - [`wallet`] - Wallet traits with an explicit capability set
//! - [`registry`] - Ordered wallet discovery and connection
//! - [`delegate`] - Envelope types, blockhash freshness, signing, token account decoding
//! - [`error`] - Wallet, connection and signing errors
//!
//! # Feature Flags
//!
//! - `telemetry` - Adds a tracing span to delegate signing

pub mod chain;
pub mod delegate;
pub mod error;
pub mod registry;
pub mod wallet;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::SolanaSigningError;
