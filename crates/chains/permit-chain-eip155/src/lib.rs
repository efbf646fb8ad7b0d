#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EVM permit signing: EIP-2612 `permit` and Uniswap Permit2 `PermitSingle`.
//!
//! This crate talks to the chain only through an EIP-1193 wallet/provider
//! ([`chain::Eip1193Provider`]). Contract calls are encoded and decoded by
//! hand in [`abi`]; there is no general ABI coder and no transaction
//! submission.
//!
//! # Modules
//!
//! - [`abi`] - Call data for the fixed read calls and a bounds-checked return-data decoder
//! - [`chain`] - The EIP-1193 boundary and address/integer wire forms
//! - [`domain`] - EIP-712 domain resolution per token
//! - [`typed_data`] - `eth_signTypedData_v4` payloads and local signing hashes
//! - [`signature`] - 65-byte `v, r, s` signatures
//! - [`allowance`] - Allowance and deadline checks
//! - [`erc20`] - EIP-2612 permit flow
//! - [`permit2`] - Permit2 `PermitSingle` flow
//!
//! # Feature Flags
//!
//! - `telemetry` - Adds tracing spans to provider calls and signing flows

pub mod abi;
pub mod allowance;
pub mod chain;
pub mod domain;
pub mod erc20;
pub mod error;
pub mod permit2;
pub mod signature;
pub mod typed_data;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::Eip155Error;
