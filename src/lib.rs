//! Off-chain permit signatures for EVM and Solana.
//!
//! This crate ties together the chain crates of the workspace:
//!
//! - [`permit_chain_eip155`] (re-exported as [`eip155`]) signs EIP-2612
//!   `permit` and Uniswap Permit2 `PermitSingle` messages through an
//!   EIP-1193 provider, with hand-rolled ABI encoding and decoding.
//! - [`permit_chain_solana`] (re-exported as [`solana`]) signs SPL Token
//!   delegate approvals issued by a payment backend through an injected
//!   wallet.
//! - [`permit_types`] (re-exported as [`types`]) holds the codecs, clocks,
//!   error taxonomy and [`SigningConfig`](types::config::SigningConfig).
//!
//! [`PermitSigner`] applies a [`SigningConfig`](types::config::SigningConfig)
//! to both pipelines, and [`telemetry::Telemetry`] prints their logs.
//!
//! # Example
//!
//! ```no_run
//! use permit_signer::PermitSigner;
//! use permit_signer::telemetry::Telemetry;
//!
//! Telemetry::new().init();
//! let signer = PermitSigner::from_env().unwrap();
//! println!("Permit2 at {}", signer.permit2_address());
//! ```
//!
//! # Feature Flags
//!
//! - `telemetry` - Tracing spans around provider calls and signing flows

pub mod signer;
pub mod telemetry;

pub use permit_chain_eip155 as eip155;
pub use permit_chain_solana as solana;
pub use permit_types as types;

pub use permit_types::error::ErrorKind;
pub use signer::PermitSigner;
