#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types shared by the permit-signer chain crates.
//!
//! This crate is chain-agnostic. It holds the pieces every signing pipeline
//! needs regardless of whether it ends in an EIP-712 signature or a signed
//! Solana transaction.
//!
//! # Modules
//!
//! - [`config`] - Signing defaults loaded from JSON, with `$VAR` resolution
//! - [`error`] - The shared error taxonomy and input validation errors
//! - [`timestamp`] - Unix timestamps and injectable clocks
//! - [`util`] - Hex and base64 codecs

pub mod config;
pub mod error;
pub mod timestamp;
pub mod util;
