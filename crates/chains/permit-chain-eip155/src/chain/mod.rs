//! Value types and the wallet/provider boundary for EVM chains.

pub mod provider;
pub mod types;

pub use provider::*;
pub use types::*;
