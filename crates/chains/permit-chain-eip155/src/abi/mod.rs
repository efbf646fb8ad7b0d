//! Hand-rolled ABI codecs for the handful of calls the permit flows make.
//!
//! Only fixed call shapes are supported: a 4-byte selector followed by
//! address arguments on the way out, and word-aligned return data on the way
//! back. See [`encode`] and [`decode`].

pub mod decode;
pub mod encode;

pub use decode::*;
pub use encode::*;
