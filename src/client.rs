//! Credential clients: one vendor exchange per call, no internal retry.

pub mod lease;
pub mod token;

pub use lease::*;
pub use token::*;
