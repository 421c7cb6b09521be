//! Feature derivation and row assembly.

pub mod builder;
pub mod ratios;

pub use builder::*;
pub use ratios::*;
