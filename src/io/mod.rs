//! Input/output helpers.
//!
//! - model artifact loading + validation (`artifact`)

pub mod artifact;

pub use artifact::*;
