//! Reporting utilities: formatted terminal output for results and artifacts.

pub mod format;

pub use format::*;
