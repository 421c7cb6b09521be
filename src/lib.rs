//! `desist` library crate.
//!
//! The binary (`desist`) is a thin wrapper around this library so that:
//!
//! - the scoring core is testable without spawning processes
//! - the core (`features`, `models`, `scoring`, `io`) has no dependency on the
//!   front-ends (`cli`, `report`, `tui`)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod features;
pub mod io;
pub mod logging;
pub mod models;
pub mod report;
pub mod scoring;
pub mod tui;
