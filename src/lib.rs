//! `price-forecast` library crate.
//!
//! The binary (`pf`) is a thin wrapper around this library so that:
//!
//! - the feature pipeline and models are testable without spawning processes
//! - a network front-end can reuse the same registry and responses
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod discount;
pub mod domain;
pub mod encoding;
pub mod error;
pub mod features;
pub mod io;
pub mod logging;
pub mod math;
pub mod registry;
pub mod report;
pub mod revenue;
pub mod train;
