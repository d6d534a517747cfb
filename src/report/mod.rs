//! Reporting utilities: training summaries and model tables.

pub mod format;

pub use format::*;
