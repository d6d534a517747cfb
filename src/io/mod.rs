//! Input/output helpers.
//!
//! - CSV ingest + schema validation (`ingest`)
//! - feature table / coefficient exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
