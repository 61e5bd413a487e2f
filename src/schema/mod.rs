//! Schema module - Configuration, candidate and lineage types for evolution runs.

mod candidate;
mod config;
mod lineage;
mod progress;

pub use candidate::*;
pub use config::*;
pub use lineage::*;
pub use progress::*;
