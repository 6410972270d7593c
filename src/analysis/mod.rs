//! Analysis modules.
//!
//! Sample aggregation over loaded datasets and the descriptive
//! statistics computed on the aggregated groups.

pub mod aggregator;
pub mod stats;

pub use aggregator::*;
