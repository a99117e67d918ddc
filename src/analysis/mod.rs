//! Analysis modules.
//!
//! Aggregation of a risk payload into the dashboard view, plus the
//! serialized collections that accompany it.

pub mod aggregator;
pub mod export;

pub use aggregator::*;
pub use export::*;
