//! Report generation.
//!
//! Output documents built from an aggregated dashboard.

pub mod generator;

pub use generator::*;
