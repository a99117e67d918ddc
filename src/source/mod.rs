//! Payload sources.
//!
//! This module retrieves the raw risk payload, either from the scoring
//! API over HTTP or from a JSON file on disk, and rejects payloads the
//! aggregator cannot consume.

pub mod client;
pub mod error;

pub use client::{ApiClient, PayloadSource};
