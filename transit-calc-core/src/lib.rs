//! Core types and service wiring for the transit-calc monthly commute estimator.

/// Monthly commute aggregation engine.
pub mod aggregator;
/// Request and response wire types.
pub mod api;
/// Domain models shared by all backends.
pub mod model;
/// Traits describing the duration backend.
pub mod ports;
/// High-level service facade used by entry points.
pub mod service;

#[cfg(test)]
mod testing;

pub use aggregator::*;
pub use api::*;
pub use model::*;
pub use ports::*;
pub use service::*;
