//! Trait describing the travel time capability and its error type.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::TimeDelta;

use crate::model::Location;

#[derive(thiserror::Error, Debug)]
/// Errors a duration backend can report for a single lookup.
pub enum PortError {
    /// The address could not be resolved to a place.
    #[error("Address not found: {0}")]
    AddressNotFound(String),
    /// Both ends are known but no transit connection exists between them.
    #[error("No route from {start} to {end}")]
    NoRoute {
        /// Origin address.
        start: String,
        /// Destination address.
        end: String,
    },
    /// The lookup did not finish within the allotted time.
    #[error("Lookup timed out after {0:?}")]
    Timeout(StdDuration),
    /// The backend produced a duration that cannot be a trip time.
    #[error("Invalid duration: {0}")]
    InvalidDuration(TimeDelta),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
/// Backend resolving the expected one-way trip time between two locations.
pub trait DurationPort: Send + Sync {
    /// Resolve the travel time from `start` to `end`.
    ///
    /// Implementations are called at most once per distinct leg of a request,
    /// so retries for transient failures belong here rather than in callers.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when no duration can be determined.
    async fn duration(&self, start: &Location, end: &Location) -> Result<TimeDelta, PortError>;
}
