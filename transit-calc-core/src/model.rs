//! Domain data structures for locations, commute routes, and their durations.

use std::fmt;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// A place identified by its free-form address text.
pub struct Location {
    /// Address as given by the caller.
    pub address: String,
}

impl Location {
    /// Create a location from an address.
    #[must_use]
    pub fn new<A: Into<String>>(address: A) -> Self {
        Self {
            address: address.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.address)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// A recurring one-way commute leg and how often it is travelled per month.
pub struct Route {
    /// Label used to group the route in the monthly breakdown.
    pub name: String,
    /// Where the trip starts, usually home.
    pub start: Location,
    /// Where the trip ends.
    pub end: Location,
    /// Number of trips per month.
    pub times_per_month: u32,
}

impl Route {
    /// Construct a new route.
    #[must_use]
    pub fn new<N: Into<String>>(
        name: N,
        start: Location,
        end: Location,
        times_per_month: u32,
    ) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            times_per_month,
        }
    }

    /// The (start, end) pair used as the lookup key for this route's trip duration.
    #[must_use]
    pub fn leg(&self) -> Leg {
        Leg {
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Directed pair of locations; two routes with equal legs share one duration lookup.
pub struct Leg {
    /// Origin.
    pub start: Location,
    /// Destination.
    pub end: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Monthly commute time of one named route group.
pub struct RouteDuration {
    /// Route name shared by every entry in the group.
    pub name: String,
    /// Time spent on this route over a month.
    pub total_duration: TimeDelta,
    /// One-way trip time.
    pub duration_per_trip: TimeDelta,
}
