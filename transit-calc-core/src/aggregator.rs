//! Monthly commute aggregation over a set of routes.
//!
//! All trip durations are resolved up front when [`MonthlyCommutes::resolve`]
//! runs; afterwards the value is immutable and queries never touch the
//! [`DurationPort`] again.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::time::Duration as StdDuration;

use chrono::TimeDelta;
use futures::{StreamExt, TryStreamExt, stream};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::model::{Leg, Route, RouteDuration};
use crate::ports::{DurationPort, PortError};

/// Default number of lookups allowed to run at the same time.
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: NonZeroUsize = match NonZeroUsize::new(8) {
    Some(limit) => limit,
    None => NonZeroUsize::MIN,
};
/// Default time budget for a single lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: StdDuration = StdDuration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Tuning knobs for the resolution phase.
pub struct CommuteOptions {
    /// Upper bound on concurrently running lookups.
    pub max_concurrent_lookups: NonZeroUsize,
    /// Time budget per lookup; exceeding it fails the lookup.
    pub lookup_timeout: StdDuration,
}

impl Default for CommuteOptions {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

impl CommuteOptions {
    /// Replace the concurrency limit.
    #[must_use]
    pub fn with_max_concurrent_lookups(mut self, limit: NonZeroUsize) -> Self {
        self.max_concurrent_lookups = limit;
        self
    }

    /// Replace the per-lookup timeout.
    #[must_use]
    pub fn with_lookup_timeout(mut self, lookup_timeout: StdDuration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }
}

#[derive(thiserror::Error, Debug)]
/// Errors that abort building a [`MonthlyCommutes`].
pub enum CommuteError {
    /// The trip duration of a route could not be determined.
    #[error("Failed to resolve route {route}: {source}")]
    Unresolvable {
        /// Name of the first route that uses the failing leg.
        route: String,
        /// Underlying backend failure.
        #[source]
        source: PortError,
    },
    /// The monthly total does not fit into a duration.
    #[error("Monthly commute of route {0} is too large")]
    Overflow(String),
}

#[derive(Debug, Clone)]
/// Resolved monthly commutes for one request.
pub struct MonthlyCommutes {
    durations: HashMap<Leg, TimeDelta>,
    by_route: Vec<RouteDuration>,
    total: TimeDelta,
}

impl MonthlyCommutes {
    /// Resolve the trip duration of every route and aggregate the month.
    ///
    /// Routes sharing the same start and end are looked up once. Lookups run
    /// concurrently up to [`CommuteOptions::max_concurrent_lookups`]; the first
    /// failing lookup drops all outstanding ones.
    ///
    /// # Errors
    ///
    /// Returns [`CommuteError::Unresolvable`] if any lookup fails or times out,
    /// and [`CommuteError::Overflow`] if a monthly total cannot be represented.
    pub async fn resolve(
        routes: Vec<Route>,
        port: &dyn DurationPort,
        options: &CommuteOptions,
    ) -> Result<Self, CommuteError> {
        let mut seen = HashSet::new();
        let pending: Vec<(Leg, String)> = routes
            .iter()
            .filter(|route| seen.insert(route.leg()))
            .map(|route| (route.leg(), route.name.clone()))
            .collect();
        let lookups = pending.len();

        let durations = stream::iter(pending)
            .map(|(leg, route)| lookup(port, leg, route, options.lookup_timeout))
            .buffer_unordered(options.max_concurrent_lookups.get())
            .try_collect::<HashMap<_, _>>()
            .await
            .inspect_err(|err| warn!(error = %err, "monthly commute resolution failed"))?;

        let by_route = group_by_name(&routes, &durations)?;
        let total = by_route
            .iter()
            .try_fold(TimeDelta::zero(), |sum, group| {
                sum.checked_add(&group.total_duration)
                    .ok_or_else(|| CommuteError::Overflow(group.name.clone()))
            })?;

        info!(
            routes = routes.len(),
            lookups,
            total_minutes = total.num_minutes(),
            "monthly commute aggregated"
        );

        Ok(Self {
            durations,
            by_route,
            total,
        })
    }

    /// One-way trip time resolved for `route`, if the route was part of this aggregation.
    #[must_use]
    pub fn trip_duration(&self, route: &Route) -> Option<TimeDelta> {
        self.durations.get(&route.leg()).copied()
    }

    /// Monthly commute per route name, in order of first appearance.
    #[must_use]
    pub fn total_duration_by_route(&self) -> &[RouteDuration] {
        &self.by_route
    }

    /// Grand monthly commute time over all routes.
    #[must_use]
    pub fn total_duration(&self) -> TimeDelta {
        self.total
    }
}

async fn lookup(
    port: &dyn DurationPort,
    leg: Leg,
    route: String,
    lookup_timeout: StdDuration,
) -> Result<(Leg, TimeDelta), CommuteError> {
    debug!(route = %route, start = %leg.start, end = %leg.end, "resolving trip duration");

    let resolved = match timeout(lookup_timeout, port.duration(&leg.start, &leg.end)).await {
        Ok(resolved) => resolved,
        Err(_elapsed) => Err(PortError::Timeout(lookup_timeout)),
    };

    match resolved {
        Ok(duration) if duration < TimeDelta::zero() => Err(CommuteError::Unresolvable {
            route,
            source: PortError::InvalidDuration(duration),
        }),
        Ok(duration) => Ok((leg, duration)),
        Err(source) => Err(CommuteError::Unresolvable { route, source }),
    }
}

// A group reports the trip time of its first entry; its total adds up every entry's own legs.
fn group_by_name(
    routes: &[Route],
    durations: &HashMap<Leg, TimeDelta>,
) -> Result<Vec<RouteDuration>, CommuteError> {
    let mut groups: Vec<RouteDuration> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for route in routes {
        let per_trip = durations
            .get(&route.leg())
            .copied()
            .ok_or_else(|| CommuteError::Unresolvable {
                route: route.name.clone(),
                source: PortError::Internal("duration missing after resolution".to_owned()),
            })?;
        let contribution = monthly_total(per_trip, route.times_per_month)
            .ok_or_else(|| CommuteError::Overflow(route.name.clone()))?;

        match index
            .get(route.name.as_str())
            .and_then(|position| groups.get_mut(*position))
        {
            Some(group) => {
                group.total_duration = group
                    .total_duration
                    .checked_add(&contribution)
                    .ok_or_else(|| CommuteError::Overflow(route.name.clone()))?;
            }
            None => {
                index.insert(route.name.as_str(), groups.len());
                groups.push(RouteDuration {
                    name: route.name.clone(),
                    total_duration: contribution,
                    duration_per_trip: per_trip,
                });
            }
        }
    }

    Ok(groups)
}

fn monthly_total(per_trip: TimeDelta, trips: u32) -> Option<TimeDelta> {
    per_trip
        .num_milliseconds()
        .checked_mul(i64::from(trips))
        .and_then(TimeDelta::try_milliseconds)
}
