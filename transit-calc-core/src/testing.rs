//! Deterministic duration backends for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::TimeDelta;
use tokio::time::sleep;

use crate::model::Location;
use crate::ports::{DurationPort, PortError};

/// Table-backed port that counts calls and can be told to stall or fail.
#[derive(Default)]
pub(crate) struct StubPort {
    minutes: HashMap<(String, String), i64>,
    failing: HashSet<String>,
    delay: Option<StdDuration>,
    slow: HashMap<String, StdDuration>,
    pub(crate) calls: AtomicUsize,
    pub(crate) completed: AtomicUsize,
    in_flight: AtomicUsize,
    pub(crate) max_in_flight: AtomicUsize,
}

impl StubPort {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn leg(mut self, start: &str, end: &str, minutes: i64) -> Self {
        self.minutes
            .insert((start.to_owned(), end.to_owned()), minutes);
        self
    }

    /// Every lookup ending at `end` fails immediately.
    pub(crate) fn failing(mut self, end: &str) -> Self {
        self.failing.insert(end.to_owned());
        self
    }

    /// Every lookup sleeps for `delay` before answering.
    pub(crate) fn delayed(mut self, delay: StdDuration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Lookups ending at `end` sleep for `delay` before answering.
    pub(crate) fn slow(mut self, end: &str, delay: StdDuration) -> Self {
        self.slow.insert(end.to_owned(), delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DurationPort for StubPort {
    async fn duration(&self, start: &Location, end: &Location) -> Result<TimeDelta, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&end.address) {
            return Err(PortError::AddressNotFound(end.address.clone()));
        }

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.slow.get(&end.address).copied().or(self.delay) {
            sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);

        self.minutes
            .get(&(start.address.clone(), end.address.clone()))
            .map(|minutes| TimeDelta::minutes(*minutes))
            .ok_or_else(|| PortError::NoRoute {
                start: start.address.clone(),
                end: end.address.clone(),
            })
    }
}
