//! Duration backend answering lookups from a pre-computed travel time table.
//!
//! The table is a TOML document listing one-way legs:
//!
//! ```toml
//! symmetric = true
//!
//! [[leg]]
//! from = "Kamppi, Helsinki"
//! to = "Pasila, Helsinki"
//! minutes = 12
//! ```
//!
//! Addresses are compared after trimming, collapsing inner whitespace, and
//! lowercasing. With `symmetric` (the default) every leg also answers the
//! reverse direction unless that direction is listed explicitly.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::TimeDelta;
use serde::Deserialize;
use tracing::{debug, info};

use transit_calc_core::{
    model::Location,
    ports::{DurationPort, PortError},
};

/// Top-level layout of a table file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableFile {
    #[serde(default = "default_symmetric")]
    symmetric: bool,
    #[serde(default, rename = "leg")]
    legs: Vec<LegEntry>,
}

/// Single `[[leg]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LegEntry {
    from: String,
    to: String,
    minutes: Option<u32>,
    seconds: Option<u32>,
}

fn default_symmetric() -> bool {
    true
}

#[derive(thiserror::Error, Debug)]
/// Errors raised while loading a travel time table.
pub enum TableError {
    /// The table file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The document is not a valid table.
    #[error("Invalid table: {0}")]
    Parse(#[from] toml::de::Error),
    /// A leg has neither `minutes` nor `seconds`.
    #[error("Leg {from} -> {to} has no duration")]
    MissingDuration {
        /// Origin address.
        from: String,
        /// Destination address.
        to: String,
    },
    /// A leg sets both `minutes` and `seconds`.
    #[error("Leg {from} -> {to} sets both minutes and seconds")]
    AmbiguousDuration {
        /// Origin address.
        from: String,
        /// Destination address.
        to: String,
    },
    /// The same leg is listed twice with different durations.
    #[error("Leg {from} -> {to} is listed with conflicting durations")]
    Conflict {
        /// Origin address.
        from: String,
        /// Destination address.
        to: String,
    },
}

/// Travel time lookups backed by an in-memory table.
#[derive(Debug, Clone, Default)]
pub struct TableDurationPort {
    known: HashSet<String>,
    legs: HashMap<(String, String), TimeDelta>,
}

impl TableDurationPort {
    /// Load a table from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] if the file cannot be read or is not a valid table.
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let raw = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let port = Self::from_toml_str(&raw)?;
        info!(path = %path.display(), legs = port.len(), "travel time table loaded");
        Ok(port)
    }

    /// Parse a table from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] if the document is malformed, a leg has no
    /// unambiguous duration, or a leg is listed twice with different durations.
    pub fn from_toml_str(raw: &str) -> Result<Self, TableError> {
        let file: TableFile = toml::from_str(raw)?;

        let mut port = Self::default();
        let mut mirrored = Vec::new();
        for entry in file.legs {
            let duration = match (entry.minutes, entry.seconds) {
                (Some(minutes), None) => TimeDelta::minutes(i64::from(minutes)),
                (None, Some(seconds)) => TimeDelta::seconds(i64::from(seconds)),
                (None, None) => {
                    return Err(TableError::MissingDuration {
                        from: entry.from,
                        to: entry.to,
                    });
                }
                (Some(_), Some(_)) => {
                    return Err(TableError::AmbiguousDuration {
                        from: entry.from,
                        to: entry.to,
                    });
                }
            };

            let from = normalize(&entry.from);
            let to = normalize(&entry.to);
            port.known.insert(from.clone());
            port.known.insert(to.clone());

            match port.legs.entry((from.clone(), to.clone())) {
                Entry::Occupied(existing) if *existing.get() != duration => {
                    return Err(TableError::Conflict {
                        from: entry.from,
                        to: entry.to,
                    });
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(duration);
                }
            }
            if file.symmetric {
                mirrored.push(((to, from), duration));
            }
        }

        // explicit entries win over mirrored ones
        for (key, duration) in mirrored {
            port.legs.entry(key).or_insert(duration);
        }

        Ok(port)
    }

    /// Number of directed legs the table can answer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    /// Whether the table has no legs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}

#[async_trait]
impl DurationPort for TableDurationPort {
    async fn duration(&self, start: &Location, end: &Location) -> Result<TimeDelta, PortError> {
        let from = normalize(&start.address);
        let to = normalize(&end.address);
        if from == to {
            return Ok(TimeDelta::zero());
        }

        for (key, location) in [(&from, start), (&to, end)] {
            if !self.known.contains(key) {
                return Err(PortError::AddressNotFound(location.address.clone()));
            }
        }

        let duration = self.legs.get(&(from, to)).copied().ok_or_else(|| PortError::NoRoute {
            start: start.address.clone(),
            end: end.address.clone(),
        })?;
        debug!(start = %start, end = %end, seconds = duration.num_seconds(), "table lookup");
        Ok(duration)
    }
}

fn normalize(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
