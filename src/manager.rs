//! Trip Manager - Coordinates parsing, storage and the trip cache
//!
//! ```text
//! CSV files --CsvParser--> header + samples --TripRepository--> SQLite
//!                                                   |
//!                        cache (TripId -> Trip) <---+ load_all_trips
//! ```
//!
//! # Ingest ids
//!
//! Samples are tagged with the id the trip is *expected* to get: its 1-based
//! position in the file list, offset by the highest stored id for
//! `insert_trips`. This matches the store as long as ids are assigned
//! sequentially. A mismatch with the id the store actually returned is logged
//! and left as is.
//!
//! # Atomicity
//!
//! Ingest is not atomic. Each trip row commits on its own and all samples of
//! the call go in one final write, so a failure part-way through leaves trip
//! rows without samples. Recovery is `clear_all` and a retry.

use crate::config::Config;
use crate::parser::{CsvParser, ParseError};
use crate::store::{SqliteTripStore, StoreError, TripRepository};
use crate::trip::{BoundingBox, ColorMode, Trip, TripError};
use crate::types::{tag_samples, TripId};
use chrono::NaiveTime;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

/// Errors surfaced by manager operations
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Trip error: {0}")]
    Trip(#[from] TripError),

    /// Cached trips that no longer exist in the store
    #[error("Trip cache out of sync with store, missing ids: {missing:?}")]
    Consistency { missing: Vec<TripId> },
}

/// Result type alias for manager operations
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Outcome of an ingest call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Ids the samples were tagged with, in file order
    pub trip_ids: Vec<TripId>,
    /// Samples written across all files
    pub samples: usize,
    /// The store already held trips and nothing was written
    pub skipped: bool,
}

/// Overview of a stored trip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSummary {
    pub id: TripId,
    pub name: String,
    pub total_time: NaiveTime,
    pub samples: usize,
    pub bounding_box: Option<BoundingBox>,
    pub speed_range: Option<(f64, f64)>,
    pub altitude_range: Option<(f64, f64)>,
}

/// Mediates between CSV exports, the trip store and in-memory trips
pub struct Manager<R: TripRepository = SqliteTripStore> {
    store: R,
    parser: CsvParser,
    trips: BTreeMap<TripId, Trip>,
}

impl Manager<SqliteTripStore> {
    /// Open the configured SQLite database and trips directory
    pub fn new(config: &Config) -> ManagerResult<Self> {
        let store = SqliteTripStore::open(&config.data.database_path)?;
        let parser = CsvParser::from_config(&config.data);
        Ok(Self::with_store(parser, store))
    }
}

impl<R: TripRepository> Manager<R> {
    pub fn with_store(parser: CsvParser, store: R) -> Self {
        Self {
            store,
            parser,
            trips: BTreeMap::new(),
        }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut R {
        &mut self.store
    }

    pub fn parser(&self) -> &CsvParser {
        &self.parser
    }

    /// CSV files available in the trips directory
    pub fn available_files(&self) -> ManagerResult<Vec<String>> {
        Ok(self.parser.list_trip_files()?)
    }

    // ==================== Write Path ====================

    /// Load a set of exports into an empty store
    ///
    /// Does nothing (and reports `skipped`) if the store already holds trips.
    pub fn bulk_ingest<P: AsRef<Path>>(
        &mut self,
        filenames: &[P],
    ) -> ManagerResult<IngestReport> {
        self.store.create_schema()?;

        if !self.store.is_empty()? {
            tracing::warn!("Store already holds trips, skipping bulk ingest");
            return Ok(IngestReport {
                skipped: true,
                ..IngestReport::default()
            });
        }

        self.ingest(filenames, 0)
    }

    /// Add exports on top of the trips already stored
    pub fn insert_trips<P: AsRef<Path>>(
        &mut self,
        filenames: &[P],
    ) -> ManagerResult<IngestReport> {
        let max_id = self.get_max_trip_id()?;
        self.ingest(filenames, max_id)
    }

    fn ingest<P: AsRef<Path>>(
        &mut self,
        filenames: &[P],
        base_id: TripId,
    ) -> ManagerResult<IngestReport> {
        let mut report = IngestReport::default();
        let mut tagged = Vec::new();

        for (ordinal, file) in (1..).zip(filenames) {
            let file = file.as_ref();
            let header = self.parser.read_trip_header(file)?;
            let samples = self.parser.read_trip_samples(file)?;

            let trip_id = base_id + ordinal;
            let assigned = self.store.add_trip(&header.name, &header.total_time)?;
            if assigned != trip_id {
                tracing::warn!(
                    "Trip {:?} stored as id {} but its samples are tagged {}",
                    header.name,
                    assigned,
                    trip_id
                );
            }

            tracing::info!("Adding trip {} - id:{}", header.name, trip_id);
            tagged.extend(tag_samples(&samples, trip_id));
            report.trip_ids.push(trip_id);
        }

        self.store.insert_samples(&tagged)?;
        report.samples = tagged.len();

        tracing::info!(
            "Ingested {} trips ({} samples)",
            report.trip_ids.len(),
            report.samples
        );
        Ok(report)
    }

    /// Delete every stored trip
    ///
    /// The trip cache is left untouched; see [`Self::check_cache_consistency`].
    pub fn clear_all(&mut self) -> ManagerResult<()> {
        self.store.clear_all()?;
        Ok(())
    }

    // ==================== Read Path ====================

    /// Cache every stored trip that is not cached yet
    ///
    /// Returns the number of trips added to the cache. Already cached trips
    /// are not refreshed.
    pub fn load_all_trips(&mut self) -> ManagerResult<usize> {
        let mut loaded = 0;
        for trip_id in self.store.list_trip_ids()? {
            if self.trips.contains_key(&trip_id) {
                continue;
            }
            let trip = self.get_trip_samples(trip_id)?;
            self.trips.insert(trip_id, trip);
            loaded += 1;
        }

        tracing::debug!("Loaded {} trips into cache", loaded);
        Ok(loaded)
    }

    /// Cached trip by id
    pub fn trip(&self, trip_id: TripId) -> Option<&Trip> {
        self.trips.get(&trip_id)
    }

    /// Cached trips in id order
    pub fn trips(&self) -> impl Iterator<Item = (TripId, &Trip)> {
        self.trips.iter().map(|(id, trip)| (*id, trip))
    }

    pub fn clear_cache(&mut self) {
        self.trips.clear();
    }

    /// Fail if the cache holds trips the store no longer has
    pub fn check_cache_consistency(&self) -> ManagerResult<()> {
        let stored: BTreeSet<TripId> = self.store.list_trip_ids()?.into_iter().collect();
        let missing: Vec<TripId> = self
            .trips
            .keys()
            .filter(|id| !stored.contains(id))
            .copied()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ManagerError::Consistency { missing })
        }
    }

    pub fn list_trip_ids(&self) -> ManagerResult<Vec<TripId>> {
        Ok(self.store.list_trip_ids()?)
    }

    pub fn get_trip_name(&self, trip_id: TripId) -> ManagerResult<String> {
        Ok(self.store.get_trip_name(trip_id)?)
    }

    /// Read a trip straight from the store, bypassing the cache
    pub fn get_trip_samples(&self, trip_id: TripId) -> ManagerResult<Trip> {
        let samples = self.store.get_trip_samples(trip_id)?;
        Ok(Trip::from_samples(&samples))
    }

    /// Highest stored trip id, 0 when empty
    pub fn get_max_trip_id(&self) -> ManagerResult<TripId> {
        Ok(self.store.max_trip_id()?)
    }

    pub fn trip_summary(&self, trip_id: TripId) -> ManagerResult<TripSummary> {
        let name = self.store.get_trip_name(trip_id)?;
        let total_time = self.store.get_trip_total_time(trip_id)?;
        let trip = self.get_trip_samples(trip_id)?;

        Ok(TripSummary {
            id: trip_id,
            name,
            total_time,
            samples: trip.len(),
            bounding_box: trip.bounding_box().ok(),
            speed_range: trip.value_range(ColorMode::Speed),
            altitude_range: trip.value_range(ColorMode::Altitude),
        })
    }
}
