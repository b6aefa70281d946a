//! Core data types shared by the parser, the store and the manager
//!
//! - `SampleRow`: one GPS/speed/altitude reading
//! - `TripHeader`: the metadata row of an exported trip
//! - `TripRecord`: a stored trip
//! - `TaggedSample`: a sample bound to the trip it belongs to

use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Identifier assigned by the store (SQLite rowid)
pub type TripId = i64;

/// A single timestamped reading of a trip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRow {
    /// Degrees
    pub latitude: f64,
    /// Degrees
    pub longitude: f64,
    /// Meters
    pub altitude: f64,
    /// Kilometers per hour
    pub speed: f64,
    /// UTC, whole seconds
    pub time: NaiveDateTime,
}

/// Trip metadata read from the first data row of an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripHeader {
    pub name: String,
    /// Total elapsed time formatted as `HH:MM:SS`
    pub total_time: String,
}

/// A trip as stored in the `trip_record` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripRecord {
    pub id: TripId,
    pub name: String,
    pub total_time: NaiveTime,
}

/// A sample tagged with its owning trip, ready for insertion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedSample {
    pub trip_id: TripId,
    pub row: SampleRow,
}

impl TaggedSample {
    pub fn new(trip_id: TripId, row: SampleRow) -> Self {
        Self { trip_id, row }
    }
}

/// Tag every row of a trip with the same id
pub fn tag_samples(rows: &[SampleRow], trip_id: TripId) -> Vec<TaggedSample> {
    rows.iter().map(|row| TaggedSample::new(trip_id, *row)).collect()
}
