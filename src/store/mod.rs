//! Trip persistence
//!
//! Two tables linked by a foreign key:
//!
//! ```text
//! trip_record   (id, name, total_time)
//!     ^
//!     | trip_id
//! sample_record (id, latitude, longitude, altitude, speed, time, trip_id)
//! ```
//!
//! The [`TripRepository`] trait is the only thing the manager depends on;
//! [`SqliteTripStore`] is the SQLite implementation.

mod error;
mod schema;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteTripStore;

use crate::types::{tag_samples, SampleRow, TaggedSample, TripId, TripRecord};
use chrono::NaiveTime;

/// Repository over stored trips and their samples
pub trait TripRepository {
    /// Create both tables if absent
    fn create_schema(&mut self) -> StoreResult<()>;

    /// Drop both tables if present
    fn drop_schema(&mut self) -> StoreResult<()>;

    /// Whether both tables exist
    fn has_schema(&self) -> StoreResult<bool>;

    /// True iff no trip is stored
    fn is_empty(&self) -> StoreResult<bool>;

    /// Insert one trip and commit; `total_time` is `HH:MM:SS`
    fn add_trip(&mut self, name: &str, total_time: &str) -> StoreResult<TripId>;

    /// Insert samples already tagged with their trip in a single transaction
    fn insert_samples(&mut self, samples: &[TaggedSample]) -> StoreResult<()>;

    /// Insert samples of one trip in a single transaction
    fn bulk_add_samples(&mut self, samples: &[SampleRow], trip_id: TripId) -> StoreResult<()> {
        self.insert_samples(&tag_samples(samples, trip_id))
    }

    /// All trip ids, ascending
    fn list_trip_ids(&self) -> StoreResult<Vec<TripId>>;

    /// All trips, ascending by id
    fn list_trips(&self) -> StoreResult<Vec<TripRecord>>;

    /// Highest trip id, 0 when empty
    fn max_trip_id(&self) -> StoreResult<TripId>;

    fn get_trip_name(&self, trip_id: TripId) -> StoreResult<String>;

    fn get_trip_total_time(&self, trip_id: TripId) -> StoreResult<NaiveTime>;

    /// Samples of a trip in insertion order; empty if there are none
    fn get_trip_samples(&self, trip_id: TripId) -> StoreResult<Vec<SampleRow>>;

    fn count_samples(&self) -> StoreResult<u64>;

    /// Delete every row of both tables in one transaction
    fn clear_all(&mut self) -> StoreResult<()>;
}
