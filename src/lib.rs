//! # Tripbook
//!
//! Bicycle trip recordings: parse GPS-track CSV exports, persist them to
//! SQLite and hand them to a map renderer as in-memory trips.
//!
//! ## Modules
//!
//! - [`parser`]: CSV export reader
//! - [`store`]: Trip repository and its SQLite implementation
//! - [`trip`]: In-memory trip view (bounding box, pixel projection)
//! - [`manager`]: Orchestrates parser, store and the trip cache
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tripbook::{Config, Manager};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let mut manager = Manager::new(&config)?;
//!
//!     // Load every export of the trips directory into an empty database
//!     let files = manager.available_files()?;
//!     manager.bulk_ingest(files.as_slice())?;
//!
//!     // Build the in-memory trips
//!     manager.load_all_trips()?;
//!     for (id, trip) in manager.trips() {
//!         println!("{}: {:?}", manager.get_trip_name(id)?, trip.bounding_box()?);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod manager;
pub mod parser;
pub mod store;
pub mod trip;
pub mod types;

// Re-export top-level types for convenience
pub use config::{generate_default_config, Config, ConfigError, DataConfig, LoggingConfig};
pub use manager::{IngestReport, Manager, ManagerError, ManagerResult, TripSummary};
pub use parser::{CsvParser, ParseError, ParsedTrip};
pub use store::{SqliteTripStore, StoreError, StoreResult, TripRepository};
pub use trip::{BoundingBox, ColorMode, MapProjector, Trip, TripError};
pub use types::{SampleRow, TaggedSample, TripHeader, TripId, TripRecord};
