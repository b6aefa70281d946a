//! SQLite trip store
//!
//! One connection per store. Every write runs in its own transaction; nothing
//! spans several calls.

use super::error::{StoreError, StoreResult};
use super::schema::{
    CREATE_SCHEMA, DROP_SCHEMA, INSERT_SAMPLE, INSERT_TRIP, SAMPLE_TABLE, TRIP_TABLE,
};
use super::TripRepository;
use crate::types::{SampleRow, TaggedSample, TripId, TripRecord};
use chrono::NaiveTime;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};

/// `TripRepository` backed by a SQLite database
pub struct SqliteTripStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteTripStore {
    /// Open or create a database file and make sure the tables exist
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        tracing::debug!("Opened trip database at {:?}", path);
        Self::init(conn, Some(path))
    }

    /// In-memory database, gone when the store is dropped
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut store = Self { conn, path };
        store.create_schema()?;
        Ok(store)
    }

    /// Database file path, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl TripRepository for SqliteTripStore {
    fn create_schema(&mut self) -> StoreResult<()> {
        self.conn.execute_batch(CREATE_SCHEMA)?;
        Ok(())
    }

    fn drop_schema(&mut self) -> StoreResult<()> {
        self.conn.execute_batch(DROP_SCHEMA)?;
        tracing::debug!("Dropped trip tables");
        Ok(())
    }

    fn has_schema(&self) -> StoreResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN (?1, ?2)",
            params![TRIP_TABLE, SAMPLE_TABLE],
            |row| row.get(0),
        )?;
        Ok(count == 2)
    }

    fn is_empty(&self) -> StoreResult<bool> {
        let first: Option<TripId> = self
            .conn
            .query_row("SELECT id FROM trip_record LIMIT 1", [], |row| row.get(0))
            .optional()?;
        Ok(first.is_none())
    }

    fn add_trip(&mut self, name: &str, total_time: &str) -> StoreResult<TripId> {
        let total_time = NaiveTime::parse_from_str(total_time, "%H:%M:%S")
            .map_err(|_| StoreError::InvalidTime(total_time.to_string()))?;

        let tx = self.conn.transaction()?;
        tx.execute(INSERT_TRIP, params![name, total_time])?;
        let trip_id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::debug!("Inserted trip {} ({:?})", trip_id, name);
        Ok(trip_id)
    }

    fn insert_samples(&mut self, samples: &[TaggedSample]) -> StoreResult<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_SAMPLE)?;
            for sample in samples {
                let row = &sample.row;
                stmt.execute(params![
                    row.latitude,
                    row.longitude,
                    row.altitude,
                    row.speed,
                    row.time,
                    sample.trip_id
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!("Inserted {} samples", samples.len());
        Ok(())
    }

    fn list_trip_ids(&self) -> StoreResult<Vec<TripId>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id FROM trip_record ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<TripId>, _>>()?;
        Ok(ids)
    }

    fn list_trips(&self) -> StoreResult<Vec<TripRecord>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id, name, total_time FROM trip_record ORDER BY id")?;
        let trips = stmt
            .query_map([], |row| {
                Ok(TripRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    total_time: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(trips)
    }

    fn max_trip_id(&self) -> StoreResult<TripId> {
        let max: TripId =
            self.conn
                .query_row("SELECT COALESCE(MAX(id), 0) FROM trip_record", [], |row| {
                    row.get(0)
                })?;
        Ok(max)
    }

    fn get_trip_name(&self, trip_id: TripId) -> StoreResult<String> {
        self.conn
            .query_row(
                "SELECT name FROM trip_record WHERE id = ?1",
                params![trip_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StoreError::NotFound(trip_id))
    }

    fn get_trip_total_time(&self, trip_id: TripId) -> StoreResult<NaiveTime> {
        self.conn
            .query_row(
                "SELECT total_time FROM trip_record WHERE id = ?1",
                params![trip_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StoreError::NotFound(trip_id))
    }

    fn get_trip_samples(&self, trip_id: TripId) -> StoreResult<Vec<SampleRow>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT latitude, longitude, altitude, speed, time FROM sample_record
             WHERE trip_id = ?1
             ORDER BY id",
        )?;
        let samples = stmt
            .query_map(params![trip_id], |row| {
                Ok(SampleRow {
                    latitude: row.get(0)?,
                    longitude: row.get(1)?,
                    altitude: row.get(2)?,
                    speed: row.get(3)?,
                    time: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(samples)
    }

    fn count_samples(&self) -> StoreResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM sample_record", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn clear_all(&mut self) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM sample_record", [])?;
        tx.execute("DELETE FROM trip_record", [])?;
        tx.commit()?;

        tracing::info!("Cleared all trips");
        Ok(())
    }
}
