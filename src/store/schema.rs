//! Table definitions

pub const TRIP_TABLE: &str = "trip_record";
pub const SAMPLE_TABLE: &str = "sample_record";

/// Creates both tables if absent
pub const CREATE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS trip_record (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        total_time TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS sample_record (
        id INTEGER PRIMARY KEY,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        altitude REAL NOT NULL,
        speed REAL NOT NULL,
        time TEXT NOT NULL,
        trip_id INTEGER REFERENCES trip_record(id)
    );

    CREATE INDEX IF NOT EXISTS idx_sample_trip ON sample_record(trip_id);
";

/// Drops both tables if present, children first
pub const DROP_SCHEMA: &str = "
    DROP TABLE IF EXISTS sample_record;
    DROP TABLE IF EXISTS trip_record;
";

pub const INSERT_TRIP: &str = "INSERT INTO trip_record (name, total_time) VALUES (?1, ?2)";

pub const INSERT_SAMPLE: &str = "
    INSERT INTO sample_record (latitude, longitude, altitude, speed, time, trip_id)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
";
