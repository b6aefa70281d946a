//! Trip export parsing
//!
//! Reads the CSV files written by the recording app. Each file carries:
//!
//! ```text
//! line 0: column names
//! line 1: metadata    (column 5 = total time in epoch ms, column 6 = trip name)
//! line 2..: samples   (latitude, longitude, altitude, speed m/s, time epoch ms)
//! ```

mod csv_parser;
mod error;

pub use csv_parser::{
    decode_epoch_millis, format_total_time, speed_to_kmh, CsvParser, ParsedTrip,
};
pub use error::{ParseError, ParseResult};
