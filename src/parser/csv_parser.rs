//! CSV trip parser
//!
//! Positional reader for the recording app's export format. Column names in
//! the header line are ignored; only column positions matter.

use super::error::{ParseError, ParseResult};
use crate::config::DataConfig;
use crate::types::{SampleRow, TripHeader};
use chrono::{DateTime, NaiveDateTime};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Column holding the total trip time (epoch milliseconds) on the metadata row
const TOTAL_TIME_COLUMN: usize = 5;
/// Column holding the trip name on the metadata row
const NAME_COLUMN: usize = 6;
/// Latitude, longitude, altitude, speed, time
const SAMPLE_COLUMNS: usize = 5;

/// Parser for trip exports found under a trips directory
#[derive(Debug, Clone)]
pub struct CsvParser {
    trips_dir: PathBuf,
}

/// Header and samples of one export
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTrip {
    pub header: TripHeader,
    pub samples: Vec<SampleRow>,
}

impl CsvParser {
    /// Create a parser resolving relative file names against `trips_dir`
    pub fn new(trips_dir: impl Into<PathBuf>) -> Self {
        Self {
            trips_dir: trips_dir.into(),
        }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(&config.trips_dir)
    }

    pub fn trips_dir(&self) -> &Path {
        &self.trips_dir
    }

    /// Resolve a file name; absolute paths are returned unchanged
    pub fn resolve(&self, file: impl AsRef<Path>) -> PathBuf {
        self.trips_dir.join(file)
    }

    /// List the `.csv` files of the trips directory, sorted by name
    pub fn list_trip_files(&self) -> ParseResult<Vec<String>> {
        let entries = std::fs::read_dir(&self.trips_dir).map_err(|e| ParseError::Io {
            path: self.trips_dir.clone(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ParseError::Io {
                path: self.trips_dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            let is_csv = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if path.is_file() && is_csv {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Read the trip name and total time from the metadata row
    pub fn read_trip_header(&self, file: impl AsRef<Path>) -> ParseResult<TripHeader> {
        let reader = self.open(file.as_ref())?;
        Self::read_trip_header_from(reader)
    }

    /// Read every sample row of a trip, in file order
    pub fn read_trip_samples(&self, file: impl AsRef<Path>) -> ParseResult<Vec<SampleRow>> {
        let reader = self.open(file.as_ref())?;
        Self::read_trip_samples_from(reader)
    }

    /// Read header and samples of one export
    pub fn read_trip(&self, file: impl AsRef<Path>) -> ParseResult<ParsedTrip> {
        let file = file.as_ref();
        let header = self.read_trip_header(file)?;
        let samples = self.read_trip_samples(file)?;

        tracing::debug!(
            "Parsed {:?}: {:?}, {} samples",
            file,
            header.name,
            samples.len()
        );

        Ok(ParsedTrip { header, samples })
    }

    /// Read the metadata row from any reader
    pub fn read_trip_header_from<R: Read>(reader: R) -> ParseResult<TripHeader> {
        let mut reader = Self::csv_reader(reader);

        let record = match reader.records().next() {
            Some(record) => record?,
            None => return Err(ParseError::MissingRow),
        };
        let line = line_of(&record);

        let raw_time = field(&record, line, TOTAL_TIME_COLUMN)?;
        let millis = parse_millis(raw_time, true).ok_or_else(|| ParseError::InvalidValue {
            line,
            column: TOTAL_TIME_COLUMN,
            value: raw_time.to_string(),
        })?;
        let total_time = format_total_time(millis)?;

        // Kept exactly as written, surrounding whitespace included
        let name = record
            .get(NAME_COLUMN)
            .ok_or(ParseError::MissingColumn {
                line,
                column: NAME_COLUMN,
            })?
            .to_string();

        Ok(TripHeader { name, total_time })
    }

    /// Read the sample rows from any reader
    pub fn read_trip_samples_from<R: Read>(reader: R) -> ParseResult<Vec<SampleRow>> {
        let mut reader = Self::csv_reader(reader);
        let mut samples = Vec::new();

        // The first record is the metadata row
        for result in reader.records().skip(1) {
            let record = result?;
            let line = line_of(&record);

            let mut values = [0.0f64; SAMPLE_COLUMNS - 1];
            for (column, value) in values.iter_mut().enumerate() {
                let raw = field(&record, line, column)?;
                *value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| ParseError::InvalidValue {
                        line,
                        column,
                        value: raw.to_string(),
                    })?;
            }
            let [latitude, longitude, altitude, raw_speed] = values;

            let time_column = SAMPLE_COLUMNS - 1;
            let raw_time = field(&record, line, time_column)?;
            let millis = parse_millis(raw_time, false).ok_or_else(|| ParseError::InvalidValue {
                line,
                column: time_column,
                value: raw_time.to_string(),
            })?;

            samples.push(SampleRow {
                latitude,
                longitude,
                altitude,
                speed: speed_to_kmh(raw_speed),
                time: decode_epoch_millis(millis)?,
            });
        }

        Ok(samples)
    }

    fn open(&self, file: &Path) -> ParseResult<std::fs::File> {
        let path = self.resolve(file);
        std::fs::File::open(&path).map_err(|e| ParseError::Io { path, source: e })
    }

    fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader)
    }
}

/// Convert a speed in m/s to km/h
///
/// Evaluated as `raw * 18 / 5` so stored values match earlier exports bit for bit.
pub fn speed_to_kmh(raw: f64) -> f64 {
    raw * 18.0 / 5.0
}

/// Decode epoch milliseconds into a UTC date-time truncated to whole seconds
pub fn decode_epoch_millis(millis: i64) -> ParseResult<NaiveDateTime> {
    DateTime::from_timestamp(millis.div_euclid(1000), 0)
        .map(|dt| dt.naive_utc())
        .ok_or(ParseError::InvalidTimestamp(millis))
}

/// Format a total trip time as `HH:MM:SS`
///
/// The exporting device writes the duration as an epoch timestamp, so the value
/// is decoded as a date-time and only its wall-clock part is kept. Durations of
/// 24 hours or more wrap around.
pub fn format_total_time(millis: i64) -> ParseResult<String> {
    Ok(decode_epoch_millis(millis)?.format("%H:%M:%S").to_string())
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn field(record: &csv::StringRecord, line: u64, column: usize) -> ParseResult<&str> {
    match record.get(column).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ParseError::MissingColumn { line, column }),
    }
}

/// Parse an epoch-millisecond value; `lenient` also accepts a float and truncates it
fn parse_millis(raw: &str, lenient: bool) -> Option<i64> {
    if let Ok(millis) = raw.parse::<i64>() {
        return Some(millis);
    }
    if !lenient {
        return None;
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() < i64::MAX as f64)
        .map(|v| v.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    const EXPORT: &str = "\
lat,lon,alt,speed,time,total_time,name
,,,,,3905000,Wycieczka 28.04.2021
50.670597,17.967216,182.5,0.5028836,1619629964000
50.671000,17.968100,183.0,5.0,1619629965250
50.669800,17.966000,181.5,2.5,1619629966999
";

    #[test]
    fn test_read_header() {
        let header = CsvParser::read_trip_header_from(EXPORT.as_bytes()).unwrap();
        assert_eq!(header.name, "Wycieczka 28.04.2021");
        assert_eq!(header.total_time, "01:05:05");
    }

    #[test]
    fn test_read_samples() {
        let samples = CsvParser::read_trip_samples_from(EXPORT.as_bytes()).unwrap();
        assert_eq!(samples.len(), 3);

        let first = samples[0];
        assert_eq!(first.latitude, 50.670597);
        assert_eq!(first.longitude, 17.967216);
        assert_eq!(first.altitude, 182.5);
        assert_eq!(first.speed, 1.8103809599999998);
        assert_eq!(
            first.time,
            NaiveDate::from_ymd_opt(2021, 4, 28)
                .unwrap()
                .and_hms_opt(17, 12, 44)
                .unwrap()
        );
    }

    #[test]
    fn test_speed_conversion() {
        assert_eq!(speed_to_kmh(5.0), 18.0);
        let samples = CsvParser::read_trip_samples_from(EXPORT.as_bytes()).unwrap();
        assert_eq!(samples[1].speed, 18.0);
        assert_eq!(samples[2].speed, 9.0);
    }

    #[test]
    fn test_timestamps_truncate_to_seconds() {
        let samples = CsvParser::read_trip_samples_from(EXPORT.as_bytes()).unwrap();
        assert_eq!(samples[1].time.format("%H:%M:%S").to_string(), "17:12:45");
        assert_eq!(samples[2].time.format("%H:%M:%S").to_string(), "17:12:46");
    }

    #[test]
    fn test_format_total_time() {
        assert_eq!(format_total_time(0).unwrap(), "00:00:00");
        assert_eq!(format_total_time(3_905_999).unwrap(), "01:05:05");
        // A full day wraps around like a timestamp would
        assert_eq!(format_total_time(86_400_000 + 61_000).unwrap(), "00:01:01");
    }

    #[test]
    fn test_header_accepts_float_millis() {
        let csv = "a,b,c,d,e,f,g\n,,,,,3905000.0,Evening ride\n";
        let header = CsvParser::read_trip_header_from(csv.as_bytes()).unwrap();
        assert_eq!(header.total_time, "01:05:05");
        assert_eq!(header.name, "Evening ride");
    }

    #[test]
    fn test_missing_metadata_row() {
        let csv = "a,b,c,d,e,f,g\n";
        let err = CsvParser::read_trip_header_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::MissingRow));
    }

    #[test]
    fn test_missing_name_column() {
        let csv = "a,b,c,d,e,f\n,,,,,3905000\n";
        let err = CsvParser::read_trip_header_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn { column: 6, .. }));
    }

    #[test]
    fn test_invalid_sample_value() {
        let csv = "a,b,c,d,e,f,g\n,,,,,1000,x\n50.1,17.2,abc,1.0,1619629964000\n";
        let err = CsvParser::read_trip_samples_from(csv.as_bytes()).unwrap_err();
        match err {
            ParseError::InvalidValue { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_finite_sample_rejected() {
        for (row, column) in [
            ("NaN,17.2,180.0,1.0,1619629964000", 0),
            ("50.1,inf,180.0,1.0,1619629964000", 1),
            ("50.1,17.2,-infinity,1.0,1619629964000", 2),
            ("50.1,17.2,180.0,nan,1619629964000", 3),
        ] {
            let csv = format!(
                "a,b,c,d,e,f,g\n,,,,,1000,x\n50.0,17.0,181.0,1.0,1619629963000\n{row}\n"
            );
            match CsvParser::read_trip_samples_from(csv.as_bytes()).unwrap_err() {
                ParseError::InvalidValue { line, column: col, .. } => {
                    assert_eq!(line, 4);
                    assert_eq!(col, column);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_name_kept_as_written() {
        let csv = "a,b,c,d,e,f,g\n,,,,,3905000,  Trip A \n";
        let header = CsvParser::read_trip_header_from(csv.as_bytes()).unwrap();
        assert_eq!(header.name, "  Trip A ");

        let csv = "a,b,c,d,e,f,g\n,,,,,3905000,\n";
        let header = CsvParser::read_trip_header_from(csv.as_bytes()).unwrap();
        assert_eq!(header.name, "");
    }

    #[test]
    fn test_short_sample_row() {
        let csv = "a,b,c,d,e,f,g\n,,,,,1000,x\n50.1,17.2,180.0\n";
        let err = CsvParser::read_trip_samples_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn { column: 3, .. }));
    }

    #[test]
    fn test_fractional_sample_time_rejected() {
        let csv = "a,b,c,d,e,f,g\n,,,,,1000,x\n50.1,17.2,180.0,1.0,1619629964000.5\n";
        let err = CsvParser::read_trip_samples_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { column: 4, .. }));
    }

    #[test]
    fn test_read_from_trips_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), EXPORT).unwrap();
        std::fs::write(dir.path().join("a.CSV"), EXPORT).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a trip").unwrap();

        let parser = CsvParser::new(dir.path());
        assert_eq!(parser.list_trip_files().unwrap(), vec!["a.CSV", "b.csv"]);

        let trip = parser.read_trip("b.csv").unwrap();
        assert_eq!(trip.header.name, "Wycieczka 28.04.2021");
        assert_eq!(trip.samples.len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let parser = CsvParser::new(dir.path());
        let err = parser.read_trip_header("nope.csv").unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
