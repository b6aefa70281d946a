//! In-memory trip view
//!
//! A `Trip` holds the geographic points of one ride plus the parallel speed
//! and altitude series the map renderer colors the track by.

use crate::types::SampleRow;
use geo::{BoundingRect, Coord, LineString};
use serde::Serialize;
use thiserror::Error;

/// Errors raised by trip geometry helpers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TripError {
    #[error("Trip has no samples")]
    EmptyTrip,

    #[error("Unknown color mode: {0}")]
    UnknownColorMode(String),
}

/// Minimal lat/lon rectangle containing every point of a trip
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lon_min: f64,
    pub lat_max: f64,
    pub lon_max: f64,
}

/// Converts geographic coordinates into map pixels
pub trait MapProjector {
    fn to_pixels(&self, latitude: f64, longitude: f64) -> (f64, f64);
}

impl<F> MapProjector for F
where
    F: Fn(f64, f64) -> (f64, f64),
{
    fn to_pixels(&self, latitude: f64, longitude: f64) -> (f64, f64) {
        self(latitude, longitude)
    }
}

/// Series a track can be colored by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Speed,
    Altitude,
}

impl std::str::FromStr for ColorMode {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "speed" => Ok(ColorMode::Speed),
            "altitude" => Ok(ColorMode::Altitude),
            _ => Err(TripError::UnknownColorMode(s.to_string())),
        }
    }
}

/// Read-only view over one trip's samples
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trip {
    /// (latitude, longitude) in sample order
    geo: Vec<(f64, f64)>,
    speed: Vec<f64>,
    altitude: Vec<f64>,
}

impl Trip {
    pub fn from_samples(samples: &[SampleRow]) -> Self {
        let mut trip = Self {
            geo: Vec::with_capacity(samples.len()),
            speed: Vec::with_capacity(samples.len()),
            altitude: Vec::with_capacity(samples.len()),
        };
        for sample in samples {
            trip.geo.push((sample.latitude, sample.longitude));
            trip.speed.push(sample.speed);
            trip.altitude.push(sample.altitude);
        }
        trip
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.geo
    }

    /// km/h, parallel to `points`
    pub fn speeds(&self) -> &[f64] {
        &self.speed
    }

    /// Meters, parallel to `points`
    pub fn altitudes(&self) -> &[f64] {
        &self.altitude
    }

    pub fn len(&self) -> usize {
        self.geo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geo.is_empty()
    }

    /// The series selected by `mode`
    pub fn values(&self, mode: ColorMode) -> &[f64] {
        match mode {
            ColorMode::Speed => &self.speed,
            ColorMode::Altitude => &self.altitude,
        }
    }

    /// (min, max) of the series selected by `mode`, `None` for an empty trip
    pub fn value_range(&self, mode: ColorMode) -> Option<(f64, f64)> {
        let values = self.values(mode);
        if values.is_empty() {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }

    /// Bounding box of the track
    pub fn bounding_box(&self) -> Result<BoundingBox, TripError> {
        // x = longitude, y = latitude
        let line: LineString<f64> = self
            .geo
            .iter()
            .map(|&(lat, lon)| Coord { x: lon, y: lat })
            .collect();

        let rect = line.bounding_rect().ok_or(TripError::EmptyTrip)?;
        Ok(BoundingBox {
            lat_min: rect.min().y,
            lon_min: rect.min().x,
            lat_max: rect.max().y,
            lon_max: rect.max().x,
        })
    }

    /// Project every point to pixels, keeping sample order
    pub fn project_to_pixels<P: MapProjector + ?Sized>(&self, projector: &P) -> Vec<(f64, f64)> {
        self.geo
            .iter()
            .map(|&(lat, lon)| projector.to_pixels(lat, lon))
            .collect()
    }
}

impl From<&[SampleRow]> for Trip {
    fn from(samples: &[SampleRow]) -> Self {
        Self::from_samples(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(latitude: f64, longitude: f64, altitude: f64, speed: f64) -> SampleRow {
        SampleRow {
            latitude,
            longitude,
            altitude,
            speed,
            time: NaiveDate::from_ymd_opt(2021, 4, 28)
                .unwrap()
                .and_hms_opt(17, 12, 44)
                .unwrap(),
        }
    }

    fn trip() -> Trip {
        Trip::from_samples(&[
            row(50.670597, 17.967216, 182.5, 6.5),
            row(50.671000, 17.968100, 183.0, 18.0),
            row(50.669800, 17.966000, 181.5, 9.0),
        ])
    }

    #[test]
    fn test_parallel_series() {
        let trip = trip();
        assert_eq!(trip.len(), 3);
        assert_eq!(trip.points()[1], (50.671000, 17.968100));
        assert_eq!(trip.speeds(), &[6.5, 18.0, 9.0]);
        assert_eq!(trip.altitudes(), &[182.5, 183.0, 181.5]);
    }

    #[test]
    fn test_bounding_box() {
        let bbox = trip().bounding_box().unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                lat_min: 50.669800,
                lon_min: 17.966000,
                lat_max: 50.671000,
                lon_max: 17.968100,
            }
        );
    }

    #[test]
    fn test_bounding_box_single_point() {
        let trip = Trip::from_samples(&[row(1.0, 2.0, 0.0, 0.0)]);
        let bbox = trip.bounding_box().unwrap();
        assert_eq!(bbox.lat_min, bbox.lat_max);
        assert_eq!(bbox.lon_min, 2.0);
    }

    #[test]
    fn test_empty_trip() {
        let trip = Trip::from_samples(&[]);
        assert!(trip.is_empty());
        assert_eq!(trip.bounding_box(), Err(TripError::EmptyTrip));
        assert_eq!(trip.value_range(ColorMode::Speed), None);
        assert!(trip
            .project_to_pixels(&|lat: f64, lon: f64| (lat, lon))
            .is_empty());
    }

    #[test]
    fn test_project_to_pixels_keeps_order() {
        let projector = |lat: f64, lon: f64| (lon * 10.0, lat * 10.0);
        let pixels = trip().project_to_pixels(&projector);
        assert_eq!(pixels.len(), 3);
        assert_eq!(pixels[0], (17.967216 * 10.0, 50.670597 * 10.0));
        assert_eq!(pixels[2], (17.966000 * 10.0, 50.669800 * 10.0));
    }

    struct Offset(f64);

    impl MapProjector for Offset {
        fn to_pixels(&self, latitude: f64, longitude: f64) -> (f64, f64) {
            (longitude + self.0, latitude + self.0)
        }
    }

    #[test]
    fn test_custom_projector() {
        let pixels = trip().project_to_pixels(&Offset(1.0));
        assert_eq!(pixels[1], (17.968100 + 1.0, 50.671000 + 1.0));
    }

    #[test]
    fn test_color_modes() {
        let trip = trip();
        assert_eq!(trip.values(ColorMode::Altitude), trip.altitudes());
        assert_eq!(trip.value_range(ColorMode::Speed), Some((6.5, 18.0)));
        assert_eq!(trip.value_range(ColorMode::Altitude), Some((181.5, 183.0)));
        assert_eq!("Altitude".parse::<ColorMode>(), Ok(ColorMode::Altitude));
        assert_eq!(
            "heat".parse::<ColorMode>(),
            Err(TripError::UnknownColorMode("heat".to_string()))
        );
    }
}
