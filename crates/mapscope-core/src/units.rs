//! Measurement formatting
//!
//! Lengths are labelled in meters up to one kilometer, areas in square
//! meters up to 10 000 m². Values are rounded to two decimals and printed
//! without trailing zeros (`12.5 m`, `3 km`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Meters in a kilometer.
pub const METERS_PER_KM: f64 = 1000.0;

/// Square meters above which areas switch to square kilometers.
pub const AREA_KM2_THRESHOLD: f64 = 10_000.0;

/// Unit a measurement label is printed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasureUnit {
    /// Meters
    Meters,
    /// Kilometers
    Kilometers,
    /// Square meters
    SquareMeters,
    /// Square kilometers
    SquareKilometers,
}

impl fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meters => write!(f, "m"),
            Self::Kilometers => write!(f, "km"),
            Self::SquareMeters => write!(f, "m²"),
            Self::SquareKilometers => write!(f, "km²"),
        }
    }
}

/// A rounded measurement value with its display unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub unit: MeasureUnit,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Picks the display unit for a geodesic length in meters.
pub fn length_measurement(meters: f64) -> Measurement {
    if meters > METERS_PER_KM {
        Measurement {
            value: round2(meters / METERS_PER_KM),
            unit: MeasureUnit::Kilometers,
        }
    } else {
        Measurement {
            value: round2(meters),
            unit: MeasureUnit::Meters,
        }
    }
}

/// Picks the display unit for an area in square meters.
pub fn area_measurement(square_meters: f64) -> Measurement {
    if square_meters > AREA_KM2_THRESHOLD {
        Measurement {
            value: round2(square_meters / 1_000_000.0),
            unit: MeasureUnit::SquareKilometers,
        }
    } else {
        Measurement {
            value: round2(square_meters),
            unit: MeasureUnit::SquareMeters,
        }
    }
}

/// Formats a length label, e.g. `"1.23 km"`.
pub fn format_length(meters: f64) -> String {
    length_measurement(meters).to_string()
}

/// Formats an area label, e.g. `"4.5 km²"`.
pub fn format_area(square_meters: f64) -> String {
    area_measurement(square_meters).to_string()
}

/// Route distance in kilometers, rounded to two decimals.
pub fn route_distance_km(meters: f64) -> f64 {
    round2(meters / METERS_PER_KM)
}

/// Route duration in whole minutes, rounded up.
pub fn route_duration_minutes(seconds: f64) -> u64 {
    if seconds <= 0.0 {
        return 0;
    }
    (seconds / 60.0).ceil() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_switches_to_km_above_1000() {
        assert_eq!(format_length(999.994), "999.99 m");
        assert_eq!(format_length(1000.0), "1000 m");
        assert_eq!(format_length(1234.0), "1.23 km");
        assert_eq!(format_length(12.5), "12.5 m");
    }

    #[test]
    fn test_area_switches_to_km2_above_10000() {
        assert_eq!(format_area(10_000.0), "10000 m²");
        assert_eq!(format_area(2_500_000.0), "2.5 km²");
        assert_eq!(format_area(0.126), "0.13 m²");
    }

    #[test]
    fn test_route_units() {
        assert_eq!(route_distance_km(12_346.0), 12.35);
        assert_eq!(route_duration_minutes(61.0), 2);
        assert_eq!(route_duration_minutes(120.0), 2);
        assert_eq!(route_duration_minutes(0.0), 0);
    }
}
