//! Shared types for the compass core

use crate::domain::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as epoch milliseconds
pub fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One event on the sensor ingestion channel
///
/// Sensor sources (replay reader, simulator, platform adapters) serialize
/// these as JSONL, one object per line, tagged by `event`:
/// `{"event":"location","lat":43.07,"lon":-89.40}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SensorEvent {
    /// Fused rotation-vector sample (unit quaternion components)
    RotationVector { x: f64, y: f64, z: f64, w: f64 },
    /// Raw accelerometer sample (m/s^2, device axes)
    Accelerometer { x: f64, y: f64, z: f64 },
    /// Raw magnetometer sample (uT, device axes)
    Magnetometer { x: f64, y: f64, z: f64 },
    /// Barometric pressure sample (hPa)
    Pressure { hpa: f64 },
    /// GPS location fix
    Location { lat: f64, lon: f64 },
    /// Destination command - either explicit coordinates or a place name
    /// to resolve against the place store
    SetDestination {
        #[serde(default)]
        lat: Option<f64>,
        #[serde(default)]
        lon: Option<f64>,
        #[serde(default)]
        name: Option<String>,
    },
    /// Clear the active destination
    EndNavigation,
}

/// An orientation sample accepted by the heading estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrientationSample {
    RotationVector([f64; 4]),
    Accelerometer([f64; 3]),
    Magnetometer([f64; 3]),
}

/// Eight-point compass rose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompassPoint {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl CompassPoint {
    /// Map a normalized heading to its 45-degree sector, sectors centered
    /// on the cardinal/intercardinal directions
    pub fn from_degrees(degrees: f64) -> Self {
        const POINTS: [CompassPoint; 8] = [
            CompassPoint::N,
            CompassPoint::Ne,
            CompassPoint::E,
            CompassPoint::Se,
            CompassPoint::S,
            CompassPoint::Sw,
            CompassPoint::W,
            CompassPoint::Nw,
        ];
        let index = (((degrees + 22.5) / 45.0).floor() as usize) % 8;
        POINTS[index]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompassPoint::N => "N",
            CompassPoint::Ne => "NE",
            CompassPoint::E => "E",
            CompassPoint::Se => "SE",
            CompassPoint::S => "S",
            CompassPoint::Sw => "SW",
            CompassPoint::W => "W",
            CompassPoint::Nw => "NW",
        }
    }
}

impl std::fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A smoothed heading estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heading {
    /// Degrees in [0, 360)
    pub degrees: f64,
    pub compass_point: CompassPoint,
}

impl Heading {
    /// `degrees` must already be normalized to [0, 360)
    pub fn from_degrees(degrees: f64) -> Self {
        Self { degrees, compass_point: CompassPoint::from_degrees(degrees) }
    }
}

/// One row of the pre-seeded place dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl PlaceRecord {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}
