//! Geodesic math - angles, great-circle distance, bearing
//!
//! All public functions operate on degrees and keep angles normalized to
//! [0, 360). Distances use a spherical earth model (mean radius); this is
//! the same approximation for both navigation distance and search ranking
//! so the two paths never disagree.
//!
//! Behavior is undefined for NaN latitude/longitude inputs - callers
//! validate with [`GeoPoint::is_valid`] before invoking these routines.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Mean earth radius used for search ranking (kilometers)
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Mean earth radius used for navigation distance (meters)
pub const EARTH_RADIUS_M: f64 = EARTH_RADIUS_KM * 1000.0;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and within the valid latitude/longitude ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

/// Parse a `"lat,lon"` coordinate string into a validated [`GeoPoint`]
pub fn parse_coordinate(input: &str) -> anyhow::Result<GeoPoint> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        bail!("expected \"lat,lon\", got {:?}", input);
    }
    let lat: f64 = parts[0]
        .parse()
        .with_context(|| format!("invalid latitude {:?}", parts[0]))?;
    let lon: f64 = parts[1]
        .parse()
        .with_context(|| format!("invalid longitude {:?}", parts[1]))?;
    let point = GeoPoint::new(lat, lon);
    if !point.is_valid() {
        bail!("coordinates out of range: {}", point);
    }
    Ok(point)
}

/// Normalize an angle in degrees to [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Shortest signed angular delta from `from` to `to`, in [-180, 180)
pub fn shortest_delta(from: f64, to: f64) -> f64 {
    (to - from + 540.0).rem_euclid(360.0) - 180.0
}

/// One step of exponential smoothing along the shortest angular path
///
/// Never moves more than `180 * factor` degrees in a single step, even
/// across the 0/360 wrap.
pub fn smooth_angle(prev: f64, target: f64, factor: f64) -> f64 {
    normalize_degrees(prev + shortest_delta(prev, target) * factor)
}

/// Great-circle distance in kilometers (haversine, spherical earth)
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Great-circle distance in meters
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    haversine_km(a, b) * 1000.0
}

/// Initial bearing (forward azimuth) from `from` to `to`, in [0, 360)
pub fn initial_bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let d_lon = (to.lon - from.lon).to_radians();
    let y = d_lon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lon.cos();
    normalize_degrees(y.atan2(x).to_degrees())
}

/// Render one coordinate axis as degrees-minutes-seconds with hemisphere suffix
pub fn format_dms(coordinate: f64, is_latitude: bool) -> String {
    let absolute = coordinate.abs();
    let degrees = absolute as u32;
    let minutes_full = (absolute - degrees as f64) * 60.0;
    let minutes = minutes_full as u32;
    let seconds = ((minutes_full - minutes as f64) * 60.0) as u32;

    let suffix = if is_latitude {
        if coordinate >= 0.0 { "N" } else { "S" }
    } else if coordinate >= 0.0 {
        "E"
    } else {
        "W"
    };

    format!("{}\u{00b0}{:02}'{:02}\"{}", degrees, minutes, seconds, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identity_in_range() {
        for h in [0.0, 1.5, 90.0, 180.0, 359.9] {
            assert!((normalize_degrees(h) - h).abs() < 1e-12);
        }
    }

    #[test]
    fn test_normalize_out_of_range() {
        assert!((normalize_degrees(360.0)).abs() < 1e-12);
        assert!((normalize_degrees(-10.0) - 350.0).abs() < 1e-12);
        assert!((normalize_degrees(725.0) - 5.0).abs() < 1e-12);
        assert!((normalize_degrees(-725.0) - 355.0).abs() < 1e-12);
        for h in [-1000.0, -360.0, 360.0, 719.9, 5000.0] {
            let n = normalize_degrees(h);
            assert!((0.0..360.0).contains(&n), "normalize({}) = {}", h, n);
        }
    }

    #[test]
    fn test_shortest_delta_across_wrap() {
        // 350 -> 10 resolves to +20, not -340
        assert!((shortest_delta(350.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((shortest_delta(10.0, 350.0) + 20.0).abs() < 1e-9);
        assert!((shortest_delta(0.0, 180.0) + 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_smooth_angle_bounded_step() {
        let factor = 0.1;
        let stepped = smooth_angle(350.0, 10.0, factor);
        assert!((stepped - 352.0).abs() < 1e-9);
        // A single step never exceeds 180 * factor
        for (prev, target) in [(0.0, 359.0), (359.0, 0.0), (90.0, 271.0), (5.0, 185.0)] {
            let next = smooth_angle(prev, target, factor);
            assert!(shortest_delta(prev, next).abs() <= 180.0 * factor + 1e-9);
        }
    }

    #[test]
    fn test_haversine_zero_and_symmetric() {
        let a = GeoPoint::new(43.0731, -89.4012);
        let b = GeoPoint::new(41.8781, -87.6298);
        assert_eq!(haversine_km(a, a), 0.0);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_one_degree_longitude_at_equator() {
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert!((d - 111.19).abs() < 0.05, "got {}", d);
    }

    #[test]
    fn test_initial_bearing_cardinal_directions() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!((initial_bearing(origin, GeoPoint::new(1.0, 0.0))).abs() < 1e-9);
        assert!((initial_bearing(origin, GeoPoint::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((initial_bearing(origin, GeoPoint::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((initial_bearing(origin, GeoPoint::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_coordinate_valid() {
        let point = parse_coordinate("43.0731, -89.4012").unwrap();
        assert_eq!(point, GeoPoint::new(43.0731, -89.4012));
        assert!(parse_coordinate("0,0").is_ok());
    }

    #[test]
    fn test_parse_coordinate_rejects_bad_input() {
        assert!(parse_coordinate("").is_err());
        assert!(parse_coordinate("43.0731").is_err());
        assert!(parse_coordinate("a,b").is_err());
        assert!(parse_coordinate("91.0, 0.0").is_err());
        assert!(parse_coordinate("0.0, 181.0").is_err());
        assert!(parse_coordinate("1,2,3").is_err());
    }

    #[test]
    fn test_format_dms() {
        assert_eq!(format_dms(43.0731, true), "43\u{00b0}04'23\"N");
        assert_eq!(format_dms(-89.4012, false), "89\u{00b0}24'04\"W");
        assert_eq!(format_dms(0.0, true), "0\u{00b0}00'00\"N");
    }
}
