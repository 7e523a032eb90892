//! Heading estimation from orientation sensors
//!
//! Fuses rotation-vector or paired accelerometer/magnetometer samples into
//! a smoothed compass heading. Raw pairs are cached per axis type; fusion
//! only runs once both halves have been seen. The rotation matrix is the
//! classic gravity/geomagnetic cross-product orthonormalization, computed
//! here explicitly rather than delegated to a platform call.

use crate::domain::geo::{normalize_degrees, smooth_angle};
use crate::domain::types::{Heading, OrientationSample};
use tracing::debug;

/// Gravity magnitude below which the device is treated as in free fall
/// (10% of standard gravity, m/s^2)
const FREE_FALL_GRAVITY_MS2: f64 = 0.981;

/// Minimum norm of the geomagnetic x gravity cross product; below this the
/// two vectors are near-parallel and no stable rotation matrix exists
const MIN_FIELD_CROSS_NORM: f64 = 0.1;

/// Fuses orientation samples into a stable heading
///
/// Holds the smoothing state in place; callers must serialize updates
/// (single-writer discipline, one consumer task).
pub struct HeadingEstimator {
    smoothing: f64,
    gravity: Option<[f64; 3]>,
    geomagnetic: Option<[f64; 3]>,
    heading: Option<f64>,
}

impl HeadingEstimator {
    pub fn new(smoothing: f64) -> Self {
        Self { smoothing, gravity: None, geomagnetic: None, heading: None }
    }

    /// Last emitted heading, if any fusion has succeeded yet
    pub fn heading(&self) -> Option<Heading> {
        self.heading.map(Heading::from_degrees)
    }

    /// Feed one orientation sample
    ///
    /// Returns the new smoothed heading, or `None` when the sample did not
    /// produce one (missing half of a raw pair, or degenerate input). On
    /// `None` the previous heading persists unchanged.
    pub fn update(&mut self, sample: OrientationSample) -> Option<Heading> {
        let raw = match sample {
            OrientationSample::RotationVector(q) => Some(azimuth_from_rotation_vector(q)),
            OrientationSample::Accelerometer(v) => {
                self.gravity = Some(v);
                self.fuse_cached()
            }
            OrientationSample::Magnetometer(v) => {
                self.geomagnetic = Some(v);
                self.fuse_cached()
            }
        };

        let Some(raw) = raw else {
            return None;
        };

        let target = normalize_degrees(raw);
        let next = match self.heading {
            Some(prev) => smooth_angle(prev, target, self.smoothing),
            // First valid fusion adopts the target directly
            None => target,
        };
        self.heading = Some(next);
        Some(Heading::from_degrees(next))
    }

    /// Fuse the cached accelerometer/magnetometer pair, if both are present
    fn fuse_cached(&self) -> Option<f64> {
        let gravity = self.gravity?;
        let geomagnetic = self.geomagnetic?;
        let azimuth = azimuth_from_gravity_magnetic(gravity, geomagnetic);
        if azimuth.is_none() {
            debug!("degenerate_rotation_matrix");
        }
        azimuth
    }
}

/// Azimuth in degrees from a rotation-vector quaternion [x, y, z, w]
///
/// Only the two rotation-matrix elements feeding the azimuth are needed:
/// R[1] = 2(xy - wz), R[4] = 1 - 2x^2 - 2z^2, azimuth = atan2(R[1], R[4]).
fn azimuth_from_rotation_vector(q: [f64; 4]) -> f64 {
    let [x, y, z, w] = q;
    let r1 = 2.0 * (x * y - w * z);
    let r4 = 1.0 - 2.0 * (x * x + z * z);
    r1.atan2(r4).to_degrees()
}

/// Azimuth in degrees from raw gravity and geomagnetic vectors
///
/// Builds the device-to-world rotation matrix rows H = E x A (east),
/// M = A x H (north), A (up), each normalized, then extracts
/// azimuth = atan2(H_y, M_y). Returns `None` when the device is in free
/// fall or the field is near-parallel to gravity.
fn azimuth_from_gravity_magnetic(a: [f64; 3], e: [f64; 3]) -> Option<f64> {
    let norm_sq_a = a[0] * a[0] + a[1] * a[1] + a[2] * a[2];
    if norm_sq_a < FREE_FALL_GRAVITY_MS2 * FREE_FALL_GRAVITY_MS2 {
        return None;
    }

    let hx = e[1] * a[2] - e[2] * a[1];
    let hy = e[2] * a[0] - e[0] * a[2];
    let hz = e[0] * a[1] - e[1] * a[0];
    let norm_h = (hx * hx + hy * hy + hz * hz).sqrt();
    if norm_h < MIN_FIELD_CROSS_NORM {
        return None;
    }

    let inv_h = 1.0 / norm_h;
    let (hx, hy, hz) = (hx * inv_h, hy * inv_h, hz * inv_h);

    // Only M_y of the north row M = A x H is needed for the azimuth
    let inv_a = 1.0 / norm_sq_a.sqrt();
    let (ax, az) = (a[0] * inv_a, a[2] * inv_a);
    let my = az * hx - ax * hz;

    Some(hy.atan2(my).to_degrees())
}
