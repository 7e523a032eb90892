//! Live destination tracking - distance, bearing, arrow angle, arrival
//!
//! State machine: Idle -> Active on `set_destination`, Active -> Idle on
//! `end_navigation` or on arrival (arrival implies an implicit end). All
//! update operations are no-ops returning `None` while Idle.

use crate::domain::geo::{self, GeoPoint};
use tracing::{debug, info};

/// Result of one location update while navigating
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationFix {
    pub distance_m: f64,
    /// Bearing to the destination in [0, 360)
    pub bearing_deg: f64,
    /// True when this fix confirmed arrival; the tracker has already
    /// returned to Idle when set
    pub arrived: bool,
}

/// Snapshot of the active navigation state for display payloads
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationSnapshot {
    pub destination: GeoPoint,
    /// Destination name, falling back to "lat, lon"
    pub label: String,
    pub distance_m: f64,
    pub bearing_deg: f64,
    pub arrow_angle_deg: f64,
}

#[derive(Debug, Clone)]
struct NavigationState {
    destination: GeoPoint,
    name: Option<String>,
    distance_m: f64,
    bearing_deg: f64,
    arrow_angle_deg: f64,
    /// Set once a genuine (non-zero) distance has been observed; guards
    /// arrival against a stale first callback reporting zero
    has_genuine_fix: bool,
}

impl NavigationState {
    fn label(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.destination.to_string(),
        }
    }
}

/// Maintains distance/bearing/arrow-angle/arrival for an active destination
///
/// Smoothing state is mutated in place; callers must serialize updates
/// (single consumer task, no internal locking).
pub struct NavigationTracker {
    smoothing: f64,
    arrival_buffer_m: f64,
    state: Option<NavigationState>,
}

impl NavigationTracker {
    pub fn new(smoothing: f64, arrival_buffer_m: f64) -> Self {
        Self { smoothing, arrival_buffer_m, state: None }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Snapshot of the active state, `None` while Idle
    pub fn snapshot(&self) -> Option<NavigationSnapshot> {
        self.state.as_ref().map(|s| NavigationSnapshot {
            destination: s.destination,
            label: s.label(),
            distance_m: s.distance_m,
            bearing_deg: s.bearing_deg,
            arrow_angle_deg: s.arrow_angle_deg,
        })
    }

    /// Replace the active destination, resetting the arrow baseline and
    /// the arrival guard
    pub fn set_destination(&mut self, destination: GeoPoint, name: Option<String>) {
        info!(
            lat = %destination.lat,
            lon = %destination.lon,
            name = ?name,
            "destination_set"
        );
        self.state = Some(NavigationState {
            destination,
            name,
            distance_m: 0.0,
            bearing_deg: 0.0,
            arrow_angle_deg: 0.0,
            has_genuine_fix: false,
        });
    }

    /// Feed a location fix; returns distance/bearing to the destination,
    /// or `None` when no navigation is active
    ///
    /// Arrival fires when the distance is within the arrival buffer AND a
    /// genuine (non-zero) distance has been observed, which the same fix
    /// may establish. On arrival the tracker clears its state.
    pub fn on_location_update(&mut self, current: GeoPoint) -> Option<NavigationFix> {
        let state = self.state.as_mut()?;

        let distance_m = geo::distance_m(current, state.destination);
        let bearing_deg = geo::initial_bearing(current, state.destination);
        state.distance_m = distance_m;
        state.bearing_deg = bearing_deg;

        if distance_m > 0.0 {
            state.has_genuine_fix = true;
        }
        let arrived = state.has_genuine_fix && distance_m <= self.arrival_buffer_m;

        if arrived {
            info!(distance_m = %distance_m, label = %state.label(), "destination_reached");
            self.state = None;
        }

        Some(NavigationFix { distance_m, bearing_deg, arrived })
    }

    /// Feed a heading estimate; returns the smoothed arrow rotation angle,
    /// or `None` when no navigation is active
    pub fn on_heading_update(&mut self, heading_deg: f64) -> Option<f64> {
        let state = self.state.as_mut()?;
        let target = geo::normalize_degrees(state.bearing_deg - heading_deg);
        state.arrow_angle_deg = geo::smooth_angle(state.arrow_angle_deg, target, self.smoothing);
        Some(state.arrow_angle_deg)
    }

    /// Clear the active destination and reset all derived state
    pub fn end_navigation(&mut self) {
        if let Some(state) = self.state.take() {
            debug!(label = %state.label(), "navigation_ended");
        }
    }
}
