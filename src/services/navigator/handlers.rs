//! Event handlers for the Navigator
//!
//! Each handler updates estimator/tracker state and publishes the
//! resulting display updates.

use super::{ActiveSession, Navigator};
use crate::domain::geo::{self, GeoPoint};
use crate::domain::types::{epoch_ms, OrientationSample};
use crate::io::session_log::{SessionOutcome, SessionRecord};
use crate::io::update_channel::{
    AltitudePayload, ArrivalPayload, HeadingPayload, NavigationPayload,
};
use tracing::{debug, info, warn};

impl Navigator {
    /// Feed an orientation sample to the estimator; a new heading also
    /// advances the navigation arrow
    pub(crate) fn handle_orientation(&mut self, sample: OrientationSample) {
        let Some(heading) = self.estimator.update(sample) else {
            // Incomplete pair or degenerate input; previous heading persists
            return;
        };

        self.metrics.record_heading_published();
        self.update_tx.send_heading(HeadingPayload {
            ts: epoch_ms(),
            degrees: heading.degrees,
            direction: heading.compass_point.to_string(),
        });

        if self.tracker.on_heading_update(heading.degrees).is_some() {
            self.publish_navigation();
        }
    }

    pub(crate) fn handle_pressure(&mut self, hpa: f64) {
        let Some(reading) = self.altimeter.update(hpa) else {
            debug!(hpa = %hpa, "pressure_sample_degenerate");
            return;
        };
        self.update_tx.send_altitude(AltitudePayload {
            ts: epoch_ms(),
            altitude_m: reading.altitude_m,
            pressure_hpa: reading.pressure_hpa,
        });
    }

    /// Feed a location fix: updates distance/bearing, publishes the
    /// navigation state, and completes the session on arrival
    pub(crate) fn handle_location(&mut self, point: GeoPoint) {
        if !point.is_valid() {
            warn!(lat = %point.lat, lon = %point.lon, "location_fix_invalid");
            return;
        }
        self.last_fix = Some(point);

        let Some(fix) = self.tracker.on_location_update(point) else {
            return; // No active navigation
        };
        self.metrics.record_fix_processed();

        if let Some(session) = self.session.as_mut() {
            session.last_distance_m = fix.distance_m;
        }

        if fix.arrived {
            // The tracker has already gone Idle; close out the session
            let destination = self
                .session
                .as_ref()
                .map(|s| s.label.clone())
                .unwrap_or_else(|| point.to_string());
            self.update_tx.send_arrival(ArrivalPayload {
                ts: epoch_ms(),
                destination,
                distance_m: fix.distance_m,
            });
            self.finish_session(SessionOutcome::Arrived);
        } else {
            self.publish_navigation();
        }
    }

    /// Set the destination from explicit coordinates or a place name
    pub(crate) fn handle_set_destination(
        &mut self,
        lat: Option<f64>,
        lon: Option<f64>,
        name: Option<String>,
    ) {
        let resolved = match (lat, lon) {
            (Some(lat), Some(lon)) => {
                let point = GeoPoint::new(lat, lon);
                if !point.is_valid() {
                    warn!(lat = %lat, lon = %lon, "destination_coordinates_invalid");
                    return;
                }
                Some((point, name))
            }
            _ => match name {
                Some(name) => self.resolve_destination(&name).map(|p| (p, Some(name))),
                None => {
                    warn!("destination_request_empty");
                    None
                }
            },
        };

        let Some((point, name)) = resolved else {
            return;
        };

        // Replacing an active destination ends its session first
        if self.session.is_some() {
            self.finish_session(SessionOutcome::Ended);
        }

        let label = match name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => point.to_string(),
        };
        self.tracker.set_destination(point, name);
        self.session = Some(ActiveSession {
            label,
            destination: point,
            started_ts: epoch_ms(),
            last_distance_m: 0.0,
        });
    }

    pub(crate) fn handle_end_navigation(&mut self) {
        if !self.tracker.is_active() {
            debug!("end_navigation_while_idle");
            return;
        }
        self.tracker.end_navigation();
        self.finish_session(SessionOutcome::Ended);
    }

    /// Resolve a place name against the store: exact match first, then the
    /// nearest ranked match relative to the last fix
    fn resolve_destination(&self, name: &str) -> Option<GeoPoint> {
        self.metrics.record_search();

        if let Some(position) = self.finder.lookup_by_name(name) {
            return Some(position);
        }

        let Some(reference) = self.last_fix else {
            warn!(name = %name, "destination_unresolved_no_fix");
            return None;
        };
        match self.finder.search(name, reference, self.search_limit).into_iter().next() {
            Some(hit) => {
                info!(query = %name, matched = %hit.name, distance_km = %hit.distance_km, "destination_resolved");
                Some(hit.position)
            }
            None => {
                warn!(name = %name, "destination_unresolved");
                None
            }
        }
    }

    /// Publish the current navigation snapshot to the update channel
    fn publish_navigation(&self) {
        let Some(snapshot) = self.tracker.snapshot() else {
            return;
        };
        let position_dms = self.last_fix.map(|fix| {
            format!("{}, {}", geo::format_dms(fix.lat, true), geo::format_dms(fix.lon, false))
        });
        self.update_tx.send_navigation(NavigationPayload {
            ts: epoch_ms(),
            destination: snapshot.label,
            distance_m: snapshot.distance_m,
            bearing_deg: snapshot.bearing_deg,
            arrow_deg: snapshot.arrow_angle_deg,
            position_dms,
        });
    }

    /// Write the active session to the log and clear it
    fn finish_session(&mut self, outcome: SessionOutcome) {
        let Some(session) = self.session.take() else {
            return;
        };
        let record = SessionRecord::new(
            &session.label,
            session.destination,
            outcome,
            session.last_distance_m,
            session.started_ts,
            epoch_ms(),
        );
        self.session_log.write_session(&record);
        self.metrics.record_session_completed();
    }
}
