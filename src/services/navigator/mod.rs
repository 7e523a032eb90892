//! Central sensor-event processor
//!
//! The Navigator is the single consumer of the sensor-event channel and
//! coordinates:
//! - Heading estimation (orientation sample fusion and smoothing)
//! - Destination tracking (distance, bearing, arrow angle, arrival)
//! - Barometric altitude
//! - Destination resolution against the place store
//! - Display-update publishing and session egress
//!
//! All smoothing state lives behind this one task, which is what makes the
//! in-place mutation in the estimator and tracker safe.

mod handlers;

use crate::domain::geo::GeoPoint;
use crate::domain::types::{OrientationSample, SensorEvent};
use crate::infra::config::Config;
use crate::infra::metrics::Metrics;
use crate::io::session_log::SessionLog;
use crate::io::update_channel::UpdateSender;
use crate::services::altimeter::Altimeter;
use crate::services::finder::LocationFinder;
use crate::services::heading::HeadingEstimator;
use crate::services::navigation::NavigationTracker;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Bookkeeping for the active navigation session
#[derive(Debug, Clone)]
pub(crate) struct ActiveSession {
    pub(crate) label: String,
    pub(crate) destination: GeoPoint,
    pub(crate) started_ts: u64,
    pub(crate) last_distance_m: f64,
}

/// Single-consumer event processor over the sensor channel
pub struct Navigator {
    pub(crate) estimator: HeadingEstimator,
    pub(crate) tracker: NavigationTracker,
    pub(crate) altimeter: Altimeter,
    pub(crate) finder: LocationFinder,
    pub(crate) session_log: SessionLog,
    pub(crate) update_tx: UpdateSender,
    pub(crate) metrics: Arc<Metrics>,
    pub(crate) search_limit: usize,
    /// Most recent valid location fix, used as the search reference
    pub(crate) last_fix: Option<GeoPoint>,
    pub(crate) session: Option<ActiveSession>,
}

impl Navigator {
    pub fn new(
        config: &Config,
        finder: LocationFinder,
        update_tx: UpdateSender,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            estimator: HeadingEstimator::new(config.heading_smoothing()),
            tracker: NavigationTracker::new(config.arrow_smoothing(), config.arrival_buffer_m()),
            altimeter: Altimeter::new(config.sea_level_hpa()),
            finder,
            session_log: SessionLog::new(config.session_log_file()),
            update_tx,
            metrics,
            search_limit: config.search_limit(),
            last_fix: None,
            session: None,
        }
    }

    /// Consume events until the channel closes
    pub async fn run(&mut self, mut event_rx: mpsc::Receiver<SensorEvent>) {
        while let Some(event) = event_rx.recv().await {
            self.process_event(event);
        }
    }

    /// Process a single event, dispatching to the appropriate handler
    ///
    /// Synchronous and non-blocking apart from session-log appends on
    /// session end.
    pub fn process_event(&mut self, event: SensorEvent) {
        let process_start = Instant::now();

        match event {
            SensorEvent::RotationVector { x, y, z, w } => {
                self.handle_orientation(OrientationSample::RotationVector([x, y, z, w]));
            }
            SensorEvent::Accelerometer { x, y, z } => {
                self.handle_orientation(OrientationSample::Accelerometer([x, y, z]));
            }
            SensorEvent::Magnetometer { x, y, z } => {
                self.handle_orientation(OrientationSample::Magnetometer([x, y, z]));
            }
            SensorEvent::Pressure { hpa } => {
                self.handle_pressure(hpa);
            }
            SensorEvent::Location { lat, lon } => {
                self.handle_location(GeoPoint::new(lat, lon));
            }
            SensorEvent::SetDestination { lat, lon, name } => {
                self.handle_set_destination(lat, lon, name);
            }
            SensorEvent::EndNavigation => {
                self.handle_end_navigation();
            }
        }

        let latency_us = process_start.elapsed().as_micros() as u64;
        self.metrics.record_event_processed(latency_us);
    }
}
