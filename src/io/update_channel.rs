//! Typed channel for display updates
//!
//! Provides a non-blocking way to publish heading/navigation/altitude/
//! arrival updates to display collaborators. Uses a bounded mpsc channel;
//! a slow consumer drops updates rather than stalling the event loop, and
//! drops are counted in metrics.

use crate::infra::metrics::Metrics;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

/// Updates published to display collaborators, tagged by `update`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "update", rename_all = "snake_case")]
pub enum UpdateMessage {
    Heading(HeadingPayload),
    Navigation(NavigationPayload),
    Altitude(AltitudePayload),
    Arrival(ArrivalPayload),
}

/// Smoothed heading for the compass rose display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadingPayload {
    /// Timestamp (epoch ms)
    pub ts: u64,
    /// Heading in [0, 360)
    pub degrees: f64,
    /// Compass rose sector (N, NE, ...)
    pub direction: String,
}

/// Live navigation state for the arrow display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationPayload {
    /// Timestamp (epoch ms)
    pub ts: u64,
    /// Destination name, falling back to "lat, lon"
    pub destination: String,
    pub distance_m: f64,
    /// Bearing to the destination in [0, 360)
    pub bearing_deg: f64,
    /// Smoothed arrow rotation angle in [0, 360)
    pub arrow_deg: f64,
    /// Current position rendered as degrees-minutes-seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_dms: Option<String>,
}

/// Barometric altitude estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AltitudePayload {
    /// Timestamp (epoch ms)
    pub ts: u64,
    pub altitude_m: f64,
    pub pressure_hpa: f64,
}

/// Arrival notification; navigation has already ended when this is sent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrivalPayload {
    /// Timestamp (epoch ms)
    pub ts: u64,
    pub destination: String,
    pub distance_m: f64,
}

/// Create a bounded update channel
pub fn create_update_channel(
    capacity: usize,
    metrics: Arc<Metrics>,
) -> (UpdateSender, mpsc::Receiver<UpdateMessage>) {
    let (tx, rx) = mpsc::channel(capacity);
    (UpdateSender { tx, metrics }, rx)
}

/// Non-blocking sender half of the update channel
#[derive(Clone)]
pub struct UpdateSender {
    tx: mpsc::Sender<UpdateMessage>,
    metrics: Arc<Metrics>,
}

impl UpdateSender {
    pub fn send_heading(&self, payload: HeadingPayload) {
        self.send(UpdateMessage::Heading(payload));
    }

    pub fn send_navigation(&self, payload: NavigationPayload) {
        self.send(UpdateMessage::Navigation(payload));
    }

    pub fn send_altitude(&self, payload: AltitudePayload) {
        self.send(UpdateMessage::Altitude(payload));
    }

    pub fn send_arrival(&self, payload: ArrivalPayload) {
        self.send(UpdateMessage::Arrival(payload));
    }

    fn send(&self, message: UpdateMessage) {
        match self.tx.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                self.metrics.record_update_dropped();
                debug!(message = ?message, "update_dropped_queue_full");
            }
            Err(TrySendError::Closed(_)) => {
                debug!("update_channel_closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender_with_capacity(capacity: usize) -> (UpdateSender, mpsc::Receiver<UpdateMessage>, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new());
        let (tx, rx) = create_update_channel(capacity, metrics.clone());
        (tx, rx, metrics)
    }

    fn heading_payload(degrees: f64) -> HeadingPayload {
        HeadingPayload { ts: 1, degrees, direction: "N".to_string() }
    }

    #[tokio::test]
    async fn test_send_and_receive() {
        let (tx, mut rx, _) = sender_with_capacity(4);
        tx.send_heading(heading_payload(12.0));
        match rx.recv().await.unwrap() {
            UpdateMessage::Heading(p) => assert_eq!(p.degrees, 12.0),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_full_queue_drops_and_counts() {
        let (tx, _rx, metrics) = sender_with_capacity(1);
        tx.send_heading(heading_payload(1.0));
        tx.send_heading(heading_payload(2.0));
        assert_eq!(metrics.updates_dropped(), 1);
    }

    #[test]
    fn test_payload_serialization_shape() {
        let message = UpdateMessage::Navigation(NavigationPayload {
            ts: 42,
            destination: "Picnic Point".to_string(),
            distance_m: 120.5,
            bearing_deg: 90.0,
            arrow_deg: 15.0,
            position_dms: None,
        });
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains(r#""update":"navigation""#));
        assert!(json.contains(r#""destination":"Picnic Point""#));
        assert!(!json.contains("position_dms"));
    }
}
