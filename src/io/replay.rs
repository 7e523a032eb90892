//! Replay source - feeds recorded sensor events into the pipeline
//!
//! Reads JSONL sensor events from any buffered async reader (file or
//! stdin) and forwards them to the event channel, with optional pacing
//! between events to approximate real sensor cadence. Malformed lines are
//! skipped and logged, never fatal.

use crate::domain::types::SensorEvent;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// Read events from `reader` and send them downstream until the input or
/// the channel closes, or shutdown is signalled
///
/// Returns the number of events forwarded.
pub async fn run_replay<R: AsyncBufRead + Unpin>(
    reader: R,
    pace: Duration,
    event_tx: mpsc::Sender<SensorEvent>,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<u64> {
    let mut lines = reader.lines();
    let mut forwarded = 0u64;
    let mut skipped = 0u64;

    loop {
        let line = tokio::select! {
            changed = shutdown.changed() => {
                // A dropped shutdown sender also ends the replay
                if changed.is_err() || *shutdown.borrow() {
                    info!(forwarded = %forwarded, "replay_shutdown");
                    return Ok(forwarded);
                }
                continue;
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            break; // End of input
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: SensorEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, line = %line, "replay_line_malformed");
                skipped += 1;
                continue;
            }
        };

        if event_tx.send(event).await.is_err() {
            warn!(forwarded = %forwarded, "replay_channel_closed");
            break;
        }
        forwarded += 1;

        if !pace.is_zero() {
            tokio::time::sleep(pace).await;
        }
    }

    info!(forwarded = %forwarded, skipped = %skipped, "replay_complete");
    Ok(forwarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    struct TestChannels {
        tx: mpsc::Sender<SensorEvent>,
        rx: mpsc::Receiver<SensorEvent>,
        shutdown_rx: watch::Receiver<bool>,
        _shutdown_tx: watch::Sender<bool>,
    }

    fn channels() -> TestChannels {
        let (tx, rx) = mpsc::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        TestChannels { tx, rx, shutdown_rx, _shutdown_tx }
    }

    #[tokio::test]
    async fn test_replay_forwards_events_in_order() {
        let input = concat!(
            r#"{"event":"location","lat":1.0,"lon":2.0}"#,
            "\n",
            r#"{"event":"pressure","hpa":1010.0}"#,
            "\n",
        );
        let mut ch = channels();

        let forwarded =
            run_replay(BufReader::new(input.as_bytes()), Duration::ZERO, ch.tx.clone(), ch.shutdown_rx.clone())
                .await
                .unwrap();

        assert_eq!(forwarded, 2);
        assert_eq!(ch.rx.recv().await.unwrap(), SensorEvent::Location { lat: 1.0, lon: 2.0 });
        assert_eq!(ch.rx.recv().await.unwrap(), SensorEvent::Pressure { hpa: 1010.0 });
    }

    #[tokio::test]
    async fn test_replay_skips_malformed_lines() {
        let input = concat!(
            "not json\n",
            "\n",
            r#"{"event":"end_navigation"}"#,
            "\n",
        );
        let mut ch = channels();

        let forwarded =
            run_replay(BufReader::new(input.as_bytes()), Duration::ZERO, ch.tx.clone(), ch.shutdown_rx.clone())
                .await
                .unwrap();

        assert_eq!(forwarded, 1);
        assert_eq!(ch.rx.recv().await.unwrap(), SensorEvent::EndNavigation);
    }

    #[tokio::test]
    async fn test_replay_empty_input() {
        let ch = channels();
        let forwarded =
            run_replay(BufReader::new(&b""[..]), Duration::ZERO, ch.tx.clone(), ch.shutdown_rx.clone())
                .await
                .unwrap();
        assert_eq!(forwarded, 0);
    }
}
