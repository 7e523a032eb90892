//! Navigation session log - appends completed sessions to file
//!
//! Sessions are written in JSONL format (one JSON object per line) to the
//! file specified in config, whether they end by arrival or explicitly.

use crate::domain::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{error, info, warn};

/// Why a navigation session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    Arrived,
    Ended,
}

impl SessionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionOutcome::Arrived => "arrived",
            SessionOutcome::Ended => "ended",
        }
    }
}

/// One completed navigation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub destination: String,
    pub lat: f64,
    pub lon: f64,
    pub outcome: SessionOutcome,
    pub final_distance_m: f64,
    pub started_ts: u64,
    pub ended_ts: u64,
    /// RFC 3339 rendering of `ended_ts` for log readability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
}

impl SessionRecord {
    pub fn new(
        label: &str,
        destination: GeoPoint,
        outcome: SessionOutcome,
        final_distance_m: f64,
        started_ts: u64,
        ended_ts: u64,
    ) -> Self {
        let ended_at = OffsetDateTime::from_unix_timestamp_nanos(ended_ts as i128 * 1_000_000)
            .ok()
            .and_then(|t| t.format(&Rfc3339).ok());
        Self {
            destination: label.to_string(),
            lat: destination.lat,
            lon: destination.lon,
            outcome,
            final_distance_m,
            started_ts,
            ended_ts,
            ended_at,
        }
    }
}

/// Append-only writer for completed sessions
///
/// The log file lives at one fixed path for the lifetime of the process,
/// so its parent directory is prepared once here rather than per write.
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new(file_path: &str) -> Self {
        let path = PathBuf::from(file_path);
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!(dir = %parent.display(), error = %e, "session_log_dir_unavailable");
                }
            }
            _ => {}
        }
        info!(file = %path.display(), "session_log_initialized");
        Self { path }
    }

    /// Write a session record; returns true on success
    pub fn write_session(&self, record: &SessionRecord) -> bool {
        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "session_serialize_failed");
                return false;
            }
        };

        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{}", json));

        match appended {
            Ok(()) => {
                info!(
                    destination = %record.destination,
                    outcome = %record.outcome.as_str(),
                    final_distance_m = %record.final_distance_m,
                    "session_logged"
                );
                true
            }
            Err(e) => {
                error!(destination = %record.destination, error = %e, "session_log_failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn record(outcome: SessionOutcome) -> SessionRecord {
        SessionRecord::new(
            "Picnic Point",
            GeoPoint::new(43.0898, -89.4154),
            outcome,
            7.5,
            1_000,
            2_000,
        )
    }

    #[test]
    fn test_write_session_appends_valid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.jsonl");
        let log = SessionLog::new(path.to_str().unwrap());

        assert!(log.write_session(&record(SessionOutcome::Arrived)));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with('\n'));
        let parsed: SessionRecord = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(parsed.destination, "Picnic Point");
        assert_eq!(parsed.outcome, SessionOutcome::Arrived);
        assert_eq!(parsed.final_distance_m, 7.5);
        assert_eq!(parsed.ended_at.as_deref(), Some("1970-01-01T00:00:02Z"));
    }

    #[test]
    fn test_appends_one_line_per_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.jsonl");
        let log = SessionLog::new(path.to_str().unwrap());

        log.write_session(&record(SessionOutcome::Arrived));
        log.write_session(&record(SessionOutcome::Ended));

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let _parsed: SessionRecord = serde_json::from_str(line).unwrap();
        }
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("logs").join("nav").join("sessions.jsonl");
        let log = SessionLog::new(nested.to_str().unwrap());

        assert!(log.write_session(&record(SessionOutcome::Ended)));
        assert!(nested.exists());
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        let json = serde_json::to_string(&record(SessionOutcome::Arrived)).unwrap();
        assert!(json.contains(r#""outcome":"arrived""#));
    }
}
