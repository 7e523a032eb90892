//! IO modules - external interfaces of the pipeline
//!
//! This module contains all external IO operations:
//! - `places` - Read-only place dataset (JSONL, loaded once at startup)
//! - `replay` - JSONL sensor-event replay into the event channel
//! - `update_channel` - Typed channel for display updates
//! - `session_log` - Completed-session output to file (JSONL format)

pub mod places;
pub mod replay;
pub mod session_log;
pub mod update_channel;

// Re-export commonly used types
pub use places::PlaceStore;
pub use replay::run_replay;
pub use session_log::{SessionLog, SessionOutcome, SessionRecord};
pub use update_channel::{create_update_channel, UpdateMessage, UpdateSender};
