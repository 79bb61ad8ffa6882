//! Device State and Session Status
//!
//! Shared state for an acquisition session, accessible from telemetry
//! consumers and display surfaces while the processing loop runs.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::Reading;

/// Shared session state updated by the processing loop.
///
/// Wrap in `Arc<RwLock<>>` for access across the async runtime; the
/// processing loop is the only writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceState {
    /// Current session status
    pub status: SessionStatus,

    /// Most recent fully processed reading
    pub latest_reading: Option<Reading>,

    /// Readings processed successfully this session
    pub readings_processed: u64,

    /// Readings rejected at the validation boundary this session
    pub readings_rejected: u64,

    /// Quality score of the most recent processed reading
    pub last_quality_score: f64,

    /// Timestamp of the most recent processed reading
    pub last_processed_time: Option<chrono::DateTime<chrono::Utc>>,

    /// Session uptime (not serialized)
    #[serde(skip, default = "Instant::now")]
    pub uptime: Instant,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Initializing,
            latest_reading: None,
            readings_processed: 0,
            readings_rejected: 0,
            last_quality_score: 0.0,
            last_processed_time: None,
            uptime: Instant::now(),
        }
    }
}

impl DeviceState {
    /// Get session uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.uptime.elapsed().as_secs()
    }
}

/// Session operational status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Session is starting up
    Initializing,
    /// Readings are flowing and processing normally
    Acquiring,
    /// The most recent reading was rejected at the validation boundary
    Degraded,
    /// Processing loop failed
    Error,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Initializing => write!(f, "Initializing"),
            SessionStatus::Acquiring => write!(f, "Acquiring"),
            SessionStatus::Degraded => write!(f, "Degraded"),
            SessionStatus::Error => write!(f, "Error"),
        }
    }
}
