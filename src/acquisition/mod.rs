//! Sensor data acquisition
//!
//! The transport to real hardware (Bluetooth/USB pairing, framing, device
//! identification) lives in the companion device service; this module
//! defines the source contract the pipeline consumes, plus a simulated
//! probe for tests and demos.

mod simulator;

pub use simulator::{Scenario, SimulatedProbe};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::Reading;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("source is not connected")]
    NotConnected,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Sensor Source
// ============================================================================

/// A source of raw probe readings.
///
/// Implementations own their transport state; the pipeline only ever calls
/// `read` between a successful `connect` and `disconnect`.
#[async_trait]
pub trait SensorSource {
    /// Establish the connection to the device.
    async fn connect(&mut self) -> Result<(), AcquisitionError>;

    /// Tear down the connection.
    async fn disconnect(&mut self) -> Result<(), AcquisitionError>;

    /// Read the next batch of raw readings.
    async fn read(&mut self) -> Result<Vec<Reading>, AcquisitionError>;

    /// Whether the source is currently connected.
    fn is_connected(&self) -> bool;
}
