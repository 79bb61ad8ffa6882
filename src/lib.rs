//! emprobe: signal processing core for handheld EM-induction survey probes
//!
//! Converts raw electromagnetic-induction sensor readings (signal strength,
//! phase, amplitude, excitation frequency, temperature) into calibrated,
//! noise-reduced, physically-enriched measurements with an attached quality
//! score.
//!
//! ## Architecture
//!
//! - **Processing stages**: noise filter → calibration → temperature
//!   compensation → exponential smoothing → parameter enhancement → quality
//!   scoring, run in that order for every reading
//! - **Pipeline**: `SignalProcessor` owns all filter memory and the
//!   calibration parameters, and drives the stages synchronously
//! - **Acquisition**: `SensorSource` trait plus a simulated probe for
//!   testing and demos

pub mod acquisition;
pub mod config;
pub mod pipeline;
pub mod processing;
pub mod types;

// Re-export probe configuration
pub use config::ProbeConfig;

// Re-export the central value type
pub use types::Reading;

// Re-export pipeline components
pub use pipeline::{DeviceState, ProcessingStats, SessionStatus, SignalProcessor};

// Re-export stage-level types used at the API surface
pub use processing::{CalibrationParams, EmParameters, ProcessingError};
