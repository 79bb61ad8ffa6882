//! Measurement pipeline - orchestration and shared session state

mod processor;
mod state;

pub use processor::{ProcessingStats, SignalProcessor};
pub use state::{DeviceState, SessionStatus};
