//! Signal processing stages for the measurement pipeline
//!
//! Each stage consumes the previous stage's output reading and returns a new
//! reading value; the only mutable state lives inside the stateful filters
//! (`NoiseFilter`, `Smoother`) owned by the pipeline. Stage order is fixed:
//! noise → calibration → temperature → smoothing → enhancement → quality.

mod calibration;
mod enhancement;
mod noise;
mod quality;
mod smoothing;
mod temperature;

pub use calibration::{calibrate, CalibrationParams};
pub use enhancement::{enhance, EmParameters};
pub use noise::NoiseFilter;
pub use quality::score_quality;
pub use smoothing::Smoother;
pub use temperature::compensate_temperature;

use thiserror::Error;

/// Errors in signal processing.
///
/// The pipeline validates its numeric preconditions at the boundary instead
/// of letting NaN/Infinity propagate into downstream consumers; a rejected
/// reading leaves all filter memory untouched.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("invalid reading: excitation frequency must be positive, got {0}")]
    NonPositiveFrequency(f64),

    #[error("invalid reading: oscillation amplitude must be non-zero")]
    ZeroAmplitude,
}
