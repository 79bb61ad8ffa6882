//! Measurement reading types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One electromagnetic-induction measurement.
///
/// A reading starts life with only the raw channels populated (as delivered
/// by the handheld device) and is enriched stage by stage as it moves through
/// the pipeline. Fields are additive: every stage derives a new value from
/// its input and carries all previously computed fields forward unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    /// Acquisition timestamp
    pub timestamp: DateTime<Utc>,

    // === Raw Channels ===
    /// Magnitude of the detected field response
    pub signal_strength: f64,
    /// Phase offset of the response relative to excitation (degrees)
    pub phase: f64,
    /// Magnitude of the raw oscillation
    pub amplitude: f64,
    /// Excitation frequency (Hz); callers must supply a positive value
    pub frequency: f64,
    /// Ambient/sensor temperature (°C)
    pub temperature: f64,

    // === Derived: Noise Filter ===
    /// Standard deviation of the recent signal history
    #[serde(default)]
    pub noise_level: f64,

    // === Derived: Calibration ===
    /// Offset that was applied during calibration, recorded for traceability
    #[serde(default)]
    pub calibration_offset: f64,

    // === Derived: Parameter Enhancement ===
    /// In-phase (resistive) component of the response
    #[serde(default)]
    pub real_part: f64,
    /// Quadrature (reactive) component of the response
    #[serde(default)]
    pub imaginary_part: f64,
    /// Magnitude of the complex response
    #[serde(default)]
    pub magnitude: f64,
    /// Estimated burial depth of the detected anomaly (m)
    #[serde(default)]
    pub depth: f64,

    // === Derived: Quality Scoring ===
    /// Composite confidence in the reading, in [0, 1]
    #[serde(default)]
    pub quality_score: f64,
}

impl Reading {
    /// Create a raw reading from the five device channels.
    ///
    /// All derived fields start at zero and are filled in by the pipeline.
    pub fn raw(
        signal_strength: f64,
        phase: f64,
        amplitude: f64,
        frequency: f64,
        temperature: f64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            signal_strength,
            phase,
            amplitude,
            frequency,
            temperature,
            noise_level: 0.0,
            calibration_offset: 0.0,
            real_part: 0.0,
            imaginary_part: 0.0,
            magnitude: 0.0,
            depth: 0.0,
            quality_score: 0.0,
        }
    }

    /// Whether every field of the reading is a finite number.
    ///
    /// Processed readings from valid inputs are always finite; this is the
    /// integrity check downstream consumers can apply before persisting.
    pub fn is_finite(&self) -> bool {
        [
            self.signal_strength,
            self.phase,
            self.amplitude,
            self.frequency,
            self.temperature,
            self.noise_level,
            self.calibration_offset,
            self.real_part,
            self.imaginary_part,
            self.magnitude,
            self.depth,
            self.quality_score,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
