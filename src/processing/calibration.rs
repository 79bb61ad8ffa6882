//! Calibrator - offset, gain and frequency-dependent correction
//!
//! Applies the operator-set calibration to the noise-filtered signal. The
//! frequency correction `1 / sqrt(f / f_ref)` is an attenuation-curve
//! heuristic normalizing gain relative to the reference excitation
//! frequency; at the reference frequency the correction is unity.

use serde::{Deserialize, Serialize};

use crate::config::CalibrationConfig;
use crate::types::Reading;

/// Calibration parameters active on a processor.
///
/// Replaced as a unit by the calibration-update operation, so subsequent
/// pipeline runs always observe a consistent set. Values are applied
/// exactly as given; nothing is range-checked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalibrationParams {
    /// Signal offset subtracted before gain
    pub offset: f64,
    /// Gain multiplier applied after offset removal
    pub gain: f64,
    /// Reference temperature for thermal compensation (°C)
    pub temperature_reference: f64,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            offset: 0.0,
            gain: 1.0,
            temperature_reference: 25.0,
        }
    }
}

impl CalibrationParams {
    /// Seed runtime parameters from the configured startup defaults.
    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self {
            offset: config.offset,
            gain: config.gain,
            temperature_reference: config.temperature_reference_c,
        }
    }
}

/// Apply offset subtraction, gain and the frequency correction.
///
/// The offset used is recorded on the output reading for traceability.
///
/// Precondition: `reading.frequency > 0`. The pipeline boundary rejects
/// non-positive frequencies before this stage runs; called directly with
/// `frequency <= 0` the correction factor is numerically undefined.
pub fn calibrate(
    reading: &Reading,
    params: &CalibrationParams,
    reference_frequency_hz: f64,
) -> Reading {
    let frequency_correction = 1.0 / (reading.frequency / reference_frequency_hz).sqrt();

    let mut out = reading.clone();
    out.signal_strength =
        (reading.signal_strength - params.offset) * params.gain * frequency_correction;
    out.calibration_offset = params.offset;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_and_gain_at_reference_frequency() {
        // (110 - 10) * 2 * (1 / sqrt(100/100)) = 200
        let reading = Reading::raw(110.0, 0.0, 900.0, 100.0, 25.0);
        let params = CalibrationParams {
            offset: 10.0,
            gain: 2.0,
            temperature_reference: 25.0,
        };

        let out = calibrate(&reading, &params, 100.0);
        assert!((out.signal_strength - 200.0).abs() < 1e-12);
        assert_eq!(out.calibration_offset, 10.0);
    }

    #[test]
    fn defaults_are_identity() {
        let reading = Reading::raw(800.0, 30.0, 900.0, 100.0, 25.0);
        let out = calibrate(&reading, &CalibrationParams::default(), 100.0);

        assert_eq!(out.signal_strength, 800.0);
        assert_eq!(out.calibration_offset, 0.0);
    }

    #[test]
    fn higher_frequencies_are_attenuated() {
        // At 400 Hz the correction is 1/sqrt(4) = 0.5
        let reading = Reading::raw(100.0, 0.0, 900.0, 400.0, 25.0);
        let out = calibrate(&reading, &CalibrationParams::default(), 100.0);
        assert!((out.signal_strength - 50.0).abs() < 1e-12);
    }

    #[test]
    fn lower_frequencies_are_boosted() {
        // At 25 Hz the correction is 1/sqrt(0.25) = 2
        let reading = Reading::raw(100.0, 0.0, 900.0, 25.0, 25.0);
        let out = calibrate(&reading, &CalibrationParams::default(), 100.0);
        assert!((out.signal_strength - 200.0).abs() < 1e-12);
    }

    #[test]
    fn untouched_channels_carry_through() {
        let reading = Reading::raw(110.0, 33.0, 875.0, 200.0, 19.0);
        let params = CalibrationParams {
            offset: 10.0,
            gain: 2.0,
            temperature_reference: 25.0,
        };

        let out = calibrate(&reading, &params, 100.0);
        assert_eq!(out.phase, 33.0);
        assert_eq!(out.amplitude, 875.0);
        assert_eq!(out.frequency, 200.0);
        assert_eq!(out.temperature, 19.0);
    }
}
