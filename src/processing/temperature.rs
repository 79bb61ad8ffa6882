//! Temperature Compensator - thermal rescale of signal and phase
//!
//! Electronics gain and coil phase both drift with temperature; this stage
//! rescales the calibrated signal by `1 + delta * c_signal` and shifts the
//! phase by `delta * c_phase`, where `delta` is the deviation from the
//! reference temperature.

use crate::config::CompensationConfig;
use crate::types::Reading;

/// Compensate one reading for temperature deviation from `reference_c`.
///
/// The compensation divisor is floored at `config.min_factor`: the factor
/// only approaches zero hundreds of degrees below reference, but a corrupted
/// temperature channel must not divide the signal by ~0.
pub fn compensate_temperature(
    reading: &Reading,
    reference_c: f64,
    config: &CompensationConfig,
) -> Reading {
    let delta = reading.temperature - reference_c;
    let factor = (1.0 + delta * config.signal_coefficient_per_c).max(config.min_factor);

    let mut out = reading.clone();
    out.signal_strength = reading.signal_strength / factor;
    out.phase = reading.phase - delta * config.phase_coefficient_deg_per_c;
    out
}
