//! Smoother - first-order exponential smoothing across readings
//!
//! Single-pole IIR: `smoothed = alpha * current + (1 - alpha) * previous`,
//! applied independently to signal strength, phase and amplitude, carrying
//! its memory across pipeline runs.

use crate::types::Reading;

/// Exponential moving average over successive readings.
///
/// The device firmware zero-initialized its memory cells and only blended
/// when the previous value was positive; that cold-start behavior is kept:
/// a stored value <= 0 re-arms passthrough for the next sample. The memory
/// cells are modeled as `Option<f64>` so "no prior sample" is explicit
/// rather than overloaded onto zero.
#[derive(Debug, Clone)]
pub struct Smoother {
    alpha: f64,
    previous_signal: Option<f64>,
    previous_phase: Option<f64>,
    previous_amplitude: Option<f64>,
}

impl Smoother {
    /// Create a smoother with the given smoothing factor (weight of the
    /// newest sample).
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            previous_signal: None,
            previous_phase: None,
            previous_amplitude: None,
        }
    }

    /// Smooth one reading and update the memory cells.
    ///
    /// The memory is overwritten unconditionally with the output values,
    /// whether they were blended or passed through.
    pub fn apply(&mut self, reading: &Reading) -> Reading {
        let mut out = reading.clone();
        out.signal_strength = self.blend(self.previous_signal, reading.signal_strength);
        out.phase = self.blend(self.previous_phase, reading.phase);
        out.amplitude = self.blend(self.previous_amplitude, reading.amplitude);

        self.previous_signal = Some(out.signal_strength);
        self.previous_phase = Some(out.phase);
        self.previous_amplitude = Some(out.amplitude);
        out
    }

    fn blend(&self, previous: Option<f64>, current: f64) -> f64 {
        match previous {
            Some(prev) if prev > 0.0 => self.alpha * current + (1.0 - self.alpha) * prev,
            _ => current,
        }
    }

    /// Forget all memory; the next reading passes through unblended.
    pub fn reset(&mut self) {
        self.previous_signal = None;
        self.previous_phase = None;
        self.previous_amplitude = None;
    }
}
