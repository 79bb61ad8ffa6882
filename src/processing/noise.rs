//! Noise Filter - statistical suppression of sample-to-sample jitter
//!
//! Maintains bounded FIFO histories of recent signal and phase values,
//! replaces each incoming sample with the median of the last three once
//! enough history exists, and derives a rolling noise level from the full
//! signal history. Degrades gracefully with insufficient history; there are
//! no error conditions.

use std::collections::VecDeque;

use statrs::statistics::Statistics;

use crate::types::Reading;

/// Samples the median window spans.
const MEDIAN_WINDOW: usize = 3;

/// Minimum history length for a meaningful deviation estimate.
const MIN_NOISE_SAMPLES: usize = 2;

/// Sliding-window median filter with a rolling noise estimate.
///
/// Signal and phase histories are evicted in lockstep, strictly FIFO, once
/// the configured capacity is exceeded.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    capacity: usize,
    signal_history: VecDeque<f64>,
    phase_history: VecDeque<f64>,
}

impl NoiseFilter {
    /// Create an empty filter keeping at most `capacity` samples per channel.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            signal_history: VecDeque::with_capacity(capacity),
            phase_history: VecDeque::with_capacity(capacity),
        }
    }

    /// Run the filter over one reading, updating the histories.
    ///
    /// Below [`MEDIAN_WINDOW`] samples the raw values pass through unchanged;
    /// from then on signal and phase are replaced by the median of the last
    /// three entries. The noise level is always recomputed over the entire
    /// signal history.
    pub fn apply(&mut self, reading: &Reading) -> Reading {
        self.push(reading.signal_strength, reading.phase);

        let mut out = reading.clone();
        if self.signal_history.len() >= MEDIAN_WINDOW {
            out.signal_strength = median_of_last(&self.signal_history, MEDIAN_WINDOW);
            out.phase = median_of_last(&self.phase_history, MEDIAN_WINDOW);
        }
        out.noise_level = self.noise_level();
        out
    }

    fn push(&mut self, signal: f64, phase: f64) {
        if self.signal_history.len() >= self.capacity {
            self.signal_history.pop_front();
            self.phase_history.pop_front();
        }
        self.signal_history.push_back(signal);
        self.phase_history.push_back(phase);
    }

    /// Population standard deviation of the entire signal history.
    ///
    /// Returns 0.0 below [`MIN_NOISE_SAMPLES`] samples.
    pub fn noise_level(&self) -> f64 {
        if self.signal_history.len() < MIN_NOISE_SAMPLES {
            return 0.0;
        }
        self.signal_history.iter().population_std_dev()
    }

    /// Number of samples currently held per channel.
    pub fn history_len(&self) -> usize {
        self.signal_history.len()
    }

    /// Discard all history; the next reading starts a fresh window.
    pub fn reset(&mut self) {
        self.signal_history.clear();
        self.phase_history.clear();
    }
}

/// Median of the last `window` entries of `history`.
///
/// Sorts ascending and picks the middle element; an even count averages the
/// two middle elements (only reachable while the history is still shorter
/// than the window).
fn median_of_last(history: &VecDeque<f64>, window: usize) -> f64 {
    let skip = history.len().saturating_sub(window);
    let mut values: Vec<f64> = history.iter().skip(skip).copied().collect();
    values.sort_by(f64::total_cmp);

    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}
