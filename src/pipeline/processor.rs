//! Signal Processing Pipeline
//!
//! The core orchestration component that runs every raw reading through the
//! six processing stages in fixed order:
//!
//! 1. Noise filter (median + rolling noise level)
//! 2. Calibration (offset, gain, frequency correction)
//! 3. Temperature compensation
//! 4. Exponential smoothing
//! 5. Parameter enhancement (complex decomposition, depth estimate)
//! 6. Quality scoring
//!
//! # Single-writer constraint
//!
//! The processor carries filter memory (sample histories, smoothing cells)
//! across calls, so every mutating operation takes `&mut self` and the type
//! provides no internal locking. Use one processor per acquisition session,
//! or serialize access behind an external lock or actor boundary such as
//! the [`SignalProcessor::run`] loop.
//!
//! # Example
//!
//! ```
//! use emprobe::{ProbeConfig, Reading};
//! use emprobe::pipeline::SignalProcessor;
//!
//! let mut processor = SignalProcessor::new(ProbeConfig::default());
//! let raw = Reading::raw(800.0, 30.0, 900.0, 100.0, 25.0);
//! let processed = processor.process(raw).expect("valid reading");
//! assert!(processed.quality_score > 0.0);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Receiver;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::ProbeConfig;
use crate::pipeline::{DeviceState, SessionStatus};
use crate::processing::{
    calibrate, compensate_temperature, enhance, score_quality, CalibrationParams, EmParameters,
    NoiseFilter, ProcessingError, Smoother,
};
use crate::types::Reading;

// ============================================================================
// Processing Stats
// ============================================================================

/// Read-only snapshot of processor internals for diagnostics/telemetry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Offset currently applied at the calibration stage
    pub calibration_offset: f64,
    /// Gain currently applied at the calibration stage
    pub gain_correction: f64,
    /// Reference temperature for thermal compensation (°C)
    pub temperature_reference: f64,
    /// Samples currently held in the noise-filter history
    pub history_size: usize,
    /// Noise level recomputed over the current history (0 if empty)
    pub average_noise_level: f64,
}

// ============================================================================
// Signal Processor
// ============================================================================

/// Owns all pipeline state for one acquisition session: the noise-filter
/// histories, the smoothing memory, and the active calibration parameters.
pub struct SignalProcessor {
    config: ProbeConfig,

    /// Calibration parameters applied at stage 2/3
    calibration: CalibrationParams,

    /// Stage 1 filter memory
    noise_filter: NoiseFilter,

    /// Stage 4 filter memory
    smoother: Smoother,

    /// Diagnostics from the most recent successful run
    last_parameters: Option<EmParameters>,

    /// Readings processed successfully
    processed_count: u64,

    /// Readings rejected at the validation boundary
    rejected_count: u64,
}

impl SignalProcessor {
    /// Create a processor seeded with the configured calibration defaults.
    pub fn new(config: ProbeConfig) -> Self {
        info!(
            history_capacity = config.filtering.history_capacity,
            alpha = config.smoothing.alpha,
            offset = config.calibration.offset,
            gain = config.calibration.gain,
            "Initializing SignalProcessor"
        );

        Self {
            calibration: CalibrationParams::from_config(&config.calibration),
            noise_filter: NoiseFilter::new(config.filtering.history_capacity),
            smoother: Smoother::new(config.smoothing.alpha),
            last_parameters: None,
            processed_count: 0,
            rejected_count: 0,
            config,
        }
    }

    /// Run the full six-stage pipeline on one raw reading.
    ///
    /// # Errors
    ///
    /// Rejects the reading before any stage runs (filter memory untouched)
    /// when its numeric preconditions are violated:
    /// - [`ProcessingError::NonPositiveFrequency`] when `frequency <= 0`
    ///   (the frequency correction and the conductivity chain are undefined)
    /// - [`ProcessingError::ZeroAmplitude`] when `amplitude == 0`
    ///   (the attenuation ratio is undefined)
    ///
    /// For valid inputs every derived field of the returned reading is a
    /// finite number.
    pub fn process(&mut self, reading: Reading) -> Result<Reading, ProcessingError> {
        if reading.frequency <= 0.0 {
            self.rejected_count += 1;
            return Err(ProcessingError::NonPositiveFrequency(reading.frequency));
        }
        if reading.amplitude == 0.0 {
            self.rejected_count += 1;
            return Err(ProcessingError::ZeroAmplitude);
        }

        let filtered = self.noise_filter.apply(&reading);
        let calibrated = calibrate(
            &filtered,
            &self.calibration,
            self.config.calibration.reference_frequency_hz,
        );
        let compensated = compensate_temperature(
            &calibrated,
            self.calibration.temperature_reference,
            &self.config.compensation,
        );
        let smoothed = self.smoother.apply(&compensated);
        let (mut out, parameters) = enhance(&smoothed, &self.config.depth);
        out.quality_score = score_quality(&out, &self.config.quality);

        self.last_parameters = Some(parameters);
        self.processed_count += 1;

        debug!(
            signal = out.signal_strength,
            noise = out.noise_level,
            depth = out.depth,
            quality = out.quality_score,
            "Reading processed"
        );

        Ok(out)
    }

    /// Replace the three calibration parameters.
    ///
    /// Values are applied exactly as given, with no range checks; subsequent
    /// `process` calls observe all three together.
    pub fn set_calibration(&mut self, offset: f64, gain: f64, temperature_reference: f64) {
        self.calibration = CalibrationParams {
            offset,
            gain,
            temperature_reference,
        };
        info!(
            offset,
            gain, temperature_reference, "Calibration parameters updated"
        );
    }

    /// Clear the sample histories and smoothing memory.
    ///
    /// The next `process` call behaves like the first of a fresh session.
    /// Calibration parameters are untouched.
    pub fn reset_filters(&mut self) {
        self.noise_filter.reset();
        self.smoother.reset();
        info!("Filter memory cleared; calibration parameters retained");
    }

    /// Snapshot of the processor internals.
    pub fn stats(&self) -> ProcessingStats {
        ProcessingStats {
            calibration_offset: self.calibration.offset,
            gain_correction: self.calibration.gain,
            temperature_reference: self.calibration.temperature_reference,
            history_size: self.noise_filter.history_len(),
            average_noise_level: self.noise_filter.noise_level(),
        }
    }

    /// Electrical diagnostics from the most recent successful run.
    pub fn last_parameters(&self) -> Option<&EmParameters> {
        self.last_parameters.as_ref()
    }

    /// Readings processed successfully since creation.
    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }

    /// Readings rejected at the validation boundary since creation.
    pub fn rejected_count(&self) -> u64 {
        self.rejected_count
    }

    // ========================================================================
    // Acquisition loop
    // ========================================================================

    /// Run the processing loop.
    ///
    /// Receives raw readings from the channel, runs each through the
    /// pipeline, and publishes results into the shared session state.
    /// Rejected readings are counted and logged, never fatal. Returns when
    /// the channel closes or the shutdown flag is raised.
    pub async fn run(
        &mut self,
        mut rx: Receiver<Reading>,
        state: Arc<RwLock<DeviceState>>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        info!("SignalProcessor starting acquisition loop");

        {
            let mut s = state.write().await;
            s.status = SessionStatus::Acquiring;
        }

        while !shutdown.load(Ordering::Relaxed) {
            // Recv with timeout so the shutdown flag is checked periodically
            match tokio::time::timeout(tokio::time::Duration::from_millis(100), rx.recv()).await {
                Ok(Some(raw)) => match self.process(raw) {
                    Ok(processed) => {
                        let mut s = state.write().await;
                        s.readings_processed = self.processed_count;
                        s.readings_rejected = self.rejected_count;
                        s.last_quality_score = processed.quality_score;
                        s.last_processed_time = Some(processed.timestamp);
                        s.status = SessionStatus::Acquiring;
                        s.latest_reading = Some(processed);
                    }
                    Err(e) => {
                        warn!(error = %e, "Reading rejected at validation boundary");
                        let mut s = state.write().await;
                        s.readings_rejected = self.rejected_count;
                        s.status = SessionStatus::Degraded;
                    }
                },
                Ok(None) => {
                    // Channel closed
                    break;
                }
                Err(_) => {
                    // Timeout, check shutdown and continue
                    continue;
                }
            }
        }

        info!(
            processed = self.processed_count,
            rejected = self.rejected_count,
            "SignalProcessor shutting down"
        );
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> SignalProcessor {
        SignalProcessor::new(ProbeConfig::default())
    }

    #[test]
    fn first_reading_end_to_end() {
        let mut p = processor();
        let out = p
            .process(Reading::raw(800.0, 30.0, 900.0, 100.0, 25.0))
            .expect("valid reading");

        // First sample: no history, default calibration, reference
        // temperature, so stages 1-4 are pass-through.
        assert_eq!(out.noise_level, 0.0);
        assert_eq!(out.calibration_offset, 0.0);
        assert_eq!(out.signal_strength, 800.0);

        assert!((out.real_part - 779.4229).abs() < 1e-3);
        assert!((out.imaginary_part - 450.0).abs() < 1e-9);
        assert!((out.magnitude - 900.0).abs() < 1e-9);
        assert!((out.depth - 2.2314).abs() < 1e-3);

        // snr 1 (zero noise) * signal 0.8 * frequency 1 * temperature 1
        assert!((out.quality_score - 0.8).abs() < 1e-12);
        assert!(out.is_finite());
    }

    #[test]
    fn calibration_is_applied() {
        let mut p = processor();
        p.set_calibration(10.0, 2.0, 25.0);

        let out = p
            .process(Reading::raw(110.0, 0.0, 900.0, 100.0, 25.0))
            .expect("valid reading");

        // (110 - 10) * 2 * 1/sqrt(1) = 200
        assert!((out.signal_strength - 200.0).abs() < 1e-9);
        assert_eq!(out.calibration_offset, 10.0);
    }

    #[test]
    fn smoothing_blends_from_the_second_reading() {
        let mut p = processor();
        let first = p
            .process(Reading::raw(100.0, 10.0, 900.0, 100.0, 25.0))
            .expect("valid reading");
        assert_eq!(first.signal_strength, 100.0);

        let second = p
            .process(Reading::raw(200.0, 10.0, 900.0, 100.0, 25.0))
            .expect("valid reading");
        // 0.1 * 200 + 0.9 * 100
        assert!((second.signal_strength - 110.0).abs() < 1e-9);
    }

    #[test]
    fn history_is_evicted_after_capacity() {
        let mut p = processor();

        // One outlier, then ten identical readings: the outlier falls out
        // of the window and the recomputed noise level returns to zero.
        p.process(Reading::raw(10_000.0, 0.0, 900.0, 100.0, 25.0))
            .expect("valid reading");
        for _ in 0..10 {
            p.process(Reading::raw(5.0, 0.0, 900.0, 100.0, 25.0))
                .expect("valid reading");
        }

        let stats = p.stats();
        assert_eq!(stats.history_size, 10);
        assert_eq!(stats.average_noise_level, 0.0);
    }

    #[test]
    fn invalid_frequency_is_rejected_without_touching_state() {
        let mut p = processor();
        p.process(Reading::raw(100.0, 0.0, 900.0, 100.0, 25.0))
            .expect("valid reading");

        let err = p
            .process(Reading::raw(100.0, 0.0, 900.0, 0.0, 25.0))
            .expect_err("zero frequency must be rejected");
        assert!(matches!(err, ProcessingError::NonPositiveFrequency(_)));

        // Filter memory unchanged by the rejected reading
        assert_eq!(p.stats().history_size, 1);
        assert_eq!(p.rejected_count(), 1);
        assert_eq!(p.processed_count(), 1);
    }

    #[test]
    fn zero_amplitude_is_rejected() {
        let mut p = processor();
        let err = p
            .process(Reading::raw(100.0, 0.0, 0.0, 100.0, 25.0))
            .expect_err("zero amplitude must be rejected");
        assert!(matches!(err, ProcessingError::ZeroAmplitude));
    }

    #[test]
    fn reset_restores_cold_start_but_keeps_calibration() {
        let mut p = processor();
        p.set_calibration(10.0, 2.0, 25.0);

        for s in [110.0, 120.0, 130.0, 140.0] {
            p.process(Reading::raw(s, 5.0, 900.0, 100.0, 25.0))
                .expect("valid reading");
        }
        assert!(p.stats().history_size > 0);

        p.reset_filters();

        let stats = p.stats();
        assert_eq!(stats.history_size, 0);
        assert_eq!(stats.average_noise_level, 0.0);
        // Calibration survives the reset
        assert_eq!(stats.calibration_offset, 10.0);
        assert_eq!(stats.gain_correction, 2.0);

        // Next reading behaves like the first of a fresh session:
        // no median, no blend, zero noise.
        let out = p
            .process(Reading::raw(110.0, 5.0, 900.0, 100.0, 25.0))
            .expect("valid reading");
        assert_eq!(out.noise_level, 0.0);
        assert!((out.signal_strength - 200.0).abs() < 1e-9);
    }

    #[test]
    fn quality_stays_in_bounds_over_a_session() {
        let mut p = processor();
        for i in 0..50 {
            let signal = 400.0 + (i as f64) * 13.7 % 600.0;
            let out = p
                .process(Reading::raw(signal, 15.0, 880.0, 100.0, 24.0))
                .expect("valid reading");
            assert!((0.0..=1.0).contains(&out.quality_score));
            assert!(out.is_finite());
        }
    }

    #[test]
    fn diagnostics_are_published_after_processing() {
        let mut p = processor();
        assert!(p.last_parameters().is_none());

        p.process(Reading::raw(800.0, 30.0, 900.0, 100.0, 25.0))
            .expect("valid reading");

        let params = p.last_parameters().expect("diagnostics present");
        assert!(params.conductivity.is_finite());
        assert!(params.skin_depth > 0.0);
    }

    #[tokio::test]
    async fn run_loop_processes_and_counts_rejections() {
        use tokio::sync::mpsc;

        let mut p = processor();
        let state = Arc::new(RwLock::new(DeviceState::default()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let (tx, rx) = mpsc::channel(32);

        for i in 0..10 {
            let reading = Reading::raw(500.0 + i as f64, 10.0, 900.0, 100.0, 25.0);
            tx.send(reading).await.expect("send");
        }
        // One invalid reading in the stream
        tx.send(Reading::raw(500.0, 10.0, 900.0, 0.0, 25.0))
            .await
            .expect("send");
        drop(tx);

        let state_clone = state.clone();
        p.run(rx, state_clone, shutdown).await.expect("run loop");

        let s = state.read().await;
        assert_eq!(s.readings_processed, 10);
        assert_eq!(s.readings_rejected, 1);
        assert!(s.latest_reading.is_some());
        assert_eq!(s.status, SessionStatus::Degraded);
    }

    #[tokio::test]
    async fn run_loop_honors_shutdown_flag() {
        use tokio::sync::mpsc;

        let mut p = processor();
        let state = Arc::new(RwLock::new(DeviceState::default()));
        let shutdown = Arc::new(AtomicBool::new(true));

        // Channel stays open, but the raised flag stops the loop
        let (_tx, rx) = mpsc::channel::<Reading>(4);
        p.run(rx, state, shutdown).await.expect("run loop");
    }
}
