//! Quality Scorer - composite confidence in a processed reading
//!
//! Multiplies four factors (signal-to-noise ratio, absolute signal
//! strength, frequency stability, temperature stability), each clamped
//! to [0, 1] before multiplying. All four are always computed; a zero factor
//! never short-circuits the others.

use crate::config::QualityConfig;
use crate::types::Reading;

/// Score one reading in [0, 1].
///
/// A noise level of exactly zero means the history shows no deviation at
/// all: SNR is treated as unbounded and the SNR factor saturates at 1
/// rather than dividing by zero. A non-positive excitation frequency is the
/// sole path that forces the composite to exactly 0.
pub fn score_quality(reading: &Reading, config: &QualityConfig) -> f64 {
    let snr_quality = if reading.noise_level == 0.0 {
        1.0
    } else {
        ((reading.signal_strength / reading.noise_level) / config.snr_full_scale).clamp(0.0, 1.0)
    };

    let signal_quality = (reading.signal_strength / config.signal_full_scale).clamp(0.0, 1.0);

    let frequency_quality = if reading.frequency > 0.0 {
        (config.reference_frequency_hz / reading.frequency).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let temperature_deviation =
        (reading.temperature - config.temperature_reference_c).abs() / config.temperature_span_c;
    let temperature_quality =
        (1.0 - temperature_deviation.min(config.max_temperature_penalty)).clamp(0.0, 1.0);

    (snr_quality * signal_quality * frequency_quality * temperature_quality).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> QualityConfig {
        QualityConfig::default()
    }

    fn reading(signal: f64, noise: f64, frequency: f64, temperature: f64) -> Reading {
        let mut r = Reading::raw(signal, 0.0, 900.0, frequency, temperature);
        r.noise_level = noise;
        r
    }

    #[test]
    fn zero_noise_saturates_snr_factor() {
        // signal 800: snr = 1, signal = 0.8, frequency = 1, temperature = 1
        let score = score_quality(&reading(800.0, 0.0, 100.0, 25.0), &config());
        assert!((score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn weak_snr_drags_the_score_down() {
        // SNR = 500/100 = 5 → factor 0.25; signal factor 0.5
        let score = score_quality(&reading(500.0, 100.0, 100.0, 25.0), &config());
        assert!((score - 0.25 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn strong_snr_saturates_at_one() {
        // SNR = 800/10 = 80 → factor clamps at 1
        let score = score_quality(&reading(800.0, 10.0, 100.0, 25.0), &config());
        assert!((score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn zero_frequency_forces_zero_score() {
        let score = score_quality(&reading(800.0, 0.0, 0.0, 25.0), &config());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn negative_frequency_forces_zero_score() {
        let score = score_quality(&reading(800.0, 0.0, -50.0, 25.0), &config());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn high_frequencies_reduce_the_frequency_factor() {
        // 400 Hz → factor 0.25
        let score = score_quality(&reading(1000.0, 0.0, 400.0, 25.0), &config());
        assert!((score - 0.25).abs() < 1e-12);
    }

    #[test]
    fn temperature_penalty_is_capped_at_half() {
        // 100 °C off reference: raw penalty 2.0, capped at 0.5
        let far = score_quality(&reading(1000.0, 0.0, 100.0, 125.0), &config());
        assert!((far - 0.5).abs() < 1e-12);

        // 25 °C off reference: penalty 0.5 exactly, same floor
        let edge = score_quality(&reading(1000.0, 0.0, 100.0, 50.0), &config());
        assert!((edge - 0.5).abs() < 1e-12);
    }

    #[test]
    fn negative_signal_clamps_factors_to_zero() {
        let score = score_quality(&reading(-200.0, 50.0, 100.0, 25.0), &config());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn score_is_always_within_bounds() {
        let cases = [
            (800.0, 0.0, 100.0, 25.0),
            (1500.0, 2.0, 50.0, 25.0),
            (10.0, 400.0, 5000.0, -40.0),
            (-5.0, 1.0, 100.0, 90.0),
            (0.0, 0.0, 1.0, 25.0),
        ];
        for (signal, noise, frequency, temperature) in cases {
            let score = score_quality(&reading(signal, noise, frequency, temperature), &config());
            assert!(
                (0.0..=1.0).contains(&score),
                "score {score} out of bounds for signal {signal}"
            );
        }
    }
}
