//! Probe Configuration - pipeline tunables as operator-editable TOML values
//!
//! Every empirical constant in the processing chain (calibration defaults,
//! history depth, smoothing factor, thermal coefficients, depth-model
//! constants, quality-score scales) is a field in this module. Each struct
//! implements `Default` with values matching the device firmware constants,
//! so behavior is unchanged when no config file is present.
//!
//! ## Loading Order
//!
//! 1. `EMPROBE_CONFIG` environment variable (path to TOML file)
//! 2. `emprobe.toml` in the current working directory
//! 3. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a probe deployment.
///
/// Load with `ProbeConfig::load()` which searches:
/// 1. `$EMPROBE_CONFIG` env var
/// 2. `./emprobe.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Probe identification
    #[serde(default)]
    pub probe: ProbeInfo,

    /// Default calibration parameters applied at startup
    #[serde(default)]
    pub calibration: CalibrationConfig,

    /// Noise filter tuning
    #[serde(default)]
    pub filtering: FilteringConfig,

    /// Exponential smoothing tuning
    #[serde(default)]
    pub smoothing: SmoothingConfig,

    /// Temperature compensation coefficients
    #[serde(default)]
    pub compensation: CompensationConfig,

    /// Burial-depth estimation model
    #[serde(default)]
    pub depth: DepthConfig,

    /// Quality score scales
    #[serde(default)]
    pub quality: QualityConfig,
}

impl ProbeConfig {
    /// Load configuration using the standard search order:
    /// 1. `$EMPROBE_CONFIG` environment variable
    /// 2. `./emprobe.toml` in the current working directory
    /// 3. Built-in defaults (firmware constants)
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("EMPROBE_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), probe = %config.probe.name, "Loaded probe config from EMPROBE_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from EMPROBE_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "EMPROBE_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("emprobe.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(probe = %config.probe.name, "Loaded probe config from ./emprobe.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./emprobe.toml, using defaults");
                }
            }
        }

        info!("No emprobe.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Probe / device identification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeInfo {
    /// Human-readable probe name
    pub name: String,
    /// Site or survey identifier for downstream storage
    pub site: String,
}

impl Default for ProbeInfo {
    fn default() -> Self {
        Self {
            name: "PROBE-001".to_string(),
            site: "DEFAULT".to_string(),
        }
    }
}

/// Calibration parameters applied until the operator runs a calibration pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Signal offset subtracted before gain (device counts)
    pub offset: f64,
    /// Gain multiplier applied after offset removal
    pub gain: f64,
    /// Reference temperature for thermal compensation (°C)
    pub temperature_reference_c: f64,
    /// Excitation frequency at which gain is unity (Hz)
    pub reference_frequency_hz: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            offset: 0.0,
            gain: 1.0,
            temperature_reference_c: 25.0,
            reference_frequency_hz: 100.0,
        }
    }
}

/// Noise filter tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilteringConfig {
    /// Number of recent samples kept for the rolling noise estimate
    pub history_capacity: usize,
}

impl Default for FilteringConfig {
    fn default() -> Self {
        Self {
            history_capacity: 10,
        }
    }
}

/// Exponential smoothing tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Weight given to the newest sample, in (0, 1]
    pub alpha: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { alpha: 0.1 }
    }
}

/// Temperature compensation coefficients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompensationConfig {
    /// Fractional signal change per °C of deviation from reference
    pub signal_coefficient_per_c: f64,
    /// Phase shift per °C of deviation from reference (degrees)
    pub phase_coefficient_deg_per_c: f64,
    /// Floor on the compensation divisor, keeping extreme deviations from
    /// dividing the signal by ~0
    pub min_factor: f64,
}

impl Default for CompensationConfig {
    fn default() -> Self {
        Self {
            signal_coefficient_per_c: 0.002,
            phase_coefficient_deg_per_c: 0.1,
            min_factor: 1e-3,
        }
    }
}

/// Burial-depth estimation model.
///
/// Empirical exponential-attenuation-with-depth model; the reference signal
/// and decay coefficient are field-tuned, not derived from first principles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthConfig {
    /// Signal level corresponding to a surface target (depth 0)
    pub reference_signal: f64,
    /// Exponential decay coefficient per meter of burial
    pub attenuation_coefficient: f64,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            reference_signal: 1000.0,
            attenuation_coefficient: 0.1,
        }
    }
}

/// Quality score scales
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// SNR at which the SNR factor saturates at 1.0
    pub snr_full_scale: f64,
    /// Signal strength at which the signal factor saturates at 1.0
    pub signal_full_scale: f64,
    /// Excitation frequency at which the frequency factor is 1.0 (Hz)
    pub reference_frequency_hz: f64,
    /// Temperature of maximum confidence (°C)
    pub temperature_reference_c: f64,
    /// Temperature deviation over which the penalty accrues (°C)
    pub temperature_span_c: f64,
    /// Maximum penalty the temperature factor can apply
    pub max_temperature_penalty: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            snr_full_scale: 20.0,
            signal_full_scale: 1000.0,
            reference_frequency_hz: 100.0,
            temperature_reference_c: 25.0,
            temperature_span_c: 50.0,
            max_temperature_penalty: 0.5,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
