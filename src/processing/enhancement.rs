//! Parameter Enhancer - complex-domain electromagnetic derivation
//!
//! Decomposes the smoothed response into its in-phase and quadrature
//! components, derives the apparent electrical parameters of the target
//! medium (conductivity, permeability, skin depth), and estimates burial
//! depth from signal attenuation.
//!
//! The electrical parameters feed the depth chain and are returned as
//! diagnostics; only the complex decomposition and the depth estimate land
//! on the reading itself.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::config::DepthConfig;
use crate::types::Reading;

/// Permeability of free space (T·m/A).
const MU_0: f64 = 4.0 * PI * 1e-7;

/// Electrical parameters derived from one reading.
///
/// Auxiliary diagnostic output: useful for telemetry and tuning, but not
/// part of the `Reading` contract consumed downstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmParameters {
    /// Ratio of detected signal to raw oscillation amplitude
    pub attenuation: f64,
    /// Apparent electrical conductivity of the target medium (S/m)
    pub conductivity: f64,
    /// Apparent magnetic permeability (H/m)
    pub permeability: f64,
    /// Depth at which the field decays to 1/e of its surface value (m)
    pub skin_depth: f64,
}

/// Derive the complex-plane representation, electrical parameters and depth
/// estimate for one smoothed reading.
///
/// Precondition: `reading.amplitude != 0` and `reading.frequency > 0`,
/// both enforced at the pipeline boundary. Called directly with a zero
/// amplitude the attenuation ratio is numerically undefined.
pub fn enhance(reading: &Reading, depth_model: &DepthConfig) -> (Reading, EmParameters) {
    let phase_rad = reading.phase.to_radians();
    let response = Complex64::from_polar(reading.amplitude, phase_rad);

    let omega = 2.0 * PI * reading.frequency;
    let attenuation = reading.signal_strength / reading.amplitude;
    let skin_depth_estimate = 1.0 / attenuation;
    let conductivity = 2.0 / (omega * MU_0 * skin_depth_estimate.powi(2));
    let permeability = MU_0 * (1.0 + phase_rad.cos().abs());
    let skin_depth = (2.0 / (omega * permeability * conductivity)).sqrt();

    let mut out = reading.clone();
    out.real_part = response.re;
    out.imaginary_part = response.im;
    out.magnitude = response.norm();
    out.depth = estimate_depth(reading.signal_strength, depth_model);

    (
        out,
        EmParameters {
            attenuation,
            conductivity,
            permeability,
            skin_depth,
        },
    )
}

/// Empirical exponential-attenuation depth model.
///
/// A target at the surface returns the reference signal; weaker signals map
/// to exponentially greater depth. Outside `(0, reference_signal)` there is
/// nothing to invert and the estimate is 0.
fn estimate_depth(signal_strength: f64, model: &DepthConfig) -> f64 {
    if signal_strength > 0.0 && signal_strength < model.reference_signal {
        -(signal_strength / model.reference_signal).ln() / model.attenuation_coefficient
    } else {
        0.0
    }
}
