//! Shared motion contract (`AbstractMotion`) and the SDOF filter formula
//! every motion kind uses identically.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionType {
    Outcrop,
    Within,
    IncomingOnly,
}

/// Single-degree-of-freedom oscillator transfer function,
/// `H(f) = -fn^2 / (f^2 - fn^2 - 2i (zeta/100) fn f)`, sampled on `freq`.
pub fn sdof_transfer_function(freq: &[f64], period: f64, damping_pct: f64) -> Vec<Complex64> {
    let fn_ = 1.0 / period;
    let zeta = damping_pct / 100.0;
    freq.iter()
        .map(|&f| {
            let denom = Complex64::new(f * f - fn_ * fn_, -2.0 * zeta * fn_ * f);
            if denom.norm() < 1e-300 {
                Complex64::new(0.0, 0.0)
            } else {
                Complex64::new(-fn_ * fn_, 0.0) / denom
            }
        })
        .collect()
}

/// Capability set every motion kind implements: Fourier spectrum access,
/// SDOF-filtered peak response, and response-spectrum evaluation.
pub trait AbstractMotion {
    fn freq(&self) -> &[f64];
    fn motion_type(&self) -> MotionType;
    fn pga(&self) -> f64;
    fn pgv(&self) -> f64;

    /// Peak absolute acceleration response when the motion's FAS is
    /// filtered by `tf` (sampled on `freq()`).
    fn max(&self, tf: &[Complex64]) -> f64;
    /// Peak absolute velocity response under the same filtering.
    fn max_vel(&self, tf: &[Complex64]) -> f64;
    /// Peak absolute shear-strain response; `tf` is expressed against the
    /// input *velocity* FAS per spec.md §4.1 to avoid a singular division
    /// at f=0.
    fn calc_max_strain(&self, tf: &[Complex64]) -> f64;

    fn calc_sdof_tf(&self, period: f64, damping_pct: f64) -> Vec<Complex64> {
        sdof_transfer_function(self.freq(), period, damping_pct)
    }

    /// Acceleration response spectrum: `Sa(T) = max(accel_tf . sdof_tf(T))`.
    fn compute_sa(&self, periods: &[f64], damping_pct: f64, accel_tf: &[Complex64]) -> Vec<f64> {
        periods
            .iter()
            .map(|&period| {
                let sdof_tf = self.calc_sdof_tf(period, damping_pct);
                let combined: Vec<Complex64> =
                    accel_tf.iter().zip(sdof_tf.iter()).map(|(&a, &s)| a * s).collect();
                self.max(&combined)
            })
            .collect()
    }
}
