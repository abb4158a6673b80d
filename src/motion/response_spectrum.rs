//! Acceleration response spectra and spectral ratios, built on top of
//! [`AbstractMotion::compute_sa`].

use crate::motion::common::AbstractMotion;
use num_complex::Complex64;

#[derive(Debug, Clone)]
pub struct ResponseSpectrum {
    pub periods: Vec<f64>,
    pub damping_pct: f64,
    pub sa: Vec<f64>,
}

impl ResponseSpectrum {
    pub fn compute<M: AbstractMotion>(motion: &M, periods: &[f64], damping_pct: f64, accel_tf: &[Complex64]) -> Self {
        let sa = motion.compute_sa(periods, damping_pct, accel_tf);
        Self { periods: periods.to_vec(), damping_pct, sa }
    }
}

/// Ratio of two response spectra computed on the same period axis, e.g. a
/// surface-to-outcrop amplification spectrum.
pub fn spectral_ratio(numerator: &ResponseSpectrum, denominator: &ResponseSpectrum) -> Vec<f64> {
    assert_eq!(numerator.periods.len(), denominator.periods.len());
    numerator
        .sa
        .iter()
        .zip(denominator.sa.iter())
        .map(|(&n, &d)| if d.abs() > 0.0 { n / d } else { 0.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::common::MotionType;
    use crate::motion::time_series::TimeSeriesMotion;

    #[test]
    fn self_ratio_is_unity() {
        let dt = 0.01;
        let acc: Vec<f64> = (0..256).map(|i| (2.0 * std::f64::consts::PI * 2.5 * i as f64 * dt).sin()).collect();
        let motion = TimeSeriesMotion::new("m", dt, acc, MotionType::Outcrop).unwrap();
        let periods = vec![0.1, 0.2, 0.5, 1.0];
        let ones = vec![Complex64::new(1.0, 0.0); motion.freq().len()];
        let rs = ResponseSpectrum::compute(&motion, &periods, 5.0, &ones);
        let ratio = spectral_ratio(&rs, &rs);
        for r in ratio {
            assert!((r - 1.0).abs() < 1e-9);
        }
    }
}
