//! Random-vibration-theory peak response estimation (spec.md §4.3):
//! spectral moments, the Cartwright–Longuet-Higgins peak factor, and
//! oscillator-duration correction models.

use crate::fft::trapz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationCorrectionModel {
    BooreJoyner1984,
    LiuPezeshk1999,
}

impl Default for DurationCorrectionModel {
    fn default() -> Self {
        DurationCorrectionModel::BooreJoyner1984
    }
}

/// Spectral moments `m_i = 2 * integral(0..inf) (2 pi f)^i G(f)^2 df`,
/// computed by the trapezoid rule over the supplied (already
/// tf-filtered) FAS `g`.
pub struct SpectralMoments {
    pub m0: f64,
    pub m1: f64,
    pub m2: f64,
}

pub fn spectral_moments(freq: &[f64], g: &[f64]) -> SpectralMoments {
    let omega: Vec<f64> = freq.iter().map(|&f| 2.0 * std::f64::consts::PI * f).collect();
    let g2: Vec<f64> = g.iter().map(|&v| v * v).collect();
    let m0_integrand: Vec<f64> = g2.clone();
    let m1_integrand: Vec<f64> = omega.iter().zip(g2.iter()).map(|(&w, &g2)| w * g2).collect();
    let m2_integrand: Vec<f64> = omega.iter().zip(g2.iter()).map(|(&w, &g2)| w * w * g2).collect();
    SpectralMoments {
        m0: 2.0 * trapz(freq, &m0_integrand),
        m1: 2.0 * trapz(freq, &m1_integrand),
        m2: 2.0 * trapz(freq, &m2_integrand),
    }
}

impl SpectralMoments {
    /// Zero-crossing rate `nu = (1/pi) sqrt(m2/m0)`.
    pub fn zero_crossing_rate(&self) -> f64 {
        if self.m0 <= 0.0 {
            0.0
        } else {
            (1.0 / std::f64::consts::PI) * (self.m2 / self.m0).sqrt()
        }
    }

    /// Bandwidth parameter `delta = sqrt(1 - m1^2/(m0 m2))`, clamped to
    /// `[0, 1]` to guard against roundoff pushing it slightly negative or
    /// above one for near-narrowband spectra.
    pub fn bandwidth(&self) -> f64 {
        if self.m0 <= 0.0 || self.m2 <= 0.0 {
            return 0.0;
        }
        let inner = 1.0 - (self.m1 * self.m1) / (self.m0 * self.m2);
        inner.clamp(0.0, 1.0).sqrt()
    }
}

/// Mean number of extrema over the duration, bounded below by 2.
pub fn num_extrema(moments: &SpectralMoments, duration_s: f64) -> f64 {
    (moments.zero_crossing_rate() * duration_s).max(2.0)
}

/// Expected peak factor via Cartwright–Longuet-Higgins:
/// `PF = sqrt(2) * integral(0..inf) [1 - (1 - delta e^{-z^2})^N] dz`,
/// evaluated by adaptive Simpson quadrature out to where the integrand is
/// negligible.
pub fn peak_factor(delta: f64, num_extrema: f64, tolerance: f64) -> f64 {
    let integrand = |z: f64| -> f64 {
        let base = 1.0 - delta * (-z * z).exp();
        if base <= 0.0 {
            1.0
        } else {
            1.0 - base.powf(num_extrema)
        }
    };
    // The integrand decays like exp(-z^2); z=6 is comfortably past machine
    // epsilon for any reasonable delta/N combination used here.
    let integral = adaptive_simpson(&integrand, 0.0, 6.0, tolerance, 20);
    std::f64::consts::SQRT_2 * integral
}

fn adaptive_simpson<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64, tol: f64, max_depth: u32) -> f64 {
    fn simpson<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> f64 {
        let c = 0.5 * (a + b);
        (b - a) / 6.0 * (f(a) + 4.0 * f(c) + f(b))
    }

    fn recurse<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64, whole: f64, tol: f64, depth: u32) -> f64 {
        let c = 0.5 * (a + b);
        let left = simpson(f, a, c);
        let right = simpson(f, c, b);
        if depth == 0 || (left + right - whole).abs() < 15.0 * tol {
            left + right + (left + right - whole) / 15.0
        } else {
            recurse(f, a, c, left, tol / 2.0, depth - 1) + recurse(f, c, b, right, tol / 2.0, depth - 1)
        }
    }

    let whole = simpson(f, a, b);
    recurse(f, a, b, whole, tol, max_depth)
}

/// Duration used by the RMS-response calc for an oscillator of natural
/// frequency `fn_hz` and damping `zeta_pct`, per the selected correction
/// model. Both models are closed-form rational functions of `(fn * Td)`
/// and `zeta`.
pub fn rms_duration(model: DurationCorrectionModel, duration_s: f64, fn_hz: f64, zeta_pct: f64) -> f64 {
    let fn_td = fn_hz * duration_s;
    let zeta = zeta_pct / 100.0;
    let factor = match model {
        DurationCorrectionModel::BooreJoyner1984 => {
            if fn_td < 1e-9 {
                1.0
            } else {
                fn_td.powf(3.0) / (fn_td.powf(3.0) + 1.0 / 3.0)
            }
        }
        DurationCorrectionModel::LiuPezeshk1999 => {
            if fn_td < 1e-9 {
                1.0
            } else {
                let num = fn_td.powf(2.0) - zeta.powf(0.15) * (fn_td.powf(2.6) / (fn_td.powf(2.6) + 1.0));
                (num / fn_td.powf(2.0)).max(0.2)
            }
        }
    };
    duration_s * factor
}
