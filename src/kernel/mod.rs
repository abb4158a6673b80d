//! Frequency-domain SH-wave propagation kernel: complex wave numbers,
//! up-/down-going wave amplitudes, and the transfer functions built from
//! them (spec.md §4.1).

pub mod equivalent_linear;
pub mod linear_elastic;

use crate::error::NumericsError;
use crate::motion::common::MotionType;
use crate::soil::sublayer::Location;
use num_complex::Complex64;

const EPS_FREQ_HZ: f64 = 1e-6;

/// Wave numbers and up-/down-going amplitudes across every layer (sublayers
/// followed by the half-space) and frequency, built once per equivalent-
/// linear iteration from the current complex shear moduli.
#[derive(Debug, Clone)]
pub struct WaveField {
    /// Per-layer density, length `nsl + 1` (sublayers then half-space).
    density: Vec<f64>,
    /// Per-layer complex shear modulus, constant across frequency.
    shear_mod: Vec<Complex64>,
    /// Sublayer thickness, length `nsl` (the half-space has none).
    thickness: Vec<f64>,
    /// `wave_num[layer][freq_idx]`.
    wave_num: Vec<Vec<Complex64>>,
    wave_a: Vec<Vec<Complex64>>,
    wave_b: Vec<Vec<Complex64>>,
}

impl WaveField {
    /// Builds the wave field on `freq`, given per-layer density and complex
    /// shear modulus (sublayers followed by the half-space, length
    /// `nsl + 1`) and per-sublayer thickness (length `nsl`).
    pub fn compute(
        density: Vec<f64>,
        shear_mod: Vec<Complex64>,
        thickness: Vec<f64>,
        freq: &[f64],
    ) -> Result<Self, NumericsError> {
        let n_layers = density.len();
        let nf = freq.len();

        let wave_num: Vec<Vec<Complex64>> = (0..n_layers)
            .map(|l| {
                freq.iter()
                    .map(|&f| {
                        let omega = 2.0 * std::f64::consts::PI * f;
                        Complex64::new(omega, 0.0) / (shear_mod[l] / density[l]).sqrt()
                    })
                    .collect()
            })
            .collect();

        let mut wave_a = vec![vec![Complex64::new(0.0, 0.0); nf]; n_layers];
        let mut wave_b = vec![vec![Complex64::new(0.0, 0.0); nf]; n_layers];

        for fi in 0..nf {
            wave_a[0][fi] = Complex64::new(1.0, 0.0);
            wave_b[0][fi] = Complex64::new(1.0, 0.0);

            for l in 0..n_layers - 1 {
                if freq[fi] <= EPS_FREQ_HZ {
                    wave_a[l + 1][fi] = Complex64::new(1.0, 0.0);
                    wave_b[l + 1][fi] = Complex64::new(1.0, 0.0);
                    continue;
                }
                let alpha = (wave_num[l][fi] * shear_mod[l]) / (wave_num[l + 1][fi] * shear_mod[l + 1]);
                let phi = Complex64::new(0.0, 1.0) * wave_num[l][fi] * thickness[l];
                let a = wave_a[l][fi];
                let b = wave_b[l][fi];
                let up = 0.5 * a * (1.0 + alpha) * phi.exp() + 0.5 * b * (1.0 - alpha) * (-phi).exp();
                let down = 0.5 * a * (1.0 - alpha) * phi.exp() + 0.5 * b * (1.0 + alpha) * (-phi).exp();
                if up.re.is_nan() || up.im.is_nan() || down.re.is_nan() || down.im.is_nan() {
                    return Err(NumericsError::WaveComputationNaN);
                }
                wave_a[l + 1][fi] = up;
                wave_b[l + 1][fi] = down;
            }
        }

        Ok(Self { density, shear_mod, thickness, wave_num, wave_a, wave_b })
    }

    pub fn sub_layer_count(&self) -> usize {
        self.thickness.len()
    }

    /// Evaluates the wave function at `location` for the `freq_idx`-th
    /// frequency under the given motion type (spec.md §4.1 item 3).
    pub fn waves(&self, location: Location, freq_idx: usize, motion_type: MotionType) -> Complex64 {
        let l = location.sub_layer_index.min(self.density.len() - 1);
        let c_term = Complex64::new(0.0, 1.0) * self.wave_num[l][freq_idx] * location.depth_within_sub_layer;
        let a = self.wave_a[l][freq_idx];
        let b = self.wave_b[l][freq_idx];
        match motion_type {
            MotionType::Within => a * c_term.exp() + b * (-c_term).exp(),
            MotionType::Outcrop => 2.0 * a * c_term.exp(),
            MotionType::IncomingOnly => a * c_term.exp(),
        }
    }

    /// Acceleration transfer function `waves(out) / waves(in)` across every
    /// frequency (spec.md §4.1 item 4).
    pub fn accel_tf(
        &self,
        in_loc: Location,
        in_type: MotionType,
        out_loc: Location,
        out_type: MotionType,
    ) -> Vec<Complex64> {
        (0..self.wave_num[0].len())
            .map(|fi| {
                let denom = self.waves(in_loc, fi, in_type);
                let numer = self.waves(out_loc, fi, out_type);
                if denom.norm() < 1e-300 {
                    Complex64::new(0.0, 0.0)
                } else {
                    numer / denom
                }
            })
            .collect()
    }

    /// Strain transfer function at the mid-depth of sublayer `layer_index`,
    /// expressed against the input velocity FAS to sidestep singular
    /// division at f=0 (spec.md §4.1 item 5). `gravity` converts to
    /// consistent strain units.
    pub fn strain_tf(&self, in_loc: Location, in_type: MotionType, layer_index: usize, gravity: f64) -> Vec<Complex64> {
        let mid_depth = 0.5 * self.thickness[layer_index];
        let vs_star = (self.shear_mod[layer_index] / self.density[layer_index]).sqrt();
        (0..self.wave_num[0].len())
            .map(|fi| {
                let c_term = Complex64::new(0.0, 1.0) * self.wave_num[layer_index][fi] * mid_depth;
                let a = self.wave_a[layer_index][fi];
                let b = self.wave_b[layer_index][fi];
                let numer = Complex64::new(gravity, -1.0) * (a * c_term.exp() - b * (-c_term).exp());
                let denom_wave = self.waves(in_loc, fi, in_type);
                if denom_wave.norm() < 1e-300 {
                    Complex64::new(0.0, 0.0)
                } else {
                    numer / (vs_star * denom_wave)
                }
            })
            .collect()
    }

    /// Stress transfer function, `G*_ℓ * strain_tf`.
    pub fn stress_tf(&self, in_loc: Location, in_type: MotionType, layer_index: usize, gravity: f64) -> Vec<Complex64> {
        self.strain_tf(in_loc, in_type, layer_index, gravity)
            .into_iter()
            .map(|s| s * self.shear_mod[layer_index])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_halfspace(freq: &[f64]) -> WaveField {
        // A single sublayer over an identical half-space: no impedance
        // contrast, so the reflected wave should vanish downward.
        let density = vec![2.0, 2.0];
        let shear_mod = vec![Complex64::new(1.0e8, 0.0), Complex64::new(1.0e8, 0.0)];
        let thickness = vec![10.0];
        WaveField::compute(density, shear_mod, thickness, freq).unwrap()
    }

    #[test]
    fn surface_amplitudes_are_unity() {
        let freq = vec![0.0, 1.0, 5.0];
        let wf = uniform_halfspace(&freq);
        for fi in 0..freq.len() {
            assert_eq!(wf.wave_a[0][fi], Complex64::new(1.0, 0.0));
            assert_eq!(wf.wave_b[0][fi], Complex64::new(1.0, 0.0));
        }
    }

    #[test]
    fn zero_frequency_forces_unit_amplitudes_downward() {
        let freq = vec![0.0];
        let wf = uniform_halfspace(&freq);
        assert_eq!(wf.wave_a[1][0], Complex64::new(1.0, 0.0));
        assert_eq!(wf.wave_b[1][0], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn accel_tf_is_unity_for_identical_location_and_type() {
        let freq = vec![0.5, 1.0, 2.0, 5.0];
        let wf = uniform_halfspace(&freq);
        let loc = Location::new(0, 0.0);
        let tf = wf.accel_tf(loc, MotionType::Within, loc, MotionType::Within);
        for v in tf {
            assert!((v - Complex64::new(1.0, 0.0)).norm() < 1e-9);
        }
    }

    #[test]
    fn no_impedance_contrast_propagates_without_reflection() {
        // With no contrast across the interface (alpha = 1) the interface
        // is transparent: both amplitudes are simply phase-shifted by
        // propagation through the layer, with no energy scattered between
        // the up- and down-going components.
        let freq = vec![2.0];
        let wf = uniform_halfspace(&freq);
        let phi = Complex64::new(0.0, 1.0) * wf.wave_num[0][0] * wf.thickness[0];
        let expected_a = wf.wave_a[0][0] * phi.exp();
        let expected_b = wf.wave_b[0][0] * (-phi).exp();
        assert!((wf.wave_a[1][0] - expected_a).norm() < 1e-6);
        assert!((wf.wave_b[1][0] - expected_b).norm() < 1e-6);
    }
}
