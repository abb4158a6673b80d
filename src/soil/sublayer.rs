//! Kernel-level discretization unit and the `Location` addressing scheme
//! used to reference a point in the profile (or the half-space beyond it).

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Addresses a point in the discretized profile: `sub_layer_index` past the
/// last sublayer refers to the half-space, in which case
/// `depth_within_sub_layer` is measured from the top of the half-space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub sub_layer_index: usize,
    pub depth_within_sub_layer: f64,
}

impl Location {
    pub fn new(sub_layer_index: usize, depth_within_sub_layer: f64) -> Self {
        Self { sub_layer_index, depth_within_sub_layer }
    }

    pub fn is_half_space(&self, sub_layer_count: usize) -> bool {
        self.sub_layer_index >= sub_layer_count
    }
}

/// A discretization unit of a `SoilLayer`, thin enough that
/// `thickness <= shear_vel / (max_freq * wave_fraction)` (unless
/// auto-discretization is disabled).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubLayer {
    pub thickness: f64,
    pub depth: f64,
    /// Vertical total stress at the base of the sublayer.
    pub vertical_stress: f64,
    pub water_table_depth: f64,
    /// Index into `SoilProfile::layers`, the owning `SoilLayer`.
    pub soil_layer_index: usize,
    pub shear_vel: f64,
    pub unit_weight: f64,

    pub shear_mod: f64,
    pub damping_pct: f64,
    pub old_shear_mod: f64,
    pub old_damping_pct: f64,
    pub eff_strain_pct: f64,
    pub max_strain_pct: f64,
    pub error_pct: f64,
}

impl SubLayer {
    pub fn density(&self, gravity: f64) -> f64 {
        self.unit_weight / gravity
    }

    /// Complex shear modulus `G*(f) = G (1 - D^2 + 2iD)` (Kramer's
    /// simplified form), constant across frequency for the EQL driver.
    pub fn complex_shear_modulus(&self) -> Complex64 {
        let d = self.damping_pct / 100.0;
        Complex64::new(self.shear_mod * (1.0 - d * d), self.shear_mod * 2.0 * d)
    }

    pub fn relative_error(&self, new_shear_mod: f64, new_damping_pct: f64) -> f64 {
        let g_err = if self.shear_mod.abs() > 0.0 {
            ((new_shear_mod - self.shear_mod) / self.shear_mod).abs()
        } else {
            0.0
        };
        let d_err = if self.damping_pct.abs() > 0.0 {
            ((new_damping_pct - self.damping_pct) / self.damping_pct).abs()
        } else {
            0.0
        };
        g_err.max(d_err) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sublayer(shear_mod: f64, damping_pct: f64) -> SubLayer {
        SubLayer {
            thickness: 2.0,
            depth: 2.0,
            vertical_stress: 40.0,
            water_table_depth: 1.0,
            soil_layer_index: 0,
            shear_vel: 200.0,
            unit_weight: 18.0,
            shear_mod,
            damping_pct,
            old_shear_mod: shear_mod,
            old_damping_pct: damping_pct,
            eff_strain_pct: 0.0,
            max_strain_pct: 0.0,
            error_pct: 0.0,
        }
    }

    #[test]
    fn complex_shear_modulus_matches_kramer_form() {
        let sl = sample_sublayer(1.0e5, 5.0);
        let g_star = sl.complex_shear_modulus();
        let d = 0.05;
        assert!((g_star.re - 1.0e5 * (1.0 - d * d)).abs() < 1e-6);
        assert!((g_star.im - 1.0e5 * 2.0 * d).abs() < 1e-6);
    }

    #[test]
    fn relative_error_is_zero_for_unchanged_properties() {
        let sl = sample_sublayer(1.0e5, 5.0);
        assert_eq!(sl.relative_error(1.0e5, 5.0), 0.0);
    }

    #[test]
    fn location_identifies_half_space() {
        let loc = Location::new(3, 0.0);
        assert!(loc.is_half_space(3));
        assert!(!loc.is_half_space(4));
    }
}
