//! Strain-indexed modulus-reduction and damping curves.

use crate::dimension::interp_log_log;
use crate::error::StrataError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    ModulusReduction,
    Damping,
}

/// A strain-indexed monotone sequence. `varied` defaults to `avg` and is
/// overwritten in place by the nonlinear-property randomizer (spec.md §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonlinearProperty {
    pub kind: PropertyKind,
    pub strains: Vec<f64>,
    pub avg: Vec<f64>,
    pub varied: Vec<f64>,
}

impl NonlinearProperty {
    pub fn new(kind: PropertyKind, strains: Vec<f64>, avg: Vec<f64>) -> Result<Self, StrataError> {
        if strains.len() != avg.len() {
            return Err(StrataError::Input(
                "strains and avg must have the same length".to_string(),
            ));
        }
        if strains.is_empty() {
            return Err(StrataError::Input("nonlinear property table must not be empty".to_string()));
        }
        if !strains.windows(2).all(|w| w[0] < w[1]) {
            return Err(StrataError::Input("strains must be strictly increasing".to_string()));
        }
        let varied = avg.clone();
        Ok(Self { kind, strains, avg, varied })
    }

    /// Log-linear interpolation of the *varied* curve at `strain_pct`
    /// (strain in percent, matching the EQL driver's internal units);
    /// endpoint-held outside the table range.
    pub fn interp(&self, strain_pct: f64) -> f64 {
        let x = strain_pct.max(1e-12);
        interp_log_log(&self.strains, &self.varied, x)
    }

    /// Same as [`NonlinearProperty::interp`] but against the unvaried
    /// (`avg`) curve, used when no randomization is configured.
    pub fn interp_avg(&self, strain_pct: f64) -> f64 {
        let x = strain_pct.max(1e-12);
        interp_log_log(&self.strains, &self.avg, x)
    }

    pub fn reset_varied(&mut self) {
        self.varied = self.avg.clone();
    }
}

/// Darendeli (2001) modulus-reduction and damping curve generator, used
/// when a `SoilType` specifies mean-effective-stress/plasticity-index
/// parameters instead of a digitized curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DarendeliParameters {
    /// Mean effective stress, atmospheres.
    pub mean_stress_atm: f64,
    pub plasticity_index: f64,
    pub over_consolidation_ratio: f64,
    pub loading_frequency_hz: f64,
    pub num_cycles: f64,
}

impl DarendeliParameters {
    /// Reference strain (%) at which G/Gmax = 0.5 (Darendeli eq. 7).
    pub fn reference_strain(&self) -> f64 {
        (0.0352 + 0.0010 * self.plasticity_index * self.over_consolidation_ratio.powf(0.3246))
            * self.mean_stress_atm.powf(0.3483)
    }

    /// Curvature coefficient `a` (Darendeli eq. 8), fixed at 0.92 per the
    /// original regression.
    pub fn curvature(&self) -> f64 {
        0.9190
    }

    pub fn modulus_reduction_at(&self, strain_pct: f64) -> f64 {
        let ref_strain = self.reference_strain();
        let a = self.curvature();
        1.0 / (1.0 + (strain_pct / ref_strain).powf(a))
    }

    /// Small-strain (minimum) damping ratio in percent (Darendeli eq. 9).
    pub fn min_damping_pct(&self) -> f64 {
        (0.8005 + 0.0129 * self.plasticity_index * self.over_consolidation_ratio.powf(-0.1069))
            * self.mean_stress_atm.powf(-0.2889)
            * (1.0 + 0.2919 * self.loading_frequency_hz.ln())
    }

    /// Masing damping at a given strain before the small-strain correction
    /// (Darendeli eq. 11, with Phillips-Stewart cyclic-count correction
    /// folded in via `num_cycles`).
    pub fn masing_damping_pct(&self, strain_pct: f64) -> f64 {
        let gg_max = self.modulus_reduction_at(strain_pct);
        let c1 = -1.1143 * self.curvature().powi(2) + 1.8618 * self.curvature() + 0.2523;
        let c2 = 0.0805 * self.curvature().powi(2) - 0.0710 * self.curvature() - 0.0095;
        let c3 = -0.0005 * self.curvature().powi(2) + 0.0002 * self.curvature() + 0.0003;
        let masing_a1 = 100.0 / std::f64::consts::PI
            * (4.0 * (strain_pct - self.reference_strain() * (gg_max / (1.0 - gg_max)).ln())
                / strain_pct
                - 2.0);
        let d_masing_a1 = c1 * masing_a1 + c2 * masing_a1.powi(2) + c3 * masing_a1.powi(3);
        d_masing_a1 * 0.6329 * self.num_cycles.powf(-0.2)
    }

    pub fn damping_at(&self, strain_pct: f64) -> f64 {
        let gg_max = self.modulus_reduction_at(strain_pct);
        gg_max * self.masing_damping_pct(strain_pct) + self.min_damping_pct()
    }

    /// Builds the tabulated `NonlinearProperty` pair on the given strain
    /// axis (percent).
    pub fn to_curves(
        &self,
        strains_pct: &[f64],
    ) -> Result<(NonlinearProperty, NonlinearProperty), StrataError> {
        let modulus: Vec<f64> = strains_pct.iter().map(|&s| self.modulus_reduction_at(s)).collect();
        let damping: Vec<f64> = strains_pct.iter().map(|&s| self.damping_at(s)).collect();
        Ok((
            NonlinearProperty::new(PropertyKind::ModulusReduction, strains_pct.to_vec(), modulus)?,
            NonlinearProperty::new(PropertyKind::Damping, strains_pct.to_vec(), damping)?,
        ))
    }
}
