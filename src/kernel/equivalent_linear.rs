//! Equivalent-linear iteration driver (spec.md §4.2): strain-ratio
//! under-relaxation toward a strain-compatible secant shear modulus and
//! damping ratio.

use crate::error::{NumericsError, StrataError};
use crate::kernel::WaveField;
use crate::motion::common::{AbstractMotion, MotionType};
use crate::soil::profile::SoilProfile;
use crate::soil::sublayer::Location;
use num_complex::Complex64;

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ConvergenceParams {
    /// Under-relaxation factor `r`, applied to the peak strain to obtain the
    /// effective strain driving the next property update.
    pub strain_ratio: f64,
    pub error_tolerance_pct: f64,
    pub max_iterations: usize,
}

impl Default for ConvergenceParams {
    fn default() -> Self {
        Self { strain_ratio: 0.65, error_tolerance_pct: 2.0, max_iterations: 15 }
    }
}

#[derive(Debug, Clone)]
pub struct IterationResult {
    pub converged: bool,
    pub iterations_used: usize,
    pub max_error_pct: f64,
    pub wave_field: WaveField,
}

/// Runs the equivalent-linear iteration over `profile.sub_layers`, updating
/// each sublayer's `shear_mod`/`damping_pct` in place. With
/// `params.max_iterations <= 1` this degenerates to the linear-elastic
/// driver: one pass, no property update.
pub fn run_equivalent_linear<M: AbstractMotion>(
    profile: &mut SoilProfile,
    motion: &M,
    input_location: Location,
    input_motion_type: MotionType,
    gravity: f64,
    params: ConvergenceParams,
) -> Result<IterationResult, StrataError> {
    if profile.sub_layers.is_empty() {
        return Err(StrataError::Input("profile must be discretized before running the kernel".to_string()));
    }
    let nsl = profile.sub_layers.len();
    let linear_elastic = params.max_iterations <= 1;

    let mut max_error_pct = 0.0_f64;
    let mut converged = linear_elastic;
    let mut iterations_used = 0;
    let mut wave_field;

    loop {
        iterations_used += 1;

        let density: Vec<f64> = profile
            .sub_layers
            .iter()
            .map(|s| s.density(gravity))
            .chain(std::iter::once(profile.rock_layer.density(gravity)))
            .collect();
        let shear_mod: Vec<Complex64> = profile
            .sub_layers
            .iter()
            .map(|s| s.complex_shear_modulus())
            .chain(std::iter::once(Complex64::new(profile.half_space_shear_modulus(gravity), 0.0)))
            .collect();
        let thickness: Vec<f64> = profile.sub_layers.iter().map(|s| s.thickness).collect();

        wave_field = WaveField::compute(density, shear_mod, thickness, motion.freq())
            .map_err(|_: NumericsError| StrataError::Numerics(NumericsError::WaveComputationNaN))?;

        max_error_pct = f64::NEG_INFINITY;

        for l in 0..nsl {
            let strain_tf = wave_field.strain_tf(input_location, input_motion_type, l, gravity);
            let max_strain_pct = 100.0 * gravity * motion.calc_max_strain(&strain_tf);
            if max_strain_pct <= 0.0 {
                return Err(StrataError::Numerics(NumericsError::NonPositivePeakStrain));
            }
            let eff_strain_pct = params.strain_ratio * max_strain_pct;

            profile.sub_layers[l].max_strain_pct = max_strain_pct;
            profile.sub_layers[l].eff_strain_pct = eff_strain_pct;

            if linear_elastic {
                continue;
            }

            let soil_layer_index = profile.sub_layers[l].soil_layer_index;
            let soil_type_index = profile.layers[soil_layer_index].soil_type_index;
            let (g_ratio, damping_pct) = profile.soil_types[soil_type_index].interp_at(eff_strain_pct);
            let gmax = profile.gmax(soil_layer_index, gravity);
            let new_shear_mod = g_ratio * gmax;

            let sub = &mut profile.sub_layers[l];
            let error_pct = sub.relative_error(new_shear_mod, damping_pct);
            sub.old_shear_mod = sub.shear_mod;
            sub.old_damping_pct = sub.damping_pct;
            sub.error_pct = error_pct;
            sub.shear_mod = new_shear_mod;
            sub.damping_pct = damping_pct;

            max_error_pct = max_error_pct.max(error_pct);
        }

        if linear_elastic {
            break;
        }
        if max_error_pct <= params.error_tolerance_pct {
            converged = true;
            break;
        }
        if iterations_used >= params.max_iterations {
            break;
        }
    }

    let max_error_pct = if max_error_pct.is_finite() { max_error_pct } else { 0.0 };
    if linear_elastic {
        tracing::debug!(iterations_used, "linear-elastic pass complete");
    } else if converged {
        tracing::debug!(iterations_used, max_error_pct, "equivalent-linear iteration converged");
    } else {
        tracing::warn!(iterations_used, max_error_pct, "equivalent-linear iteration reached max_iterations without converging");
    }

    Ok(IterationResult { converged, iterations_used, max_error_pct, wave_field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Distribution;
    use crate::motion::rvt::RvtMotion;
    use crate::nonlinear_property::{NonlinearProperty, PropertyKind};
    use crate::soil::layer::{RockLayer, SoilLayer};
    use crate::soil::soil_type::SoilType;

    fn degrading_curve(kind: PropertyKind) -> NonlinearProperty {
        match kind {
            PropertyKind::ModulusReduction => {
                NonlinearProperty::new(kind, vec![1e-4, 1e-2, 1e-1, 1.0], vec![1.0, 0.7, 0.3, 0.1]).unwrap()
            }
            PropertyKind::Damping => {
                NonlinearProperty::new(kind, vec![1e-4, 1e-2, 1e-1, 1.0], vec![1.0, 3.0, 8.0, 15.0]).unwrap()
            }
        }
    }

    fn sample_profile() -> SoilProfile {
        let st = SoilType::new(
            "Sand",
            18.0,
            1.0,
            degrading_curve(PropertyKind::ModulusReduction),
            degrading_curve(PropertyKind::Damping),
        )
        .unwrap();
        let layer = SoilLayer::new(20.0, Distribution::normal(250.0, 0.0), 0).unwrap();
        let rock = RockLayer::new(30.0, 760.0, 1.0);
        let mut profile = SoilProfile::new(vec![st], vec![layer], rock, 100.0).unwrap();
        profile.discretize(9.81, 20.0, 0.20, false);
        profile
    }

    fn white_noise_motion() -> RvtMotion {
        let freq: Vec<f64> = (1..=1500).map(|i| 0.1 + (i as f64 - 1.0) * (25.0 - 0.1) / 1499.0).collect();
        let fas = vec![0.05; freq.len()];
        RvtMotion::new("wn", freq, fas, 10.0, MotionType::Outcrop).unwrap()
    }

    #[test]
    fn linear_elastic_driver_does_not_change_properties() {
        let mut profile = sample_profile();
        let motion = white_noise_motion();
        let gmax_before: Vec<f64> = profile.sub_layers.iter().map(|s| s.shear_mod).collect();
        let params = ConvergenceParams { strain_ratio: 0.65, error_tolerance_pct: 2.0, max_iterations: 1 };
        let bedrock = Location::new(profile.sub_layers.len(), 0.0);
        let result = run_equivalent_linear(&mut profile, &motion, bedrock, MotionType::Outcrop, 9.81, params).unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations_used, 1);
        let gmax_after: Vec<f64> = profile.sub_layers.iter().map(|s| s.shear_mod).collect();
        assert_eq!(gmax_before, gmax_after);
    }

    #[test]
    fn equivalent_linear_degrades_shear_modulus_from_gmax() {
        let mut profile = sample_profile();
        let motion = white_noise_motion();
        let gmax_before: Vec<f64> = profile.sub_layers.iter().map(|s| s.shear_mod).collect();
        let params = ConvergenceParams::default();
        let bedrock = Location::new(profile.sub_layers.len(), 0.0);
        let result = run_equivalent_linear(&mut profile, &motion, bedrock, MotionType::Outcrop, 9.81, params).unwrap();
        assert!(result.iterations_used >= 1);
        for (before, sub) in gmax_before.iter().zip(profile.sub_layers.iter()) {
            assert!(sub.shear_mod <= *before, "shear modulus should degrade from Gmax under nonzero strain");
            assert!(sub.damping_pct >= 1.0, "damping should increase from the small-strain value");
        }
    }
}
