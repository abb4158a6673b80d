//! Linear-elastic driver: the equivalent-linear algorithm run for exactly
//! one pass with no property update (spec.md §4.2).

use crate::error::StrataError;
use crate::kernel::equivalent_linear::{run_equivalent_linear, ConvergenceParams, IterationResult};
use crate::motion::common::{AbstractMotion, MotionType};
use crate::soil::profile::SoilProfile;
use crate::soil::sublayer::Location;

pub fn run_linear_elastic<M: AbstractMotion>(
    profile: &mut SoilProfile,
    motion: &M,
    input_location: Location,
    input_motion_type: MotionType,
    gravity: f64,
) -> Result<IterationResult, StrataError> {
    let params = ConvergenceParams { strain_ratio: 1.0, error_tolerance_pct: 0.0, max_iterations: 1 };
    run_equivalent_linear(profile, motion, input_location, input_motion_type, gravity, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Distribution;
    use crate::motion::rvt::RvtMotion;
    use crate::nonlinear_property::{NonlinearProperty, PropertyKind};
    use crate::soil::layer::{RockLayer, SoilLayer};
    use crate::soil::soil_type::SoilType;
    use num_complex::Complex64;

    #[test]
    fn rigid_halfspace_gives_unit_surface_to_bedrock_amplification() {
        // A single soft layer over a far stiffer half-space: a degenerate
        // case where the two materials are identical collapses the profile
        // to a uniform half-space and surface-to-bedrock motion is
        // unchanged in amplitude at f -> 0.
        let flat = |kind| NonlinearProperty::new(kind, vec![1e-4, 1.0], vec![1.0, 1.0]).unwrap();
        let st = SoilType::new("Rock-like", 22.0, 0.5, flat(PropertyKind::ModulusReduction), flat(PropertyKind::Damping))
            .unwrap();
        let layer = SoilLayer::new(15.0, Distribution::normal(760.0, 0.0), 0).unwrap();
        let rock = RockLayer::new(22.0, 760.0, 0.5);
        let mut profile = SoilProfile::new(vec![st], vec![layer], rock, 1000.0).unwrap();
        profile.discretize(9.81, 20.0, 0.20, true);

        let freq: Vec<f64> = (1..=50).map(|i| i as f64 * 0.1).collect();
        let fas = vec![1.0; freq.len()];
        let motion = RvtMotion::new("m", freq, fas, 10.0, MotionType::Outcrop).unwrap();

        let bedrock = Location::new(profile.sub_layers.len(), 0.0);
        let result = run_linear_elastic(&mut profile, &motion, bedrock, MotionType::Outcrop, 9.81).unwrap();
        assert!(result.converged);

        let surface = Location::new(0, 0.0);
        let tf = result.wave_field.accel_tf(bedrock, MotionType::Outcrop, surface, MotionType::Within);
        // No impedance contrast anywhere in the profile: at the lowest
        // frequency the wave is essentially unattenuated end to end, so
        // surface-within motion matches bedrock-outcrop motion.
        assert!((tf[0] - Complex64::new(1.0, 0.0)).norm() < 1e-2);
    }
}
