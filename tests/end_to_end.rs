//! End-to-end scenarios exercising the public API across soil, motion and
//! kernel modules together, rather than any single module in isolation.

use strata::distribution::Distribution;
use strata::kernel::equivalent_linear::{run_equivalent_linear, ConvergenceParams};
use strata::kernel::linear_elastic::run_linear_elastic;
use strata::motion::common::{AbstractMotion, MotionType};
use strata::motion::rvt::RvtMotion;
use strata::nonlinear_property::{NonlinearProperty, PropertyKind};
use strata::soil::layer::{RockLayer, SoilLayer};
use strata::soil::profile::SoilProfile;
use strata::soil::soil_type::SoilType;
use strata::soil::sublayer::Location;

fn flat_curve(kind: PropertyKind) -> NonlinearProperty {
    NonlinearProperty::new(kind, vec![1e-4, 1.0], vec![1.0, 1.0]).unwrap()
}

/// Scenario 1: a single soil layer over a base so much stiffer and denser
/// than the layer that it behaves as rigid -- the classic quarter-wavelength
/// resonator, fundamental frequency `Vs/(4h)`, peak amplification
/// `1/(pi*D/2)` for lightly damped layers. The profile approximates the
/// rigid-base limit with a very high impedance contrast rather than a
/// literal infinite one, since the wave-propagation kernel always models a
/// finite half-space.
#[test]
fn one_layer_near_rigid_base_resonates_near_quarter_wavelength() {
    let st = SoilType::new("Soil", 19.62, 1.0, flat_curve(PropertyKind::ModulusReduction), flat_curve(PropertyKind::Damping)).unwrap();
    let layer = SoilLayer::new(30.0, Distribution::normal(300.0, 0.0), 0).unwrap();
    let rock = RockLayer::new(1.962e6, 300_000.0, 1.0);
    let mut profile = SoilProfile::new(vec![st], vec![layer], rock, 1000.0).unwrap();
    profile.discretize(9.81, 20.0, 0.05, false);

    let freq: Vec<f64> = (1..=500).map(|i| i as f64 * 0.02).collect();
    let fas = vec![1.0; freq.len()];
    let motion = RvtMotion::new("probe", freq.clone(), fas, 10.0, MotionType::Outcrop).unwrap();

    let bedrock = Location::new(profile.sub_layers.len(), 0.0);
    let surface = Location::new(0, 0.0);
    let result = run_linear_elastic(&mut profile, &motion, bedrock, MotionType::Outcrop, 9.81).unwrap();
    let tf = result.wave_field.accel_tf(bedrock, MotionType::Outcrop, surface, MotionType::Outcrop);

    let (peak_idx, peak_mag) =
        tf.iter().map(|c| c.norm()).enumerate().fold((0, 0.0), |acc, (i, m)| if m > acc.1 { (i, m) } else { acc });
    let peak_freq = freq[peak_idx];

    assert!((peak_freq - 2.5).abs() < 0.1, "resonant frequency {peak_freq} not near 2.5 Hz");
    assert!(peak_mag > 20.0, "peak amplification {peak_mag} too low for a near-rigid base");
}

/// Scenario 2: a soil layer over a half-space with a real (not rigid)
/// impedance contrast. Fundamental mode near `Vs/(4h) = 2.5 Hz`, surface
/// amplification of a moderate, finite magnitude.
#[test]
fn two_layer_profile_shows_sh_resonance_amplification() {
    let st = SoilType::new("Soil", 19.62, 5.0, flat_curve(PropertyKind::ModulusReduction), flat_curve(PropertyKind::Damping)).unwrap();
    let layer = SoilLayer::new(20.0, Distribution::normal(200.0, 0.0), 0).unwrap();
    let rock = RockLayer::new(19.62 * 5.0, 1000.0, 1.0);
    let mut profile = SoilProfile::new(vec![st], vec![layer], rock, 1000.0).unwrap();
    profile.discretize(9.81, 20.0, 0.05, false);

    let freq: Vec<f64> = (1..=500).map(|i| i as f64 * 0.02).collect();
    let fas = vec![1.0; freq.len()];
    let motion = RvtMotion::new("probe", freq.clone(), fas, 10.0, MotionType::Outcrop).unwrap();

    let bedrock = Location::new(profile.sub_layers.len(), 0.0);
    let surface = Location::new(0, 0.0);
    let result = run_linear_elastic(&mut profile, &motion, bedrock, MotionType::Outcrop, 9.81).unwrap();
    let tf = result.wave_field.accel_tf(bedrock, MotionType::Outcrop, surface, MotionType::Outcrop);

    let (peak_idx, peak_mag) =
        tf.iter().map(|c| c.norm()).enumerate().fold((0, 0.0), |acc, (i, m)| if m > acc.1 { (i, m) } else { acc });
    let peak_freq = freq[peak_idx];

    assert!((peak_freq - 2.5).abs() < 0.15, "resonant frequency {peak_freq} not near 2.5 Hz");
    assert!((peak_mag - 4.0).abs() < 1.5, "amplification {peak_mag} not near the expected 4.0");
}

/// Scenario 3: a 10-layer profile with Vucetic-Dobry-style degrading
/// modulus-reduction and damping curves, driven by a PGA = 0.3 g motion,
/// should converge well within the default 15-iteration budget at the
/// spec's default 0.65 strain ratio and 2.0% error tolerance.
#[test]
fn ten_layer_profile_converges_within_scenario_iteration_budget() {
    let strains = vec![1e-4, 1e-3, 1e-2, 3e-2, 1e-1, 3e-1, 1.0];
    let modulus = vec![1.0, 0.98, 0.85, 0.65, 0.40, 0.20, 0.08];
    let damping = vec![0.8, 1.5, 3.5, 7.0, 12.0, 18.0, 24.0];
    let curve = |kind, vals: &[f64]| NonlinearProperty::new(kind, strains.clone(), vals.to_vec()).unwrap();
    let st = SoilType::new(
        "Vucetic-Dobry sand",
        18.0,
        1.0,
        curve(PropertyKind::ModulusReduction, &modulus),
        curve(PropertyKind::Damping, &damping),
    )
    .unwrap();

    let layers: Vec<SoilLayer> = (0..10)
        .map(|i| SoilLayer::new(3.0, Distribution::normal(180.0 + i as f64 * 25.0, 0.0), 0).unwrap())
        .collect();
    let rock = RockLayer::new(22.0, 760.0, 1.0);
    let mut profile = SoilProfile::new(vec![st], layers, rock, 100.0).unwrap();
    profile.discretize(9.81, 20.0, 0.20, false);

    let freq: Vec<f64> = (1..=300).map(|i| i as f64 * 0.1).collect();
    // White-noise FAS scaled so the motion's estimated PGA lands near 0.3 g.
    let mut motion = RvtMotion::new("scenario-3", freq, vec![1.0; 300], 15.0, MotionType::Outcrop).unwrap();
    let raw_pga = motion.pga();
    let scale = (0.3 * 9.81) / raw_pga;
    motion.fas.iter_mut().for_each(|v| *v *= scale);
    assert!((motion.pga() - 0.3 * 9.81).abs() / (0.3 * 9.81) < 1e-6);

    let bedrock = Location::new(profile.sub_layers.len(), 0.0);
    let params = ConvergenceParams { strain_ratio: 0.65, error_tolerance_pct: 2.0, max_iterations: 15 };
    let result = run_equivalent_linear(&mut profile, &motion, bedrock, MotionType::Outcrop, 9.81, params).unwrap();

    assert!(result.converged, "EQL did not converge (max error {}%)", result.max_error_pct);
    assert!(
        result.iterations_used <= 8,
        "expected convergence within 8 iterations, used {}",
        result.iterations_used
    );
}
