//! Site-response controller (spec.md §4.6): drives N realizations of a
//! randomized profile through the EQL or linear-elastic kernel for every
//! input motion, filling an [`OutputCatalog`].

use crate::error::StrataError;
use crate::kernel::equivalent_linear::{run_equivalent_linear, ConvergenceParams, IterationResult};
use crate::kernel::linear_elastic::run_linear_elastic;
use crate::motion::{AbstractMotion, Motion, MotionType};
use crate::output::catalog::{canonical_depth_axis, interp_profile_onto_axis, OutputCatalog};
use crate::output::kinds::OutputKind;
use crate::randomizer::ProfileRandomizer;
use crate::rng::StrataRng;
use crate::soil::profile::SoilProfile;
use crate::soil::sublayer::Location;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    Imperial,
    Metric,
}

impl Units {
    pub fn gravity(self) -> f64 {
        match self {
            Units::Metric => 9.81,
            Units::Imperial => 32.174,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Method {
    LinearElastic,
    EquivalentLinear(ConvergenceParams),
}

/// Where the input motion is applied, resolved against a specific
/// realization's discretized profile (sub-layer count varies across
/// realizations under layer-thickness variation, so this can't be a bare
/// `Location` at configuration time).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum InputLocationSpec {
    BedrockOutcrop,
    Depth { depth: f64, motion_type: MotionType },
}

impl InputLocationSpec {
    fn resolve(self, profile: &SoilProfile) -> (Location, MotionType) {
        match self {
            InputLocationSpec::BedrockOutcrop => {
                (Location::new(profile.sub_layers.len(), 0.0), MotionType::Outcrop)
            }
            InputLocationSpec::Depth { depth, motion_type } => {
                let mut cum = 0.0;
                for (idx, sub) in profile.sub_layers.iter().enumerate() {
                    if depth <= cum + sub.thickness || idx == profile.sub_layers.len() - 1 {
                        return (Location::new(idx, (depth - cum).max(0.0)), motion_type);
                    }
                    cum += sub.thickness;
                }
                (Location::new(0, 0.0), motion_type)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Config {
    pub units: Units,
    pub method: Method,
    pub realization_count: usize,
    pub seed: u64,
    pub max_freq_hz: f64,
    pub wave_fraction: f64,
    pub disable_auto_discretization: bool,
    pub input_location: InputLocationSpec,
    pub response_spectrum_damping_pct: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            units: Units::Metric,
            method: Method::EquivalentLinear(ConvergenceParams::default()),
            realization_count: 1,
            seed: 1,
            max_freq_hz: 20.0,
            wave_fraction: 0.20,
            disable_auto_discretization: false,
            input_location: InputLocationSpec::BedrockOutcrop,
            response_spectrum_damping_pct: 5.0,
        }
    }
}

/// Outcome of driving one realization's profile through every input motion:
/// a partial catalog, the `enabled` flag for each motion in list order, and
/// any diagnostics raised.
struct RealizationOutcome {
    catalog: OutputCatalog,
    enabled: Vec<bool>,
    diagnostics: Vec<String>,
}

/// Builds realization `index`'s randomized, discretized profile and drives
/// every motion through the configured kernel, recording the requested
/// outputs. Shared by the serial and parallel controllers so both produce
/// bit-identical results for the same seed.
fn process_realization(
    config: &Config,
    profile_template: &SoilProfile,
    motions: &[Motion],
    randomizer: &ProfileRandomizer,
    enabled_outputs: &[OutputKind],
    depth_axis: &[f64],
    index: usize,
) -> Result<RealizationOutcome, StrataError> {
    tracing::info!(realization = index, "realization start");
    let gravity = config.units.gravity();
    let mut rng = StrataRng::sub_stream(config.seed, index);
    let mut profile = randomizer.randomize(profile_template, &mut rng)?;
    profile.discretize(gravity, config.max_freq_hz, config.wave_fraction, config.disable_auto_discretization);
    let (input_location, input_motion_type) = config.input_location.resolve(&profile);

    let mut catalog = OutputCatalog::new();
    let mut enabled = vec![true; motions.len()];
    let mut diagnostics = Vec::new();

    if enabled_outputs.contains(&OutputKind::InitialVelProfile) {
        let depths: Vec<f64> = profile.sub_layers.iter().map(|s| s.depth).collect();
        let vel: Vec<f64> = profile.sub_layers.iter().map(|s| s.shear_vel).collect();
        let values = interp_profile_onto_axis(&depths, &vel, depth_axis, true);
        catalog.record(OutputKind::InitialVelProfile, index, None, depth_axis, values, true);
    }
    // Strain-indexed curves are a property of the soil type, not the
    // realization's motion; report the profile's first soil type, matching
    // the single-material case every caller in this codebase constructs.
    // Multi-soil-type profiles only surface that first curve here, since
    // the catalog keys a series by (kind, motion_index) and has no axis for
    // soil-type index.
    if let Some(soil_type) = profile.soil_types.first() {
        if enabled_outputs.contains(&OutputKind::ModulusCurve) {
            let curve = &soil_type.modulus_reduction;
            catalog.record(OutputKind::ModulusCurve, index, None, &curve.strains, curve.varied.clone(), true);
        }
        if enabled_outputs.contains(&OutputKind::DampingCurve) {
            let curve = &soil_type.damping;
            catalog.record(OutputKind::DampingCurve, index, None, &curve.strains, curve.varied.clone(), true);
        }
    }

    for (j, motion) in motions.iter().enumerate() {
        let result = match config.method {
            Method::LinearElastic => run_linear_elastic(&mut profile, motion, input_location, input_motion_type, gravity),
            Method::EquivalentLinear(params) => {
                run_equivalent_linear(&mut profile, motion, input_location, input_motion_type, gravity, params)
            }
        };

        match result {
            Ok(iteration) => record_outputs(
                &mut catalog,
                enabled_outputs,
                index,
                j,
                &profile,
                motion,
                &iteration,
                depth_axis,
                gravity,
                config,
                input_location,
                input_motion_type,
            ),
            Err(err) => {
                tracing::warn!(realization = index, motion = motion.name(), %err, "motion excluded from statistics");
                enabled[j] = false;
                diagnostics.push(format!("realization {index}, motion '{}': {err}", motion.name()));
            }
        }
    }

    tracing::info!(realization = index, "realization end");
    Ok(RealizationOutcome { catalog, enabled, diagnostics })
}

#[allow(clippy::too_many_arguments)]
fn record_outputs(
    catalog: &mut OutputCatalog,
    enabled_outputs: &[OutputKind],
    realization_index: usize,
    motion_index: usize,
    profile: &SoilProfile,
    motion: &Motion,
    iteration: &IterationResult,
    depth_axis: &[f64],
    gravity: f64,
    config: &Config,
    input_location: Location,
    input_motion_type: MotionType,
) {
    let depths: Vec<f64> = profile.sub_layers.iter().map(|s| s.depth).collect();
    let enabled = true;

    if enabled_outputs.contains(&OutputKind::ModulusProfile) {
        let gmax: Vec<f64> = profile.sub_layers.iter().map(|s| s.complex_shear_modulus().re).collect();
        let values = interp_profile_onto_axis(&depths, &gmax, depth_axis, true);
        catalog.record(OutputKind::ModulusProfile, realization_index, None, depth_axis, values, enabled);
    }
    if enabled_outputs.contains(&OutputKind::DampingProfile) {
        let damping: Vec<f64> = profile.sub_layers.iter().map(|s| s.damping_pct).collect();
        let values = interp_profile_onto_axis(&depths, &damping, depth_axis, true);
        catalog.record(OutputKind::DampingProfile, realization_index, None, depth_axis, values, enabled);
    }
    if enabled_outputs.contains(&OutputKind::VerticalStress) {
        let stress: Vec<f64> = profile.sub_layers.iter().map(|s| s.vertical_stress).collect();
        let values = interp_profile_onto_axis(&depths, &stress, depth_axis, false);
        catalog.record(OutputKind::VerticalStress, realization_index, None, depth_axis, values, enabled);
    }
    if enabled_outputs.contains(&OutputKind::MaxErrorProfile) {
        let err: Vec<f64> = profile.sub_layers.iter().map(|s| s.error_pct).collect();
        let values = interp_profile_onto_axis(&depths, &err, depth_axis, false);
        catalog.record(OutputKind::MaxErrorProfile, realization_index, Some(motion_index), depth_axis, values, enabled);
    }
    if enabled_outputs.contains(&OutputKind::MaxStrainProfile) {
        let strain: Vec<f64> = profile.sub_layers.iter().map(|s| s.max_strain_pct).collect();
        let values = interp_profile_onto_axis(&depths, &strain, depth_axis, false);
        catalog.record(OutputKind::MaxStrainProfile, realization_index, Some(motion_index), depth_axis, values, enabled);
    }
    if enabled_outputs.contains(&OutputKind::MaxStressProfile) {
        let stress: Vec<f64> = profile
            .sub_layers
            .iter()
            .map(|s| s.max_strain_pct / 100.0 * s.complex_shear_modulus().norm())
            .collect();
        let values = interp_profile_onto_axis(&depths, &stress, depth_axis, false);
        catalog.record(OutputKind::MaxStressProfile, realization_index, Some(motion_index), depth_axis, values, enabled);
    }
    if enabled_outputs.contains(&OutputKind::FinalVelProfile) {
        let vel: Vec<f64> = profile.sub_layers.iter().map(|s| s.shear_vel).collect();
        let values = interp_profile_onto_axis(&depths, &vel, depth_axis, true);
        catalog.record(OutputKind::FinalVelProfile, realization_index, None, depth_axis, values, enabled);
    }
    if enabled_outputs.contains(&OutputKind::StressReducCoeff) {
        let pga = motion.pga();
        let rd: Vec<f64> = profile
            .sub_layers
            .iter()
            .map(|s| {
                let tau_max = s.max_strain_pct / 100.0 * s.complex_shear_modulus().norm();
                let rigid_tau = pga * s.vertical_stress / gravity;
                if rigid_tau.abs() > 1e-300 { tau_max / rigid_tau } else { 0.0 }
            })
            .collect();
        let values = interp_profile_onto_axis(&depths, &rd, depth_axis, false);
        catalog.record(OutputKind::StressReducCoeff, realization_index, Some(motion_index), depth_axis, values, enabled);
    }
    if enabled_outputs.contains(&OutputKind::StressRatio) {
        let ratio: Vec<f64> = profile
            .sub_layers
            .iter()
            .map(|s| {
                let tau_max = s.max_strain_pct / 100.0 * s.complex_shear_modulus().norm();
                if s.vertical_stress.abs() > 1e-300 { tau_max / s.vertical_stress } else { 0.0 }
            })
            .collect();
        let values = interp_profile_onto_axis(&depths, &ratio, depth_axis, false);
        catalog.record(OutputKind::StressRatio, realization_index, Some(motion_index), depth_axis, values, enabled);
    }

    let surface = Location::new(0, 0.0);

    if enabled_outputs.contains(&OutputKind::AccelTransferFunction) {
        let tf = iteration.wave_field.accel_tf(input_location, input_motion_type, surface, MotionType::Within);
        let values: Vec<f64> = tf.iter().map(|c| c.norm()).collect();
        catalog.record(OutputKind::AccelTransferFunction, realization_index, Some(motion_index), motion.freq(), values, enabled);
    }
    if enabled_outputs.contains(&OutputKind::MaxAccelProfile) {
        let mut accel_max = Vec::with_capacity(profile.sub_layers.len());
        for idx in 0..profile.sub_layers.len() {
            let loc = Location::new(idx, 0.0);
            let tf = iteration.wave_field.accel_tf(input_location, input_motion_type, loc, MotionType::Within);
            accel_max.push(motion.max(&tf));
        }
        let values = interp_profile_onto_axis(&depths, &accel_max, depth_axis, false);
        catalog.record(OutputKind::MaxAccelProfile, realization_index, Some(motion_index), depth_axis, values, enabled);
    }
    if enabled_outputs.contains(&OutputKind::MaxVelProfile) {
        let mut vel_max = Vec::with_capacity(profile.sub_layers.len());
        for idx in 0..profile.sub_layers.len() {
            let loc = Location::new(idx, 0.0);
            let tf = iteration.wave_field.accel_tf(input_location, input_motion_type, loc, MotionType::Within);
            vel_max.push(motion.max_vel(&tf));
        }
        let values = interp_profile_onto_axis(&depths, &vel_max, depth_axis, false);
        catalog.record(OutputKind::MaxVelProfile, realization_index, Some(motion_index), depth_axis, values, enabled);
    }
    if enabled_outputs.contains(&OutputKind::ResponseSpectrum) {
        let tf = iteration.wave_field.accel_tf(input_location, input_motion_type, surface, MotionType::Within);
        let periods: Vec<f64> = (1..=50).map(|k| 0.01 * k as f64).collect();
        let sa = motion.compute_sa(&periods, config.response_spectrum_damping_pct, &tf);
        catalog.record(OutputKind::ResponseSpectrum, realization_index, Some(motion_index), &periods, sa, enabled);
    }
    if enabled_outputs.contains(&OutputKind::StrainTransferFunction) && !profile.sub_layers.is_empty() {
        let l = profile.sub_layers.len() / 2;
        let tf = iteration.wave_field.strain_tf(input_location, input_motion_type, l, gravity);
        let values: Vec<f64> = tf.iter().map(|c| c.norm()).collect();
        catalog.record(OutputKind::StrainTransferFunction, realization_index, Some(motion_index), motion.freq(), values, enabled);
    }
    if enabled_outputs.contains(&OutputKind::SpectralRatio) && !profile.sub_layers.is_empty() {
        let l = profile.sub_layers.len() / 2;
        let accel_tf = iteration.wave_field.accel_tf(input_location, input_motion_type, surface, MotionType::Within);
        let strain_tf = iteration.wave_field.strain_tf(input_location, input_motion_type, l, gravity);
        let values: Vec<f64> = strain_tf
            .iter()
            .zip(accel_tf.iter())
            .map(|(s, a)| {
                let an = a.norm();
                if an > 1e-300 { s.norm() / an } else { 0.0 }
            })
            .collect();
        catalog.record(OutputKind::SpectralRatio, realization_index, Some(motion_index), motion.freq(), values, enabled);
    }
    if enabled_outputs.contains(&OutputKind::FourierSpectrum) {
        let values = motion.fas_magnitude();
        catalog.record(OutputKind::FourierSpectrum, realization_index, Some(motion_index), motion.freq(), values, enabled);
    }
    if enabled_outputs.contains(&OutputKind::AriasIntensity) {
        if let Motion::TimeSeries(ts) = motion {
            let arias =
                std::f64::consts::PI / (2.0 * gravity) * ts.acceleration.iter().map(|a| a * a).sum::<f64>() * ts.dt;
            catalog.record(OutputKind::AriasIntensity, realization_index, Some(motion_index), &[0.0], vec![arias], enabled);
        }
    }

    // The five time-history outputs only make sense against a sampled
    // record: the original engine's xData() sources them from the parent
    // motion's own time axis, which RVT-family motions don't have.
    if let Motion::TimeSeries(ts) = motion {
        let times: Vec<f64> = (0..ts.acceleration.len()).map(|i| i as f64 * ts.dt).collect();
        let accel_tf = iteration.wave_field.accel_tf(input_location, input_motion_type, surface, MotionType::Within);
        let filtered_accel = crate::motion::time_series::filtered_time_series(ts, &accel_tf);

        if enabled_outputs.contains(&OutputKind::AccelTimeSeries) {
            catalog.record(OutputKind::AccelTimeSeries, realization_index, Some(motion_index), &times, filtered_accel.clone(), enabled);
        }
        if enabled_outputs.contains(&OutputKind::VelTimeSeries) || enabled_outputs.contains(&OutputKind::DispTimeSeries) {
            let filtered_vel = crate::fft::integrate(&filtered_accel, ts.dt);
            if enabled_outputs.contains(&OutputKind::VelTimeSeries) {
                catalog.record(OutputKind::VelTimeSeries, realization_index, Some(motion_index), &times, filtered_vel.clone(), enabled);
            }
            if enabled_outputs.contains(&OutputKind::DispTimeSeries) {
                let filtered_disp = crate::fft::integrate(&filtered_vel, ts.dt);
                catalog.record(OutputKind::DispTimeSeries, realization_index, Some(motion_index), &times, filtered_disp, enabled);
            }
        }
        if (enabled_outputs.contains(&OutputKind::StrainTimeSeries) || enabled_outputs.contains(&OutputKind::StressTimeSeries))
            && !profile.sub_layers.is_empty()
        {
            let l = profile.sub_layers.len() / 2;
            let velocity = ts.velocity();
            if enabled_outputs.contains(&OutputKind::StrainTimeSeries) {
                let strain_tf = iteration.wave_field.strain_tf(input_location, input_motion_type, l, gravity);
                let values = crate::fft::apply_transfer_function(&velocity, &strain_tf);
                catalog.record(OutputKind::StrainTimeSeries, realization_index, Some(motion_index), &times, values, enabled);
            }
            if enabled_outputs.contains(&OutputKind::StressTimeSeries) {
                let stress_tf = iteration.wave_field.stress_tf(input_location, input_motion_type, l, gravity);
                let values = crate::fft::apply_transfer_function(&velocity, &stress_tf);
                catalog.record(OutputKind::StressTimeSeries, realization_index, Some(motion_index), &times, values, enabled);
            }
        }
    }
}

pub struct SiteResponseController {
    config: Config,
    profile_template: SoilProfile,
    motions: Vec<Motion>,
    randomizer: ProfileRandomizer,
    enabled_outputs: Vec<OutputKind>,
    catalog: OutputCatalog,
    enabled_grid: Vec<bool>,
    diagnostics: Vec<String>,
    cancel: Arc<AtomicBool>,
}

impl SiteResponseController {
    pub fn new(
        config: Config,
        profile_template: SoilProfile,
        motions: Vec<Motion>,
        randomizer: ProfileRandomizer,
        enabled_outputs: Vec<OutputKind>,
    ) -> Self {
        Self {
            config,
            profile_template,
            motions,
            randomizer,
            enabled_outputs,
            catalog: OutputCatalog::new(),
            enabled_grid: Vec::new(),
            diagnostics: Vec::new(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A clonable handle the caller can set from another thread (or the UI
    /// event loop) to request cooperative cancellation.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    pub fn enabled_grid(&self) -> &[bool] {
        &self.enabled_grid
    }

    fn realization_count(&self) -> usize {
        if self.randomizer.is_varied() {
            self.config.realization_count.max(1)
        } else {
            1
        }
    }

    pub fn run(&mut self) -> Result<&OutputCatalog, StrataError> {
        let n = self.realization_count();
        let m = self.motions.len();
        self.enabled_grid = vec![true; n * m];
        let depth_axis = canonical_depth_axis(self.profile_template.total_depth());

        for i in 0..n {
            if self.cancel.load(Ordering::Relaxed) {
                break;
            }
            let outcome = process_realization(
                &self.config,
                &self.profile_template,
                &self.motions,
                &self.randomizer,
                &self.enabled_outputs,
                &depth_axis,
                i,
            )?;
            merge_series(&mut self.catalog, &outcome.catalog);
            for (j, &ok) in outcome.enabled.iter().enumerate() {
                self.enabled_grid[i * m + j] = ok;
            }
            self.diagnostics.extend(outcome.diagnostics);
        }

        self.catalog.finalize();
        Ok(&self.catalog)
    }
}

/// Runs every realization independently on a scope of worker threads, each
/// with its own `StrataRng` sub-stream (spec.md §5), merging the resulting
/// catalogs. Bit-identical to [`SiteResponseController::run`] for the same
/// seed because sub-stream derivation depends only on the realization
/// index, never on scheduling order.
pub fn run_parallel(
    config: Config,
    profile_template: SoilProfile,
    motions: Vec<Motion>,
    randomizer: ProfileRandomizer,
    enabled_outputs: Vec<OutputKind>,
    worker_count: usize,
) -> Result<OutputCatalog, StrataError> {
    let is_varied = randomizer.is_varied();
    let n = if is_varied { config.realization_count.max(1) } else { 1 };
    let worker_count = worker_count.max(1).min(n.max(1));
    let depth_axis = canonical_depth_axis(profile_template.total_depth());

    let slots: Vec<std::sync::Mutex<(OutputCatalog, Vec<String>)>> =
        (0..worker_count).map(|_| std::sync::Mutex::new((OutputCatalog::new(), Vec::new()))).collect();

    std::thread::scope(|scope| {
        for (w, slot) in slots.iter().enumerate() {
            let config = &config;
            let profile_template = &profile_template;
            let motions = &motions;
            let randomizer = &randomizer;
            let enabled_outputs = &enabled_outputs;
            let depth_axis = &depth_axis;
            scope.spawn(move || {
                let mut local_catalog = OutputCatalog::new();
                let mut local_diagnostics = Vec::new();
                let mut i = w;
                while i < n {
                    match process_realization(config, profile_template, motions, randomizer, enabled_outputs, depth_axis, i) {
                        Ok(outcome) => {
                            merge_series(&mut local_catalog, &outcome.catalog);
                            local_diagnostics.extend(outcome.diagnostics);
                        }
                        Err(err) => local_diagnostics.push(format!("realization {i}: {err}")),
                    }
                    i += worker_count;
                }
                let mut guard = slot.lock().unwrap();
                *guard = (local_catalog, local_diagnostics);
            });
        }
    });

    let mut merged = OutputCatalog::new();
    for slot in &slots {
        let (local_catalog, _diagnostics) = &*slot.lock().unwrap();
        merge_series(&mut merged, local_catalog);
    }
    merged.finalize();
    Ok(merged)
}

fn merge_series(into: &mut OutputCatalog, from: &OutputCatalog) {
    for series in from.all_series() {
        for row in &series.rows {
            into.record(series.kind, row.realization_index, row.motion_index, &series.reference_axis, row.values.clone(), row.enabled);
        }
    }
}
