use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strata::distribution::Distribution;
use strata::fft::{forward_real_fft, zero_pad};
use strata::kernel::equivalent_linear::{run_equivalent_linear, ConvergenceParams};
use strata::motion::common::MotionType;
use strata::motion::rvt::RvtMotion;
use strata::nonlinear_property::{NonlinearProperty, PropertyKind};
use strata::soil::layer::{RockLayer, SoilLayer};
use strata::soil::profile::SoilProfile;
use strata::soil::soil_type::SoilType;
use strata::soil::sublayer::Location;

fn ten_layer_profile() -> SoilProfile {
    let strains = vec![1e-4, 1e-3, 1e-2, 1e-1, 1.0];
    let modulus = vec![1.0, 0.95, 0.7, 0.3, 0.1];
    let damping = vec![1.0, 2.0, 6.0, 14.0, 22.0];
    let curve = |kind, vals: &[f64]| NonlinearProperty::new(kind, strains.clone(), vals.to_vec()).unwrap();
    let st = SoilType::new(
        "Sand",
        18.0,
        1.0,
        curve(PropertyKind::ModulusReduction, &modulus),
        curve(PropertyKind::Damping, &damping),
    )
    .unwrap();

    let layers: Vec<SoilLayer> = (0..10)
        .map(|i| SoilLayer::new(3.0, Distribution::normal(200.0 + i as f64 * 20.0, 0.0), 0).unwrap())
        .collect();
    let rock = RockLayer::new(22.0, 760.0, 1.0);
    let mut profile = SoilProfile::new(vec![st], layers, rock, 100.0).unwrap();
    profile.discretize(9.81, 20.0, 0.20, false);
    profile
}

fn bench_equivalent_linear(c: &mut Criterion) {
    let freq: Vec<f64> = (1..=200).map(|i| i as f64 * 0.1).collect();
    let fas = vec![0.05; freq.len()];
    let motion = RvtMotion::new("bench", freq, fas, 10.0, MotionType::Outcrop).unwrap();
    let params = ConvergenceParams::default();

    c.bench_function("equivalent_linear_10_layer", |b| {
        b.iter(|| {
            let mut profile = ten_layer_profile();
            let bedrock = Location::new(profile.sub_layers.len(), 0.0);
            let result = run_equivalent_linear(&mut profile, &motion, bedrock, MotionType::Outcrop, 9.81, params).unwrap();
            black_box(result.iterations_used)
        })
    });
}

fn bench_forward_fft(c: &mut Criterion) {
    let signal: Vec<f64> = (0..4096).map(|i| (i as f64 * 0.01).sin()).collect();
    let padded = zero_pad(&signal);

    c.bench_function("forward_real_fft_4096", |b| {
        b.iter(|| black_box(forward_real_fft(&padded)))
    });
}

criterion_group!(benches, bench_equivalent_linear, bench_forward_fft);
criterion_main!(benches);
