pub mod common;
pub mod compatible_rvt;
pub mod peak_factor;
pub mod response_spectrum;
pub mod rvt;
pub mod source_theory;
pub mod time_series;

pub use common::{AbstractMotion, MotionType};
pub use compatible_rvt::CompatibleRvtMotion;
pub use rvt::RvtMotion;
pub use source_theory::{BruneSourceParameters, SourceTheoryRvtMotion};
pub use time_series::TimeSeriesMotion;

use num_complex::Complex64;

/// Closed set of motion representations the controller can drive a
/// realization with (spec.md §3, Design Notes: represent closed
/// polymorphic sets as tagged variants).
#[derive(Debug, Clone)]
pub enum Motion {
    TimeSeries(TimeSeriesMotion),
    Rvt(RvtMotion),
    CompatibleRvt(CompatibleRvtMotion),
    SourceTheory(SourceTheoryRvtMotion),
}

impl Motion {
    pub fn name(&self) -> &str {
        match self {
            Motion::TimeSeries(m) => &m.name,
            Motion::Rvt(m) => &m.name,
            Motion::CompatibleRvt(m) => &m.motion.name,
            Motion::SourceTheory(m) => &m.motion.name,
        }
    }

    /// Magnitude of this motion's own acceleration Fourier amplitude
    /// spectrum, sampled on `freq()`. This is the motion's input spectrum
    /// before any site transfer function is applied, matching
    /// `Output::FourierSpectrum`'s "Absolute value of the Fourier Spectrum"
    /// in the original engine.
    pub fn fas_magnitude(&self) -> Vec<f64> {
        match self {
            Motion::TimeSeries(m) => m.fourier_acc().iter().map(|c| c.norm()).collect(),
            Motion::Rvt(m) => m.fas.clone(),
            Motion::CompatibleRvt(m) => m.motion.fas.clone(),
            Motion::SourceTheory(m) => m.motion.fas.clone(),
        }
    }
}

impl AbstractMotion for Motion {
    fn freq(&self) -> &[f64] {
        match self {
            Motion::TimeSeries(m) => m.freq(),
            Motion::Rvt(m) => m.freq(),
            Motion::CompatibleRvt(m) => m.motion.freq(),
            Motion::SourceTheory(m) => m.motion.freq(),
        }
    }

    fn motion_type(&self) -> MotionType {
        match self {
            Motion::TimeSeries(m) => m.motion_type(),
            Motion::Rvt(m) => m.motion_type(),
            Motion::CompatibleRvt(m) => m.motion.motion_type(),
            Motion::SourceTheory(m) => m.motion.motion_type(),
        }
    }

    fn pga(&self) -> f64 {
        match self {
            Motion::TimeSeries(m) => m.pga(),
            Motion::Rvt(m) => m.pga(),
            Motion::CompatibleRvt(m) => m.motion.pga(),
            Motion::SourceTheory(m) => m.motion.pga(),
        }
    }

    fn pgv(&self) -> f64 {
        match self {
            Motion::TimeSeries(m) => m.pgv(),
            Motion::Rvt(m) => m.pgv(),
            Motion::CompatibleRvt(m) => m.motion.pgv(),
            Motion::SourceTheory(m) => m.motion.pgv(),
        }
    }

    fn max(&self, tf: &[Complex64]) -> f64 {
        match self {
            Motion::TimeSeries(m) => m.max(tf),
            Motion::Rvt(m) => m.max(tf),
            Motion::CompatibleRvt(m) => m.motion.max(tf),
            Motion::SourceTheory(m) => m.motion.max(tf),
        }
    }

    fn max_vel(&self, tf: &[Complex64]) -> f64 {
        match self {
            Motion::TimeSeries(m) => m.max_vel(tf),
            Motion::Rvt(m) => m.max_vel(tf),
            Motion::CompatibleRvt(m) => m.motion.max_vel(tf),
            Motion::SourceTheory(m) => m.motion.max_vel(tf),
        }
    }

    fn calc_max_strain(&self, tf: &[Complex64]) -> f64 {
        match self {
            Motion::TimeSeries(m) => m.calc_max_strain(tf),
            Motion::Rvt(m) => m.calc_max_strain(tf),
            Motion::CompatibleRvt(m) => m.motion.calc_max_strain(tf),
            Motion::SourceTheory(m) => m.motion.calc_max_strain(tf),
        }
    }

    fn calc_sdof_tf(&self, period: f64, damping_pct: f64) -> Vec<Complex64> {
        match self {
            Motion::TimeSeries(m) => m.calc_sdof_tf(period, damping_pct),
            Motion::Rvt(m) => m.calc_sdof_tf(period, damping_pct),
            Motion::CompatibleRvt(m) => m.motion.calc_sdof_tf(period, damping_pct),
            Motion::SourceTheory(m) => m.motion.calc_sdof_tf(period, damping_pct),
        }
    }

    fn compute_sa(&self, periods: &[f64], damping_pct: f64, accel_tf: &[Complex64]) -> Vec<f64> {
        match self {
            Motion::TimeSeries(m) => m.compute_sa(periods, damping_pct, accel_tf),
            Motion::Rvt(m) => m.compute_sa(periods, damping_pct, accel_tf),
            Motion::CompatibleRvt(m) => m.motion.compute_sa(periods, damping_pct, accel_tf),
            Motion::SourceTheory(m) => m.motion.compute_sa(periods, damping_pct, accel_tf),
        }
    }
}
