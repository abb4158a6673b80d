//! FFT-based Fourier representation of a sampled acceleration record.

use crate::error::StrataError;
use crate::fft::{apply_transfer_function, forward_real_fft, integrate, zero_pad};
use crate::motion::common::{AbstractMotion, MotionType};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesMotion {
    pub name: String,
    pub dt: f64,
    pub acceleration: Vec<f64>,
    pub motion_type: MotionType,
    #[serde(skip)]
    freq: Vec<f64>,
    #[serde(skip)]
    fourier_acc: Vec<Complex64>,
    #[serde(skip)]
    fourier_vel: Vec<Complex64>,
}

impl TimeSeriesMotion {
    pub fn new(name: impl Into<String>, dt: f64, acceleration: Vec<f64>, motion_type: MotionType) -> Result<Self, StrataError> {
        if dt <= 0.0 {
            return Err(StrataError::Input("dt must be positive".to_string()));
        }
        if acceleration.is_empty() {
            return Err(StrataError::Input("acceleration series must not be empty".to_string()));
        }
        let mut motion = Self {
            name: name.into(),
            dt,
            acceleration,
            motion_type,
            freq: Vec::new(),
            fourier_acc: Vec::new(),
            fourier_vel: Vec::new(),
        };
        motion.recompute_fourier();
        Ok(motion)
    }

    fn recompute_fourier(&mut self) {
        let padded = zero_pad(&self.acceleration);
        let n = padded.len();
        self.fourier_acc = forward_real_fft(&padded);
        let df = 1.0 / (n as f64 * self.dt);
        self.freq = (0..self.fourier_acc.len()).map(|k| k as f64 * df).collect();
        self.fourier_vel = self
            .fourier_acc
            .iter()
            .zip(self.freq.iter())
            .map(|(&a, &f)| {
                if f == 0.0 {
                    Complex64::new(0.0, 0.0)
                } else {
                    a / Complex64::new(0.0, 2.0 * std::f64::consts::PI * f)
                }
            })
            .collect();
    }

    pub fn fourier_acc(&self) -> &[Complex64] {
        &self.fourier_acc
    }

    pub fn fourier_vel(&self) -> &[Complex64] {
        &self.fourier_vel
    }

    pub fn velocity(&self) -> Vec<f64> {
        integrate(&self.acceleration, self.dt)
    }

    pub fn displacement(&self) -> Vec<f64> {
        integrate(&self.velocity(), self.dt)
    }

    /// Time-domain peak of `IFFT(tf . fourierAcc)`, truncated to the
    /// original sample count.
    fn peak_of_filtered(&self, base_fourier: &[Complex64], tf: &[Complex64]) -> f64 {
        assert_eq!(base_fourier.len(), tf.len(), "tf length must match the motion's frequency grid");
        let padded = zero_pad(&self.acceleration);
        let n = padded.len();
        let filtered_half: Vec<Complex64> =
            base_fourier.iter().zip(tf.iter()).map(|(&a, &b)| a * b).collect();
        let full = crate::fft::to_full_spectrum(&filtered_half, n);
        let series = crate::fft::inverse_fft_truncated(&full, self.acceleration.len());
        series.iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()))
    }
}

impl AbstractMotion for TimeSeriesMotion {
    fn freq(&self) -> &[f64] {
        &self.freq
    }

    fn motion_type(&self) -> MotionType {
        self.motion_type
    }

    fn pga(&self) -> f64 {
        self.acceleration.iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()))
    }

    fn pgv(&self) -> f64 {
        self.velocity().iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()))
    }

    fn max(&self, tf: &[Complex64]) -> f64 {
        self.peak_of_filtered(&self.fourier_acc, tf)
    }

    fn max_vel(&self, tf: &[Complex64]) -> f64 {
        self.peak_of_filtered(&self.fourier_vel, tf)
    }

    fn calc_max_strain(&self, tf: &[Complex64]) -> f64 {
        self.peak_of_filtered(&self.fourier_vel, tf)
    }
}

/// Applies the (time-domain) transfer function to this motion's raw
/// acceleration record and returns the filtered series, used by outputs
/// that need the full time history (not just its peak).
pub fn filtered_time_series(motion: &TimeSeriesMotion, tf: &[Complex64]) -> Vec<f64> {
    apply_transfer_function(&motion.acceleration, tf)
}
