//! Inter-layer correlation model catalogue for [`super::velocity`]'s Toro
//! (1995) shear-wave-velocity variation.

use serde::{Deserialize, Serialize};

/// Depth- and thickness-dependent correlation parameters combined as
/// `rho = (1 - dCorrel) * tCorrel + dCorrel` (Toro 1995).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CorrelationParams {
    pub initial: f64,
    pub final_: f64,
    pub delta: f64,
    pub intercept: f64,
    pub exponent: f64,
}

impl CorrelationParams {
    /// Correlation between this layer's log-velocity random variable and the
    /// one above it, given `thickness` and `depth_to_mid` (site units
    /// matching `delta`/`intercept`, conventionally meters).
    pub fn correlation_at(&self, thickness: f64, depth_to_mid: f64) -> f64 {
        let d_correl = if depth_to_mid <= 200.0 {
            self.final_ * ((depth_to_mid + self.intercept) / (200.0 + self.intercept)).powf(self.exponent)
        } else {
            self.final_
        };
        let t_correl = self.initial * (-thickness / self.delta).exp();
        (1.0 - d_correl) * t_correl + d_correl
    }
}

/// Preset correlation/stdev models from the Toro (1995) catalogue, plus a
/// fully user-specified `Custom` variant (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationModel {
    Custom,
    GeoMatrixAB,
    GeoMatrixCD,
    UsgsAB,
    UsgsCD,
    UsgsA,
    UsgsB,
    UsgsC,
    UsgsD,
}

impl CorrelationModel {
    /// Preset correlation parameters; `None` for `Custom`, which carries its
    /// own [`CorrelationParams`] at the call site.
    pub fn preset_params(self) -> Option<CorrelationParams> {
        let p = |initial: f64, final_: f64, delta: f64, exponent: f64| {
            Some(CorrelationParams { initial, final_, delta, intercept: 0.0, exponent })
        };
        match self {
            CorrelationModel::Custom => None,
            CorrelationModel::GeoMatrixAB => p(0.96, 0.96, 13.1, 0.095),
            CorrelationModel::GeoMatrixCD => p(0.99, 1.00, 8.0, 0.160),
            CorrelationModel::UsgsAB => p(0.95, 1.00, 4.2, 0.138),
            CorrelationModel::UsgsCD => p(0.99, 1.00, 3.9, 0.293),
            CorrelationModel::UsgsA => p(0.95, 0.42, 3.4, 0.063),
            CorrelationModel::UsgsB => p(0.97, 1.00, 3.8, 0.293),
            CorrelationModel::UsgsC => p(0.99, 0.98, 3.9, 0.344),
            CorrelationModel::UsgsD => p(0.00, 0.50, 5.0, 0.744),
        }
    }

    /// Preset log-velocity standard deviation, natural-log units.
    pub fn preset_stdev(self) -> Option<f64> {
        match self {
            CorrelationModel::Custom => None,
            CorrelationModel::GeoMatrixAB => Some(0.46),
            CorrelationModel::GeoMatrixCD => Some(0.38),
            CorrelationModel::UsgsAB => Some(0.35),
            CorrelationModel::UsgsCD => Some(0.36),
            CorrelationModel::UsgsA => Some(0.36),
            CorrelationModel::UsgsB => Some(0.27),
            CorrelationModel::UsgsC => Some(0.31),
            CorrelationModel::UsgsD => Some(0.37),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_depth_uses_power_law_blend() {
        let params = CorrelationModel::UsgsC.preset_params().unwrap();
        let rho = params.correlation_at(2.0, 10.0);
        assert!(rho > 0.0 && rho < 1.0);
    }

    #[test]
    fn beyond_200m_uses_final_value_only() {
        let params = CorrelationModel::UsgsC.preset_params().unwrap();
        let rho = params.correlation_at(2.0, 500.0);
        let d_correl = params.final_;
        let t_correl = params.initial * (-2.0_f64 / params.delta).exp();
        let expected = (1.0 - d_correl) * t_correl + d_correl;
        assert!((rho - expected).abs() < 1e-12);
    }
}
