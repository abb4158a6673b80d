//! Layer-thickness variation: a non-homogeneous Poisson process with
//! depth-dependent rate `lambda(d) = a (d+b)^c` (spec.md §4.4).

use crate::soil::layer::SoilLayer;
use ordered_float::OrderedFloat;
use rand_distr::{Distribution as RandDistribution, Exp};

#[derive(Debug, Clone, Copy)]
pub struct LayerThicknessVariation {
    pub enabled: bool,
    pub coeff: f64,
    pub initial: f64,
    pub exponent: f64,
}

impl Default for LayerThicknessVariation {
    /// Toro (1995) defaults: `a = 1.98, b = 10.86, c = -0.89`.
    fn default() -> Self {
        Self { enabled: false, coeff: 1.98, initial: 10.86, exponent: -0.89 }
    }
}

impl LayerThicknessVariation {
    /// Draws layer thicknesses summing to exactly `depth_to_bedrock` by
    /// inverting the cumulative rate function of the Poisson process: an
    /// exponential(1) increment is accumulated and mapped through
    /// `Lambda^-1` to a depth, until the running depth reaches the target;
    /// the final layer is trimmed to land exactly on it.
    pub fn vary<R: rand::Rng + ?Sized>(&self, depth_to_bedrock: f64, rng: &mut R) -> Vec<f64> {
        let mut thicknesses = Vec::new();
        let mut sum = 0.0_f64;
        let mut prev_depth = 0.0_f64;
        let exp_dist = Exp::new(1.0).unwrap();

        while prev_depth < depth_to_bedrock {
            sum += exp_dist.sample(rng);
            let depth = ((self.exponent * sum) / self.coeff + sum / self.coeff
                + self.initial.powf(self.exponent + 1.0))
            .powf(1.0 / (self.exponent + 1.0))
                - self.initial;
            thicknesses.push(depth - prev_depth);
            prev_depth = depth;
        }

        if let Some(last) = thicknesses.last_mut() {
            *last -= prev_depth - depth_to_bedrock;
        }
        thicknesses
    }
}

/// Rebuilds the soil-layer list on `new_thicknesses`, assigning each new
/// layer the `SoilLayer` template from `source` whose original span has the
/// greatest shear-wave travel-time overlap (`sum h_i / Vs_i` within
/// `[top, base]`) with the new layer's span (spec.md §4.4).
pub fn resample_layers(source: &[SoilLayer], new_thicknesses: &[f64]) -> Vec<SoilLayer> {
    let mut source_bounds = Vec::with_capacity(source.len());
    let mut top = 0.0_f64;
    for layer in source {
        let base = top + layer.thickness;
        source_bounds.push((top, base));
        top = base;
    }

    let mut result = Vec::with_capacity(new_thicknesses.len());
    let mut new_top = 0.0_f64;
    for &thickness in new_thicknesses {
        let new_base = new_top + thickness;
        // Weight by travel-time contribution so a thin, slow layer can still
        // win the match against a thick, fast one; `OrderedFloat` lets
        // `max_by_key` compare the weights directly.
        let best_idx = source_bounds
            .iter()
            .enumerate()
            .max_by_key(|(idx, pair)| {
                let (src_top, src_base) = **pair;
                let overlap_top = new_top.max(src_top);
                let overlap_base = new_base.min(src_base);
                let overlap = (overlap_base - overlap_top).max(0.0);
                OrderedFloat(overlap / source[*idx].shear_vel.max(1e-6))
            })
            .map(|(idx, _)| idx)
            .unwrap_or(0);

        let template = &source[best_idx];
        let mut layer = SoilLayer::new(thickness, template.shear_vel_distribution, template.soil_type_index)
            .expect("resampled thickness is positive by construction");
        layer.is_varied = template.is_varied;
        layer.shear_vel = template.shear_vel;
        layer.depth = new_base;
        result.push(layer);
        new_top = new_base;
    }
    result
}
