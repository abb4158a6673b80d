//! Shear-wave-velocity variation (Toro 1995): a correlated log-normal walk
//! down the soil column (spec.md §4.4).

use crate::randomizer::correlation::{CorrelationModel, CorrelationParams};
use crate::soil::layer::{RockLayer, SoilLayer};
use rand_distr::{Distribution as RandDistribution, Normal};

#[derive(Debug, Clone, Copy)]
pub struct VelocityVariation {
    pub enabled: bool,
    pub stdev_model: CorrelationModel,
    pub custom_stdev: f64,
    pub stdev_is_layer_specific: bool,
    pub correl_model: CorrelationModel,
    pub custom_correl: CorrelationParams,
}

impl Default for VelocityVariation {
    fn default() -> Self {
        Self {
            enabled: false,
            stdev_model: CorrelationModel::UsgsC,
            custom_stdev: 0.31,
            stdev_is_layer_specific: false,
            correl_model: CorrelationModel::UsgsC,
            custom_correl: CorrelationModel::UsgsC.preset_params().unwrap(),
        }
    }
}

impl VelocityVariation {
    fn stdev_for(&self, layer: &SoilLayer) -> f64 {
        if self.stdev_is_layer_specific {
            layer.shear_vel_distribution.stdev
        } else {
            self.stdev_model.preset_stdev().unwrap_or(self.custom_stdev)
        }
    }

    fn correl_params(&self) -> CorrelationParams {
        self.correl_model.preset_params().unwrap_or(self.custom_correl)
    }

    /// Draws a new shear-wave velocity for every soil layer and the
    /// half-space, writing `shear_vel` in place; layers with
    /// `is_varied == false` are reset to their average velocity instead.
    /// The half-space velocity is not varied (no velocity distribution is
    /// attached to it in this engine); it is left untouched.
    pub fn vary<R: rand::Rng + ?Sized>(&self, layers: &mut [SoilLayer], _bedrock: &RockLayer, rng: &mut R) {
        if !self.enabled {
            return;
        }
        let params = self.correl_params();
        let mut prev_rand_var = 0.0_f64;

        for (i, layer) in layers.iter_mut().enumerate() {
            let stdev = self.stdev_for(layer);
            let z: f64 = Normal::new(0.0, 1.0).unwrap().sample(rng);

            let rand_var = if i == 0 {
                stdev * z
            } else {
                let depth_to_mid = layer.depth - layer.thickness / 2.0;
                let rho = params.correlation_at(layer.thickness, depth_to_mid);
                rho * prev_rand_var + stdev * z * (1.0 - rho * rho).max(0.0).sqrt()
            };

            if layer.is_varied {
                layer.shear_vel = layer.shear_vel_distribution.avg * rand_var.exp();
            } else {
                layer.shear_vel = layer.shear_vel_distribution.avg;
            }
            prev_rand_var = rand_var;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Distribution;
    use rand_mt::Mt64;

    fn layer(thickness: f64, depth: f64, avg_vs: f64) -> SoilLayer {
        let mut l = SoilLayer::new(thickness, Distribution::normal(avg_vs, 0.0), 0).unwrap();
        l.depth = depth;
        l
    }

    #[test]
    fn disabled_variation_leaves_velocity_at_average() {
        let vv = VelocityVariation { enabled: false, ..VelocityVariation::default() };
        let mut layers = vec![layer(5.0, 5.0, 200.0), layer(5.0, 10.0, 300.0)];
        let rock = RockLayer::new(20.0, 760.0, 1.0);
        let mut rng = Mt64::new(1);
        vv.vary(&mut layers, &rock, &mut rng);
        assert_eq!(layers[0].shear_vel, 200.0);
        assert_eq!(layers[1].shear_vel, 300.0);
    }

    #[test]
    fn enabled_variation_perturbs_velocity_around_average() {
        let vv = VelocityVariation { enabled: true, ..VelocityVariation::default() };
        let mut layers = vec![layer(5.0, 5.0, 200.0), layer(5.0, 10.0, 300.0), layer(5.0, 15.0, 300.0)];
        let rock = RockLayer::new(20.0, 760.0, 1.0);
        let mut rng = Mt64::new(7);
        vv.vary(&mut layers, &rock, &mut rng);
        for l in &layers {
            assert!(l.shear_vel > 0.0);
        }
        assert!(layers.iter().any(|l| (l.shear_vel - l.shear_vel_distribution.avg).abs() > 1e-6));
    }

    #[test]
    fn not_varied_layer_is_reset_to_average() {
        let vv = VelocityVariation { enabled: true, ..VelocityVariation::default() };
        let mut l = layer(5.0, 5.0, 200.0);
        l.is_varied = false;
        let mut layers = vec![l];
        let rock = RockLayer::new(20.0, 760.0, 1.0);
        let mut rng = Mt64::new(3);
        vv.vary(&mut layers, &rock, &mut rng);
        assert_eq!(layers[0].shear_vel, 200.0);
    }
}
