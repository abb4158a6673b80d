//! Nonlinear-property randomizer (Darendeli / custom sigma model): a
//! correlated bivariate-normal perturbation of the modulus-reduction and
//! damping curves, plus a single-variable bedrock-damping draw (spec.md
//! §4.4).

use crate::expression::{CompiledExpression, Variables};
use crate::soil::layer::RockLayer;
use crate::soil::soil_type::SoilType;
use rand_distr::{Distribution as RandDistribution, Normal};

#[derive(Debug, Clone, Copy)]
pub enum SigmaModel {
    Darendeli,
    Custom,
}

#[derive(Debug, Clone)]
pub struct NonlinearPropertyRandomizer {
    pub enabled: bool,
    pub sigma_model: SigmaModel,
    pub correlation: f64,
    pub custom_sigma_g: Option<CompiledExpression>,
    pub custom_sigma_d: Option<CompiledExpression>,
    pub min_modulus_ratio: f64,
    pub max_modulus_ratio: f64,
    pub min_damping_pct: f64,
}

impl Default for NonlinearPropertyRandomizer {
    fn default() -> Self {
        Self {
            enabled: false,
            sigma_model: SigmaModel::Darendeli,
            correlation: -0.50,
            custom_sigma_g: None,
            custom_sigma_d: None,
            min_modulus_ratio: 0.10,
            max_modulus_ratio: 1.00,
            min_damping_pct: 0.20,
        }
    }
}

impl NonlinearPropertyRandomizer {
    /// Darendeli (2001) standard deviation of G/Gmax at a given mean value
    /// of G/Gmax (spec.md §4.4).
    fn darendeli_sigma_g(g_over_gmax: f64) -> f64 {
        (-4.23_f64).exp()
            + (0.25 / (3.62_f64).exp() - (g_over_gmax - 0.5).powi(2) / (3.62_f64).exp())
                .max(0.0)
                .sqrt()
    }

    /// Darendeli (2001) standard deviation of damping (percent) at a given
    /// mean damping ratio (percent).
    fn darendeli_sigma_d(damping_pct: f64) -> f64 {
        (-5.0_f64).exp() + (-0.25_f64).exp() * damping_pct.max(0.0).sqrt()
    }

    fn sigma_g(&self, strain_pct: f64, g_over_gmax: f64, damping_pct: f64) -> f64 {
        match (&self.sigma_model, &self.custom_sigma_g) {
            (SigmaModel::Custom, Some(expr)) => {
                expr.evaluate(Variables { strain: strain_pct, shear_mod: g_over_gmax, damping: damping_pct })
            }
            _ => Self::darendeli_sigma_g(g_over_gmax),
        }
    }

    fn sigma_d(&self, strain_pct: f64, g_over_gmax: f64, damping_pct: f64) -> f64 {
        match (&self.sigma_model, &self.custom_sigma_d) {
            (SigmaModel::Custom, Some(expr)) => {
                expr.evaluate(Variables { strain: strain_pct, shear_mod: g_over_gmax, damping: damping_pct })
            }
            _ => Self::darendeli_sigma_d(damping_pct),
        }
    }

    /// Overwrites `soil_type.modulus_reduction.varied` and
    /// `soil_type.damping.varied` in place with a correlated realization of
    /// each curve. A no-op when `is_varied` is false on the soil type or
    /// the randomizer is disabled (curves are reset to `avg` instead, so a
    /// disabled randomizer always yields the deterministic curve).
    pub fn vary<R: rand::Rng + ?Sized>(&self, soil_type: &mut SoilType, rng: &mut R) {
        if !self.enabled || !soil_type.is_varied {
            soil_type.modulus_reduction.reset_varied();
            soil_type.damping.reset_varied();
            return;
        }

        let standard_normal = Normal::new(0.0, 1.0).unwrap();
        let strains = soil_type.modulus_reduction.strains.clone();
        let mut varied_g = Vec::with_capacity(strains.len());
        let mut varied_d = Vec::with_capacity(strains.len());

        for (i, &strain_pct) in strains.iter().enumerate() {
            let avg_g = soil_type.modulus_reduction.avg[i];
            let avg_d = soil_type.damping.avg[i];

            let z1: f64 = standard_normal.sample(rng);
            let z2: f64 = standard_normal.sample(rng);
            let rand_g = z1;
            let rand_d = self.correlation * z1 + (1.0 - self.correlation * self.correlation).max(0.0).sqrt() * z2;

            let sigma_g = self.sigma_g(strain_pct, avg_g, avg_d);
            let sigma_d = self.sigma_d(strain_pct, avg_g, avg_d);

            let g = (avg_g + sigma_g * rand_g).clamp(self.min_modulus_ratio, self.max_modulus_ratio);
            let d = (avg_d + sigma_d * rand_d).max(self.min_damping_pct);

            varied_g.push(g);
            varied_d.push(d);
        }

        soil_type.modulus_reduction.varied = varied_g;
        soil_type.damping.varied = varied_d;
    }

    /// Bedrock damping is varied with a single (non-bivariate) Gaussian
    /// draw, floored at zero.
    pub fn vary_bedrock<R: rand::Rng + ?Sized>(&self, rock: &mut RockLayer, rng: &mut R) {
        if !self.enabled || !rock.is_varied {
            rock.damping_pct = rock.damping_distribution.avg;
            return;
        }
        rock.damping_pct = rock.damping_distribution.sample(rng).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nonlinear_property::{NonlinearProperty, PropertyKind};
    use rand_mt::Mt64;

    fn sample_soil_type() -> SoilType {
        let modulus =
            NonlinearProperty::new(PropertyKind::ModulusReduction, vec![1e-4, 1e-2, 1e-1, 1.0], vec![1.0, 0.7, 0.3, 0.1])
                .unwrap();
        let damping =
            NonlinearProperty::new(PropertyKind::Damping, vec![1e-4, 1e-2, 1e-1, 1.0], vec![1.0, 3.0, 8.0, 15.0])
                .unwrap();
        SoilType::new("Sand", 18.0, 1.0, modulus, damping).unwrap()
    }

    #[test]
    fn disabled_randomizer_resets_to_average() {
        let rnd = NonlinearPropertyRandomizer::default();
        let mut st = sample_soil_type();
        st.modulus_reduction.varied[1] = 0.0;
        let mut rng = Mt64::new(1);
        rnd.vary(&mut st, &mut rng);
        assert_eq!(st.modulus_reduction.varied, st.modulus_reduction.avg);
        assert_eq!(st.damping.varied, st.damping.avg);
    }

    #[test]
    fn enabled_randomizer_perturbs_and_clamps_curves() {
        let rnd = NonlinearPropertyRandomizer { enabled: true, ..NonlinearPropertyRandomizer::default() };
        let mut st = sample_soil_type();
        let mut rng = Mt64::new(9);
        rnd.vary(&mut st, &mut rng);
        for &g in &st.modulus_reduction.varied {
            assert!(g >= rnd.min_modulus_ratio && g <= rnd.max_modulus_ratio);
        }
        for &d in &st.damping.varied {
            assert!(d >= rnd.min_damping_pct);
        }
        assert_ne!(st.modulus_reduction.varied, st.modulus_reduction.avg);
    }

    #[test]
    fn bedrock_damping_variation_uses_single_gaussian_draw() {
        use crate::distribution::Distribution;
        let rnd = NonlinearPropertyRandomizer { enabled: true, ..NonlinearPropertyRandomizer::default() };
        let mut rock = RockLayer::new(22.0, 760.0, 1.0);
        rock.damping_distribution = Distribution::normal(1.0, 0.3).truncated(Some(0.0), None);
        let mut rng = Mt64::new(4);
        rnd.vary_bedrock(&mut rock, &mut rng);
        assert!(rock.damping_pct >= 0.0);
    }
}
