//! Site randomizer (spec.md §4.4): composes four independently
//! enable/disable-able sub-models into a single operation that turns a
//! deterministic [`SoilProfile`] into one realization of a Monte Carlo
//! ensemble. All disabled leaves the profile unchanged.

pub mod bedrock;
pub mod correlation;
pub mod nonlinear;
pub mod thickness;
pub mod velocity;

use crate::error::StrataError;
use crate::soil::profile::SoilProfile;
use bedrock::BedrockDepthVariation;
use nonlinear::NonlinearPropertyRandomizer;
use thickness::{resample_layers, LayerThicknessVariation};
use velocity::VelocityVariation;

#[derive(Debug, Clone)]
pub struct ProfileRandomizer {
    pub velocity: VelocityVariation,
    pub thickness: LayerThicknessVariation,
    pub bedrock_depth: BedrockDepthVariation,
    pub nonlinear_property: NonlinearPropertyRandomizer,
}

impl ProfileRandomizer {
    /// Any sub-model enabled, i.e. the profile is not used deterministically.
    pub fn is_varied(&self) -> bool {
        self.velocity.enabled
            || self.thickness.enabled
            || self.bedrock_depth.enabled
            || self.nonlinear_property.enabled
    }

    /// Produces one realization of `profile`. When no sub-model is enabled
    /// this clones `profile` unchanged (still a fresh `SoilProfile` so the
    /// caller can run it through the kernel independently of the template).
    pub fn randomize<R: rand::Rng + ?Sized>(
        &self,
        profile: &SoilProfile,
        rng: &mut R,
    ) -> Result<SoilProfile, StrataError> {
        if !self.is_varied() {
            return Ok(profile.clone());
        }

        let avg_depth = profile.total_depth();
        let target_depth = self.bedrock_depth.vary(avg_depth, rng);

        let mut layers = if self.thickness.enabled {
            let new_thicknesses = self.thickness.vary(target_depth, rng);
            resample_layers(&profile.layers, &new_thicknesses)
        } else {
            let mut layers = profile.layers.clone();
            // Bedrock depth moved but layer thicknesses were not
            // independently redrawn: absorb the difference in the last
            // layer so the column still reaches the new bedrock depth.
            if let Some(last) = layers.last_mut() {
                let delta = target_depth - avg_depth;
                last.thickness = (last.thickness + delta).max(1e-3);
            }
            layers
        };

        let mut rock = profile.rock_layer.clone();
        self.velocity.vary(&mut layers, &rock, rng);
        self.nonlinear_property.vary_bedrock(&mut rock, rng);

        let mut soil_types = profile.soil_types.clone();
        for soil_type in &mut soil_types {
            self.nonlinear_property.vary(soil_type, rng);
        }

        SoilProfile::new(soil_types, layers, rock, profile.water_table_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Distribution;
    use crate::nonlinear_property::{NonlinearProperty, PropertyKind};
    use crate::soil::layer::{RockLayer, SoilLayer};
    use crate::soil::soil_type::SoilType;
    use rand_mt::Mt64;

    fn sample_profile() -> SoilProfile {
        let st = SoilType::new(
            "Sand",
            18.0,
            1.0,
            NonlinearProperty::new(PropertyKind::ModulusReduction, vec![1e-4, 1.0], vec![1.0, 0.2]).unwrap(),
            NonlinearProperty::new(PropertyKind::Damping, vec![1e-4, 1.0], vec![1.0, 15.0]).unwrap(),
        )
        .unwrap();
        let layers = vec![
            SoilLayer::new(10.0, Distribution::normal(200.0, 0.3), 0).unwrap(),
            SoilLayer::new(15.0, Distribution::normal(350.0, 0.3), 0).unwrap(),
        ];
        let rock = RockLayer::new(22.0, 760.0, 1.0);
        SoilProfile::new(vec![st], layers, rock, 100.0).unwrap()
    }

    #[test]
    fn all_disabled_clones_profile_unchanged() {
        let randomizer = ProfileRandomizer {
            velocity: VelocityVariation::default(),
            thickness: LayerThicknessVariation::default(),
            bedrock_depth: BedrockDepthVariation::new(Distribution::normal(25.0, 2.0)),
            nonlinear_property: NonlinearPropertyRandomizer::default(),
        };
        assert!(!randomizer.is_varied());
        let profile = sample_profile();
        let mut rng = Mt64::new(1);
        let realization = randomizer.randomize(&profile, &mut rng).unwrap();
        assert_eq!(realization.total_depth(), profile.total_depth());
        for (a, b) in realization.layers.iter().zip(profile.layers.iter()) {
            assert_eq!(a.shear_vel, b.shear_vel);
            assert_eq!(a.thickness, b.thickness);
        }
    }

    #[test]
    fn enabling_velocity_variation_perturbs_shear_velocities() {
        let randomizer = ProfileRandomizer {
            velocity: VelocityVariation { enabled: true, ..VelocityVariation::default() },
            thickness: LayerThicknessVariation::default(),
            bedrock_depth: BedrockDepthVariation::new(Distribution::normal(25.0, 2.0)),
            nonlinear_property: NonlinearPropertyRandomizer::default(),
        };
        let profile = sample_profile();
        let mut rng = Mt64::new(3);
        let realization = randomizer.randomize(&profile, &mut rng).unwrap();
        assert!(realization
            .layers
            .iter()
            .zip(profile.layers.iter())
            .any(|(a, b)| (a.shear_vel - b.shear_vel).abs() > 1e-9));
    }

    #[test]
    fn enabling_thickness_variation_preserves_total_depth() {
        let randomizer = ProfileRandomizer {
            velocity: VelocityVariation::default(),
            thickness: LayerThicknessVariation { enabled: true, ..LayerThicknessVariation::default() },
            bedrock_depth: BedrockDepthVariation::new(Distribution::normal(25.0, 2.0)),
            nonlinear_property: NonlinearPropertyRandomizer::default(),
        };
        let profile = sample_profile();
        let mut rng = Mt64::new(5);
        let realization = randomizer.randomize(&profile, &mut rng).unwrap();
        assert!((realization.total_depth() - profile.total_depth()).abs() < 1e-6);
    }

    #[test]
    fn same_seed_reproduces_identical_realization() {
        let randomizer = ProfileRandomizer {
            velocity: VelocityVariation { enabled: true, ..VelocityVariation::default() },
            thickness: LayerThicknessVariation { enabled: true, ..LayerThicknessVariation::default() },
            bedrock_depth: BedrockDepthVariation { enabled: true, distribution: Distribution::normal(25.0, 2.0) },
            nonlinear_property: NonlinearPropertyRandomizer { enabled: true, ..NonlinearPropertyRandomizer::default() },
        };
        let profile = sample_profile();
        let mut rng_a = Mt64::new(42);
        let mut rng_b = Mt64::new(42);
        let a = randomizer.randomize(&profile, &mut rng_a).unwrap();
        let b = randomizer.randomize(&profile, &mut rng_b).unwrap();
        assert_eq!(a.total_depth(), b.total_depth());
        for (la, lb) in a.layers.iter().zip(b.layers.iter()) {
            assert_eq!(la.shear_vel, lb.shear_vel);
            assert_eq!(la.thickness, lb.thickness);
        }
    }
}
