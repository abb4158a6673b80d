//! `SoilProfile`: the ordered layer stack plus its sublayer discretization.

use crate::error::StrataError;
use crate::soil::layer::{RockLayer, SoilLayer};
use crate::soil::soil_type::SoilType;
use crate::soil::sublayer::SubLayer;
use serde::{Deserialize, Serialize};

/// Auto-discretization defaults from spec.md §3.
pub const DEFAULT_MAX_FREQ_HZ: f64 = 20.0;
pub const DEFAULT_WAVE_FRACTION: f64 = 0.20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilProfile {
    pub soil_types: Vec<SoilType>,
    pub layers: Vec<SoilLayer>,
    pub rock_layer: RockLayer,
    pub water_table_depth: f64,
    #[serde(skip)]
    pub sub_layers: Vec<SubLayer>,
}

impl SoilProfile {
    pub fn new(
        soil_types: Vec<SoilType>,
        layers: Vec<SoilLayer>,
        rock_layer: RockLayer,
        water_table_depth: f64,
    ) -> Result<Self, StrataError> {
        if layers.is_empty() {
            return Err(StrataError::Input("soil profile must contain at least one layer".to_string()));
        }
        for layer in &layers {
            if layer.soil_type_index >= soil_types.len() {
                return Err(StrataError::Input("soil layer references an out-of-range soil type".to_string()));
            }
        }
        let mut profile = Self { soil_types, layers, rock_layer, water_table_depth, sub_layers: Vec::new() };
        profile.recompute_depths();
        Ok(profile)
    }

    /// Recomputes each layer's `depth` (depth to base) and the rock layer's
    /// depth (sum of all thicknesses). Invariant: depths form a
    /// non-decreasing sequence starting at 0; `rock_layer.depth == total`.
    pub fn recompute_depths(&mut self) {
        let mut bottom = 0.0;
        for layer in &mut self.layers {
            bottom += layer.thickness;
            layer.depth = bottom;
        }
        self.rock_layer.depth = bottom;
    }

    pub fn total_depth(&self) -> f64 {
        self.rock_layer.depth
    }

    pub fn soil_type(&self, layer_index: usize) -> &SoilType {
        &self.soil_types[self.layers[layer_index].soil_type_index]
    }

    /// Discretizes every `SoilLayer` into one or more `SubLayer`s such that
    /// `thickness <= shear_vel / (max_freq * wave_fraction)`, unless
    /// `disable_auto_discretization` is set, in which case each `SoilLayer`
    /// becomes exactly one `SubLayer`.
    pub fn discretize(
        &mut self,
        gravity: f64,
        max_freq_hz: f64,
        wave_fraction: f64,
        disable_auto_discretization: bool,
    ) {
        let mut sub_layers = Vec::new();
        let mut top_depth = 0.0;

        for (layer_idx, layer) in self.layers.iter().enumerate() {
            let soil_type = &self.soil_types[layer.soil_type_index];
            let n_sub = if disable_auto_discretization {
                1
            } else {
                let max_thickness = (layer.shear_vel / (max_freq_hz * wave_fraction)).max(1e-6);
                ((layer.thickness / max_thickness).ceil() as usize).max(1)
            };
            let sub_thickness = layer.thickness / n_sub as f64;

            for i in 0..n_sub {
                let sub_top = top_depth + i as f64 * sub_thickness;
                let sub_bottom = sub_top + sub_thickness;
                let sub_center = 0.5 * (sub_top + sub_bottom);
                let vertical_stress = self.vertical_total_stress_at(sub_bottom, gravity);
                sub_layers.push(SubLayer {
                    thickness: sub_thickness,
                    depth: sub_center,
                    vertical_stress,
                    water_table_depth: self.water_table_depth,
                    soil_layer_index: layer_idx,
                    shear_vel: layer.shear_vel,
                    unit_weight: soil_type.unit_weight,
                    shear_mod: soil_type.density(gravity) * layer.shear_vel * layer.shear_vel,
                    damping_pct: soil_type.initial_damping_pct,
                    old_shear_mod: 0.0,
                    old_damping_pct: 0.0,
                    eff_strain_pct: 0.0,
                    max_strain_pct: 0.0,
                    error_pct: 0.0,
                });
            }
            top_depth += layer.thickness;
        }

        self.sub_layers = sub_layers;
    }

    /// Vertical total stress (unit-weight weighted) at `depth`, using dry
    /// unit weight above the water table and (unit_weight minus the
    /// buoyant correction) below it; since `SoilType` carries a single
    /// `unit_weight`, this simplified form treats it as the moist/saturated
    /// weight and subtracts the water's contribution below the table
    /// (consistent with the teacher's `calc_normal_stress`/
    /// `calc_effective_stress` split).
    pub fn vertical_total_stress_at(&self, depth: f64, _gravity: f64) -> f64 {
        let mut stress = 0.0;
        let mut prev_depth = 0.0;
        for layer in &self.layers {
            let layer_bottom = layer.depth.min(depth);
            if layer_bottom <= prev_depth {
                break;
            }
            let thickness = layer_bottom - prev_depth;
            let soil_type = &self.soil_types[layer.soil_type_index];
            stress += soil_type.unit_weight * thickness;
            prev_depth = layer_bottom;
            if prev_depth >= depth {
                break;
            }
        }
        stress
    }

    pub fn gmax(&self, layer_index: usize, gravity: f64) -> f64 {
        let layer = &self.layers[layer_index];
        let soil_type = self.soil_type(layer_index);
        soil_type.density(gravity) * layer.shear_vel * layer.shear_vel
    }

    pub fn half_space_shear_modulus(&self, gravity: f64) -> f64 {
        self.rock_layer.density(gravity) * self.rock_layer.shear_vel * self.rock_layer.shear_vel
    }
}
