//! `SoilLayer` and `RockLayer`: the profile's user-facing layer types.
//! `SoilType` is referenced by index (not by pointer) so a randomized
//! profile clone can share soil types safely (Design Notes).

use crate::distribution::Distribution;
use crate::error::StrataError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilLayer {
    pub thickness: f64,
    /// Depth to the base of the layer; derived by `SoilProfile`.
    pub depth: f64,
    pub shear_vel_distribution: Distribution,
    pub is_varied: bool,
    /// Current (possibly randomized) shear-wave velocity.
    pub shear_vel: f64,
    /// Index into the owning `SoilProfile::soil_types`.
    pub soil_type_index: usize,
}

impl SoilLayer {
    pub fn new(thickness: f64, shear_vel_distribution: Distribution, soil_type_index: usize) -> Result<Self, StrataError> {
        if thickness <= 0.0 {
            return Err(StrataError::Input("layer thickness must be positive".to_string()));
        }
        Ok(Self {
            thickness,
            depth: 0.0,
            shear_vel_distribution,
            is_varied: true,
            shear_vel: shear_vel_distribution.avg,
            soil_type_index,
        })
    }
}

/// Infinite half-space layer terminating the profile. Carries its own
/// damping (randomized like a normal RV bounded below by zero) and has no
/// strain dependence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RockLayer {
    pub depth: f64,
    pub unit_weight: f64,
    pub shear_vel: f64,
    pub damping_distribution: Distribution,
    pub damping_pct: f64,
    pub is_varied: bool,
}

impl RockLayer {
    pub fn new(unit_weight: f64, shear_vel: f64, damping_pct: f64) -> Self {
        Self {
            depth: 0.0,
            unit_weight,
            shear_vel,
            damping_distribution: Distribution::normal(damping_pct, 0.0).truncated(Some(0.0), None),
            damping_pct,
            is_varied: true,
        }
    }

    pub fn density(&self, gravity: f64) -> f64 {
        self.unit_weight / gravity
    }
}
