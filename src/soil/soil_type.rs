//! Physical soil material properties shared by every layer made of the same
//! material.

use crate::error::StrataError;
use crate::nonlinear_property::{DarendeliParameters, NonlinearProperty};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilType {
    pub name: String,
    /// kN/m^3 (or consistent unit chosen by the caller's `Config`).
    pub unit_weight: f64,
    /// Initial (small-strain) damping ratio, percent.
    pub initial_damping_pct: f64,
    pub modulus_reduction: NonlinearProperty,
    pub damping: NonlinearProperty,
    /// Whether this soil type's curves participate in nonlinear-property
    /// randomization.
    pub is_varied: bool,
    pub darendeli: Option<DarendeliParameters>,
}

impl SoilType {
    pub fn new(
        name: impl Into<String>,
        unit_weight: f64,
        initial_damping_pct: f64,
        modulus_reduction: NonlinearProperty,
        damping: NonlinearProperty,
    ) -> Result<Self, StrataError> {
        if unit_weight <= 0.0 {
            return Err(StrataError::Input("unit_weight must be positive".to_string()));
        }
        Ok(Self {
            name: name.into(),
            unit_weight,
            initial_damping_pct,
            modulus_reduction,
            damping,
            is_varied: true,
            darendeli: None,
        })
    }

    /// Mass density consistent with `unit_weight` and the caller-supplied
    /// gravitational acceleration (kept out of this module per the
    /// Design Notes -- the kernel and drivers are unit-agnostic).
    pub fn density(&self, gravity: f64) -> f64 {
        self.unit_weight / gravity
    }

    /// `(G/Gmax, damping%)` at the given effective shear strain (percent),
    /// drawn from the varied curves when present.
    pub fn interp_at(&self, strain_pct: f64) -> (f64, f64) {
        (self.modulus_reduction.interp(strain_pct), self.damping.interp(strain_pct))
    }
}
