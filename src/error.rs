//! Error taxonomy for the engine.
//!
//! Three tiers, matching the propagation policy: input errors stop
//! computation before it starts, numerics warnings are recorded but let the
//! caller continue, and fatal numerics abort only the current realization.
//! Cancellation is not an error and is carried in `DriverStatus` instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrataError {
    #[error("invalid input: {0}")]
    Input(String),

    #[error("fatal numerics: {0}")]
    Numerics(#[from] NumericsError),
}

/// Fatal numerics errors: the realization that produced them is abandoned,
/// its `enabled` flag cleared, and the controller moves on to the next one.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NumericsError {
    #[error("wave amplitude computation produced NaN")]
    WaveComputationNaN,
    #[error("peak strain was non-positive")]
    NonPositivePeakStrain,
    #[error("baseline-fit regression was non-invertible")]
    NonInvertibleRegression,
}

/// Non-fatal diagnostic recorded in the controller's text log; computation
/// continues.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    MaxIterationsReached { realization: usize, max_error_pct: f64 },
    VanmarckeClippedNegative { frequency_hz: f64 },
    FitNotConverged { iterations: usize, rms_error_pct: f64 },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::MaxIterationsReached { realization, max_error_pct } => write!(
                f,
                "realization {realization}: max iterations reached without converging (error {max_error_pct:.2}%)"
            ),
            Diagnostic::VanmarckeClippedNegative { frequency_hz } => write!(
                f,
                "Vanmarcke inversion clipped a negative FAS^2 at {frequency_hz:.3} Hz"
            ),
            Diagnostic::FitNotConverged { iterations, rms_error_pct } => write!(
                f,
                "response-spectrum fit did not converge after {iterations} iterations (rms error {rms_error_pct:.2}%)"
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, StrataError>;
