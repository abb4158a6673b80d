//! The built-in `Output` registry (spec.md §4.5). Each variant declares its
//! shape via the methods below rather than via a `dyn Trait` object, per
//! the Design Notes preference for closed enums over trait objects.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    ModulusCurve,
    DampingCurve,
    AccelTimeSeries,
    VelTimeSeries,
    DispTimeSeries,
    StrainTimeSeries,
    StressTimeSeries,
    FourierSpectrum,
    ResponseSpectrum,
    SpectralRatio,
    AccelTransferFunction,
    StrainTransferFunction,
    MaxAccelProfile,
    MaxVelProfile,
    MaxStrainProfile,
    MaxStressProfile,
    StressReducCoeff,
    StressRatio,
    VerticalStress,
    InitialVelProfile,
    FinalVelProfile,
    ModulusProfile,
    DampingProfile,
    MaxErrorProfile,
    AriasIntensity,
}

impl OutputKind {
    pub const ALL: [OutputKind; 25] = [
        OutputKind::ModulusCurve,
        OutputKind::DampingCurve,
        OutputKind::AccelTimeSeries,
        OutputKind::VelTimeSeries,
        OutputKind::DispTimeSeries,
        OutputKind::StrainTimeSeries,
        OutputKind::StressTimeSeries,
        OutputKind::FourierSpectrum,
        OutputKind::ResponseSpectrum,
        OutputKind::SpectralRatio,
        OutputKind::AccelTransferFunction,
        OutputKind::StrainTransferFunction,
        OutputKind::MaxAccelProfile,
        OutputKind::MaxVelProfile,
        OutputKind::MaxStrainProfile,
        OutputKind::MaxStressProfile,
        OutputKind::StressReducCoeff,
        OutputKind::StressRatio,
        OutputKind::VerticalStress,
        OutputKind::InitialVelProfile,
        OutputKind::FinalVelProfile,
        OutputKind::ModulusProfile,
        OutputKind::DampingProfile,
        OutputKind::MaxErrorProfile,
        OutputKind::AriasIntensity,
    ];

    /// Whether this output varies by motion (as opposed to being purely a
    /// property of the randomized profile, computed once per realization).
    pub fn is_motion_dependent(self) -> bool {
        !matches!(
            self,
            OutputKind::ModulusCurve
                | OutputKind::DampingCurve
                | OutputKind::VerticalStress
                | OutputKind::InitialVelProfile
                | OutputKind::FinalVelProfile
                | OutputKind::ModulusProfile
                | OutputKind::DampingProfile
        )
    }

    /// Whether this output varies across realizations (as opposed to being
    /// identical for every realization of a deterministic profile, e.g. a
    /// motion's own Fourier spectrum).
    pub fn is_site_dependent(self) -> bool {
        !matches!(self, OutputKind::FourierSpectrum | OutputKind::ResponseSpectrum)
    }

    pub fn is_time_series(self) -> bool {
        matches!(
            self,
            OutputKind::AccelTimeSeries
                | OutputKind::VelTimeSeries
                | OutputKind::DispTimeSeries
                | OutputKind::StrainTimeSeries
                | OutputKind::StressTimeSeries
        )
    }

    /// Whether cross-realization statistics are computed in log space
    /// (spec.md §4.5: "mean in log-space ... ± bands = mean * exp(± stdev)").
    /// Time histories, transfer functions and ratio-type quantities are
    /// linear; amplitude-like profile and curve quantities are log-normal.
    pub fn is_log_normal(self) -> bool {
        matches!(
            self,
            OutputKind::ModulusCurve
                | OutputKind::DampingCurve
                | OutputKind::FourierSpectrum
                | OutputKind::ResponseSpectrum
                | OutputKind::MaxAccelProfile
                | OutputKind::MaxVelProfile
                | OutputKind::MaxStrainProfile
                | OutputKind::MaxStressProfile
                | OutputKind::ModulusProfile
                | OutputKind::InitialVelProfile
                | OutputKind::FinalVelProfile
                | OutputKind::AriasIntensity
        )
    }

    /// Whether the reference axis is depth (a "profile" output, densified
    /// per spec.md §4.5's piecewise depth axis) as opposed to
    /// frequency/period/time/strain.
    pub fn is_depth_profile(self) -> bool {
        matches!(
            self,
            OutputKind::MaxAccelProfile
                | OutputKind::MaxVelProfile
                | OutputKind::MaxStrainProfile
                | OutputKind::MaxStressProfile
                | OutputKind::StressReducCoeff
                | OutputKind::StressRatio
                | OutputKind::VerticalStress
                | OutputKind::InitialVelProfile
                | OutputKind::FinalVelProfile
                | OutputKind::ModulusProfile
                | OutputKind::DampingProfile
                | OutputKind::MaxErrorProfile
        )
    }

    /// Whether realization values at each depth band are held constant
    /// within the layer (material properties) or linearly interpolated
    /// (stress/strain quantities), per spec.md §4.5.
    pub fn is_constant_within_layer(self) -> bool {
        matches!(
            self,
            OutputKind::ModulusProfile
                | OutputKind::DampingProfile
                | OutputKind::InitialVelProfile
                | OutputKind::FinalVelProfile
        )
    }
}
