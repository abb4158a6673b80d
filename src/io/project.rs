//! Project persistence: a small versioned binary codec over
//! `std::io::{Read, Write}` (SPEC_FULL.md §4.10). Not a format shared with
//! any other tool, so fields are written in a fixed order with manual
//! `to_le_bytes()`/`from_le_bytes()` -- no external binary-encoding crate,
//! matching the teacher's preference for `std`-only plumbing where `std`
//! already covers the task.

use crate::controller::{Config, InputLocationSpec, Method, Units};
use crate::distribution::{Distribution, DistributionKind};
use crate::error::StrataError;
use crate::kernel::equivalent_linear::ConvergenceParams;
use crate::motion::MotionType;
use crate::nonlinear_property::{NonlinearProperty, PropertyKind};
use crate::soil::layer::{RockLayer, SoilLayer};
use crate::soil::profile::SoilProfile;
use crate::soil::soil_type::SoilType;
use std::io::{Read, Write};

pub const FORMAT_VERSION: u8 = 1;

pub struct ProjectWriter<W: Write> {
    inner: W,
}

impl<W: Write> ProjectWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    fn write_u8(&mut self, v: u8) -> Result<(), StrataError> {
        self.inner.write_all(&[v]).map_err(io_err)
    }

    fn write_u64(&mut self, v: u64) -> Result<(), StrataError> {
        self.inner.write_all(&v.to_le_bytes()).map_err(io_err)
    }

    fn write_f64(&mut self, v: f64) -> Result<(), StrataError> {
        self.inner.write_all(&v.to_le_bytes()).map_err(io_err)
    }

    fn write_bool(&mut self, v: bool) -> Result<(), StrataError> {
        self.write_u8(if v { 1 } else { 0 })
    }

    fn write_string(&mut self, s: &str) -> Result<(), StrataError> {
        self.write_u64(s.len() as u64)?;
        self.inner.write_all(s.as_bytes()).map_err(io_err)
    }

    fn write_f64_vec(&mut self, v: &[f64]) -> Result<(), StrataError> {
        self.write_u64(v.len() as u64)?;
        for &x in v {
            self.write_f64(x)?;
        }
        Ok(())
    }

    fn write_distribution(&mut self, d: &Distribution) -> Result<(), StrataError> {
        let kind = match d.kind {
            DistributionKind::Normal => 0u8,
            DistributionKind::LogNormal => 1,
            DistributionKind::Uniform => 2,
        };
        self.write_u8(kind)?;
        self.write_f64(d.avg)?;
        self.write_f64(d.stdev)?;
        self.write_bool(d.min.is_some())?;
        self.write_f64(d.min.unwrap_or(0.0))?;
        self.write_bool(d.max.is_some())?;
        self.write_f64(d.max.unwrap_or(0.0))
    }

    fn write_nonlinear_property(&mut self, p: &NonlinearProperty) -> Result<(), StrataError> {
        self.write_f64_vec(&p.strains)?;
        self.write_f64_vec(&p.avg)
    }

    fn write_soil_type(&mut self, st: &SoilType) -> Result<(), StrataError> {
        self.write_string(&st.name)?;
        self.write_f64(st.unit_weight)?;
        self.write_f64(st.initial_damping_pct)?;
        self.write_nonlinear_property(&st.modulus_reduction)?;
        self.write_nonlinear_property(&st.damping)?;
        self.write_bool(st.is_varied)
    }

    fn write_soil_layer(&mut self, layer: &SoilLayer) -> Result<(), StrataError> {
        self.write_f64(layer.thickness)?;
        self.write_distribution(&layer.shear_vel_distribution)?;
        self.write_bool(layer.is_varied)?;
        self.write_u64(layer.soil_type_index as u64)
    }

    fn write_rock_layer(&mut self, rock: &RockLayer) -> Result<(), StrataError> {
        self.write_f64(rock.unit_weight)?;
        self.write_f64(rock.shear_vel)?;
        self.write_f64(rock.damping_pct)?;
        self.write_distribution(&rock.damping_distribution)
    }

    pub fn write_profile(&mut self, profile: &SoilProfile) -> Result<(), StrataError> {
        self.write_u64(profile.soil_types.len() as u64)?;
        for st in &profile.soil_types {
            self.write_soil_type(st)?;
        }
        self.write_u64(profile.layers.len() as u64)?;
        for layer in &profile.layers {
            self.write_soil_layer(layer)?;
        }
        self.write_rock_layer(&profile.rock_layer)?;
        self.write_f64(profile.water_table_depth)
    }

    pub fn write_config(&mut self, config: &Config) -> Result<(), StrataError> {
        self.write_u8(match config.units {
            Units::Metric => 0,
            Units::Imperial => 1,
        })?;
        match config.method {
            Method::LinearElastic => self.write_u8(0)?,
            Method::EquivalentLinear(params) => {
                self.write_u8(1)?;
                self.write_f64(params.strain_ratio)?;
                self.write_f64(params.error_tolerance_pct)?;
                self.write_u64(params.max_iterations as u64)?;
            }
        }
        self.write_u64(config.realization_count as u64)?;
        self.write_u64(config.seed)?;
        self.write_f64(config.max_freq_hz)?;
        self.write_f64(config.wave_fraction)?;
        self.write_bool(config.disable_auto_discretization)?;
        match config.input_location {
            InputLocationSpec::BedrockOutcrop => self.write_u8(0)?,
            InputLocationSpec::Depth { depth, motion_type } => {
                self.write_u8(1)?;
                self.write_f64(depth)?;
                self.write_u8(motion_type_tag(motion_type))?;
            }
        }
        self.write_f64(config.response_spectrum_damping_pct)
    }

    pub fn write_enabled_outputs(&mut self, bitmap: &[bool]) -> Result<(), StrataError> {
        self.write_u64(bitmap.len() as u64)?;
        for &b in bitmap {
            self.write_bool(b)?;
        }
        Ok(())
    }

    /// Writes the format version, then profile, config, and the
    /// enabled-output bitmap in that fixed order.
    pub fn write_project(&mut self, profile: &SoilProfile, config: &Config, enabled_outputs: &[bool]) -> Result<(), StrataError> {
        self.write_u8(FORMAT_VERSION)?;
        self.write_profile(profile)?;
        self.write_config(config)?;
        self.write_enabled_outputs(enabled_outputs)
    }
}

pub struct ProjectReader<R: Read> {
    inner: R,
}

impl<R: Read> ProjectReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    fn read_u8(&mut self) -> Result<u8, StrataError> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf).map_err(io_err)?;
        Ok(buf[0])
    }

    fn read_u64(&mut self) -> Result<u64, StrataError> {
        let mut buf = [0u8; 8];
        self.inner.read_exact(&mut buf).map_err(io_err)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn read_f64(&mut self) -> Result<f64, StrataError> {
        let mut buf = [0u8; 8];
        self.inner.read_exact(&mut buf).map_err(io_err)?;
        Ok(f64::from_le_bytes(buf))
    }

    fn read_bool(&mut self) -> Result<bool, StrataError> {
        Ok(self.read_u8()? != 0)
    }

    fn read_string(&mut self) -> Result<String, StrataError> {
        let len = self.read_u64()? as usize;
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf).map_err(io_err)?;
        String::from_utf8(buf).map_err(|_| StrataError::Input("project string field is not valid UTF-8".to_string()))
    }

    fn read_f64_vec(&mut self) -> Result<Vec<f64>, StrataError> {
        let len = self.read_u64()? as usize;
        (0..len).map(|_| self.read_f64()).collect()
    }

    fn read_distribution(&mut self) -> Result<Distribution, StrataError> {
        let kind = self.read_u8()?;
        let avg = self.read_f64()?;
        let stdev = self.read_f64()?;
        let has_min = self.read_bool()?;
        let min_raw = self.read_f64()?;
        let has_max = self.read_bool()?;
        let max_raw = self.read_f64()?;
        let base = match kind {
            0 => Distribution::normal(avg, stdev),
            1 => Distribution::log_normal(avg, stdev),
            2 => Distribution::uniform(min_raw, max_raw),
            other => return Err(StrataError::Input(format!("unknown distribution kind tag {other}"))),
        };
        Ok(base.truncated(has_min.then_some(min_raw), has_max.then_some(max_raw)))
    }

    fn read_nonlinear_property(&mut self, kind: PropertyKind) -> Result<NonlinearProperty, StrataError> {
        let strains = self.read_f64_vec()?;
        let avg = self.read_f64_vec()?;
        NonlinearProperty::new(kind, strains, avg)
    }

    fn read_soil_type(&mut self) -> Result<SoilType, StrataError> {
        let name = self.read_string()?;
        let unit_weight = self.read_f64()?;
        let initial_damping_pct = self.read_f64()?;
        let modulus_reduction = self.read_nonlinear_property(PropertyKind::ModulusReduction)?;
        let damping = self.read_nonlinear_property(PropertyKind::Damping)?;
        let is_varied = self.read_bool()?;
        let mut st = SoilType::new(name, unit_weight, initial_damping_pct, modulus_reduction, damping)?;
        st.is_varied = is_varied;
        Ok(st)
    }

    fn read_soil_layer(&mut self) -> Result<SoilLayer, StrataError> {
        let thickness = self.read_f64()?;
        let shear_vel_distribution = self.read_distribution()?;
        let is_varied = self.read_bool()?;
        let soil_type_index = self.read_u64()? as usize;
        let mut layer = SoilLayer::new(thickness, shear_vel_distribution, soil_type_index)?;
        layer.is_varied = is_varied;
        Ok(layer)
    }

    fn read_rock_layer(&mut self) -> Result<RockLayer, StrataError> {
        let unit_weight = self.read_f64()?;
        let shear_vel = self.read_f64()?;
        let damping_pct = self.read_f64()?;
        let mut rock = RockLayer::new(unit_weight, shear_vel, damping_pct);
        rock.damping_distribution = self.read_distribution()?;
        Ok(rock)
    }

    pub fn read_profile(&mut self) -> Result<SoilProfile, StrataError> {
        let soil_type_count = self.read_u64()? as usize;
        let mut soil_types = Vec::with_capacity(soil_type_count);
        for _ in 0..soil_type_count {
            soil_types.push(self.read_soil_type()?);
        }
        let layer_count = self.read_u64()? as usize;
        let mut layers = Vec::with_capacity(layer_count);
        for _ in 0..layer_count {
            layers.push(self.read_soil_layer()?);
        }
        let rock_layer = self.read_rock_layer()?;
        let water_table_depth = self.read_f64()?;
        SoilProfile::new(soil_types, layers, rock_layer, water_table_depth)
    }

    pub fn read_config(&mut self) -> Result<Config, StrataError> {
        let units = match self.read_u8()? {
            0 => Units::Metric,
            1 => Units::Imperial,
            other => return Err(StrataError::Input(format!("unknown units tag {other}"))),
        };
        let method = match self.read_u8()? {
            0 => Method::LinearElastic,
            1 => {
                let strain_ratio = self.read_f64()?;
                let error_tolerance_pct = self.read_f64()?;
                let max_iterations = self.read_u64()? as usize;
                Method::EquivalentLinear(ConvergenceParams { strain_ratio, error_tolerance_pct, max_iterations })
            }
            other => return Err(StrataError::Input(format!("unknown method tag {other}"))),
        };
        let realization_count = self.read_u64()? as usize;
        let seed = self.read_u64()?;
        let max_freq_hz = self.read_f64()?;
        let wave_fraction = self.read_f64()?;
        let disable_auto_discretization = self.read_bool()?;
        let input_location = match self.read_u8()? {
            0 => InputLocationSpec::BedrockOutcrop,
            1 => {
                let depth = self.read_f64()?;
                let motion_type = motion_type_from_tag(self.read_u8()?)?;
                InputLocationSpec::Depth { depth, motion_type }
            }
            other => return Err(StrataError::Input(format!("unknown input location tag {other}"))),
        };
        let response_spectrum_damping_pct = self.read_f64()?;
        Ok(Config {
            units,
            method,
            realization_count,
            seed,
            max_freq_hz,
            wave_fraction,
            disable_auto_discretization,
            input_location,
            response_spectrum_damping_pct,
        })
    }

    pub fn read_enabled_outputs(&mut self) -> Result<Vec<bool>, StrataError> {
        let len = self.read_u64()? as usize;
        (0..len).map(|_| self.read_bool()).collect()
    }

    /// Reads the format version and dispatches accordingly; only version 1
    /// exists today.
    pub fn read_project(&mut self) -> Result<(SoilProfile, Config, Vec<bool>), StrataError> {
        let version = self.read_u8()?;
        if version != FORMAT_VERSION {
            return Err(StrataError::Input(format!("unsupported project file version {version}")));
        }
        let profile = self.read_profile()?;
        let config = self.read_config()?;
        let enabled_outputs = self.read_enabled_outputs()?;
        Ok((profile, config, enabled_outputs))
    }
}

fn motion_type_tag(motion_type: MotionType) -> u8 {
    match motion_type {
        MotionType::Outcrop => 0,
        MotionType::Within => 1,
        MotionType::IncomingOnly => 2,
    }
}

fn motion_type_from_tag(tag: u8) -> Result<MotionType, StrataError> {
    match tag {
        0 => Ok(MotionType::Outcrop),
        1 => Ok(MotionType::Within),
        2 => Ok(MotionType::IncomingOnly),
        other => Err(StrataError::Input(format!("unknown motion type tag {other}"))),
    }
}

fn io_err(e: std::io::Error) -> StrataError {
    StrataError::Input(format!("project I/O error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Distribution;
    use crate::nonlinear_property::{NonlinearProperty, PropertyKind};
    use crate::soil::layer::{RockLayer, SoilLayer};
    use crate::soil::soil_type::SoilType;

    fn sample_profile() -> SoilProfile {
        let flat = |kind| NonlinearProperty::new(kind, vec![1e-4, 1.0], vec![1.0, 0.5]).unwrap();
        let st = SoilType::new("Sand", 18.0, 1.0, flat(PropertyKind::ModulusReduction), flat(PropertyKind::Damping)).unwrap();
        let layer = SoilLayer::new(10.0, Distribution::normal(250.0, 0.2).truncated(Some(100.0), Some(400.0)), 0).unwrap();
        let rock = RockLayer::new(22.0, 760.0, 1.0);
        SoilProfile::new(vec![st], vec![layer], rock, 5.0).unwrap()
    }

    #[test]
    fn round_trips_profile_config_and_bitmap() {
        let profile = sample_profile();
        let config = Config::default();
        let bitmap = vec![true, false, true];

        let mut buf = Vec::new();
        ProjectWriter::new(&mut buf).write_project(&profile, &config, &bitmap).unwrap();

        let mut reader = ProjectReader::new(buf.as_slice());
        let (read_profile, read_config, read_bitmap) = reader.read_project().unwrap();

        assert_eq!(read_profile.layers.len(), profile.layers.len());
        assert_eq!(read_profile.layers[0].thickness, profile.layers[0].thickness);
        assert_eq!(read_profile.soil_types[0].name, profile.soil_types[0].name);
        assert_eq!(read_config.seed, config.seed);
        assert_eq!(read_bitmap, bitmap);
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut buf = vec![99u8];
        ProjectWriter::new(&mut Vec::new()); // exercised above; here only the reader path matters
        buf.extend_from_slice(&[0u8; 16]);
        let mut reader = ProjectReader::new(buf.as_slice());
        assert!(reader.read_project().is_err());
    }
}
