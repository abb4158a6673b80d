//! Human-inspectable [`Config`] import/export, kept separate from the
//! binary project blob in [`crate::io::project`] so a user can hand-edit a
//! run's settings without touching soil or motion data.

use crate::controller::Config;
use crate::error::StrataError;
use std::io::{Read, Write};

fn serde_err(e: serde_json::Error) -> StrataError {
    StrataError::Input(format!("config JSON error: {e}"))
}

fn io_err(e: std::io::Error) -> StrataError {
    StrataError::Input(format!("config JSON I/O error: {e}"))
}

pub fn write_config_json<W: Write>(writer: &mut W, config: &Config) -> Result<(), StrataError> {
    let json = serde_json::to_string_pretty(config).map_err(serde_err)?;
    writer.write_all(json.as_bytes()).map_err(io_err)
}

pub fn read_config_json<R: Read>(reader: &mut R) -> Result<Config, StrataError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf).map_err(io_err)?;
    serde_json::from_str(&buf).map_err(serde_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{InputLocationSpec, Method, Units};
    use crate::kernel::equivalent_linear::ConvergenceParams;
    use crate::motion::common::MotionType;

    #[test]
    fn round_trips_config_through_json() {
        let config = Config {
            units: Units::Imperial,
            method: Method::EquivalentLinear(ConvergenceParams { strain_ratio: 0.6, error_tolerance_pct: 1.5, max_iterations: 10 }),
            realization_count: 20,
            seed: 42,
            max_freq_hz: 25.0,
            wave_fraction: 0.15,
            disable_auto_discretization: true,
            input_location: InputLocationSpec::Depth { depth: 12.5, motion_type: MotionType::Within },
            response_spectrum_damping_pct: 5.0,
        };

        let mut buf = Vec::new();
        write_config_json(&mut buf, &config).unwrap();
        let round_tripped = read_config_json(&mut buf.as_slice()).unwrap();

        assert_eq!(round_tripped.units, config.units);
        assert_eq!(round_tripped.realization_count, config.realization_count);
        assert_eq!(round_tripped.seed, config.seed);
        match (round_tripped.method, config.method) {
            (Method::EquivalentLinear(a), Method::EquivalentLinear(b)) => {
                assert_eq!(a.strain_ratio, b.strain_ratio);
                assert_eq!(a.max_iterations, b.max_iterations);
            }
            _ => panic!("method variant mismatch"),
        }
    }

    #[test]
    fn human_readable_output_contains_field_names() {
        let config = Config::default();
        let mut buf = Vec::new();
        write_config_json(&mut buf, &config).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"seed\""));
        assert!(text.contains("\"realization_count\""));
    }
}
