//! Motion-file ingestion: plain free-format text and PEER AT2 records
//! (SPEC_FULL.md §4.9). Treated as an external collaborator per spec.md §1
//! -- parsing happens entirely outside the numerical core, producing a
//! plain `Vec<f64>` of accelerations the core never re-interprets.

use crate::error::StrataError;
use crate::motion::common::MotionType;
use crate::motion::time_series::TimeSeriesMotion;

/// Acceleration unit, carrying the multiplicative factor to SI (m/s^2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unit {
    Gravity,
    CmPerSecSq,
    InPerSecSq,
}

impl Unit {
    pub fn scale(self, gravity: f64) -> f64 {
        match self {
            Unit::Gravity => gravity,
            Unit::CmPerSecSq => 0.01,
            Unit::InPerSecSq => 0.0254,
        }
    }
}

/// Caller-supplied description of a free-format text record's layout.
/// Indices are 0-based throughout the numerical core; `display_line()`
/// below is the only place a 1-based line number is ever produced, and it
/// exists solely for surfacing parse errors to a human.
#[derive(Debug, Clone, Copy)]
pub struct TextLayout {
    pub line_count_header: usize,
    pub line_count_footer: usize,
    /// 0-based column index when the data is arranged in columns; ignored
    /// for row-major (whitespace-delimited, one record per line) layout.
    pub column_index: usize,
    pub dt: f64,
    pub point_count: usize,
    pub unit: Unit,
    pub column_major: bool,
}

/// Converts a 0-based line index to the 1-based number a human expects to
/// see in an error message or editor. Never used inside parsing logic.
pub fn display_line(line_index: usize) -> usize {
    line_index + 1
}

/// Parses a plain free-format text acceleration record per `layout`.
pub fn parse_text_motion(
    name: impl Into<String>,
    contents: &str,
    layout: TextLayout,
    motion_type: MotionType,
    gravity: f64,
) -> Result<TimeSeriesMotion, StrataError> {
    let lines: Vec<&str> = contents.lines().collect();
    if lines.len() <= layout.line_count_header + layout.line_count_footer {
        return Err(StrataError::Input(format!(
            "text motion record has no data rows after removing {} header and {} footer lines",
            layout.line_count_header, layout.line_count_footer
        )));
    }
    let data_lines = &lines[layout.line_count_header..lines.len() - layout.line_count_footer];

    let mut values = Vec::with_capacity(layout.point_count);
    if layout.column_major {
        for line in data_lines {
            let token = line.split_whitespace().nth(layout.column_index);
            if let Some(token) = token {
                let v: f64 = token
                    .parse()
                    .map_err(|_| StrataError::Input(format!("non-numeric value '{token}' in text motion record")))?;
                values.push(v);
            }
        }
    } else {
        for line in data_lines {
            for token in line.split_whitespace() {
                let v: f64 = token
                    .parse()
                    .map_err(|_| StrataError::Input(format!("non-numeric value '{token}' in text motion record")))?;
                values.push(v);
            }
        }
    }

    if values.len() != layout.point_count {
        return Err(StrataError::Input(format!(
            "expected {} points in text motion record, found {}",
            layout.point_count,
            values.len()
        )));
    }
    if !values.iter().all(|v: &f64| v.is_finite()) {
        return Err(StrataError::Input("text motion record contains a non-finite value".to_string()));
    }

    let scale = layout.unit.scale(gravity);
    let acceleration: Vec<f64> = values.iter().map(|v| v * scale).collect();
    TimeSeriesMotion::new(name, layout.dt, acceleration, motion_type)
}

/// Parses a PEER NGA AT2 record: 4-line header, point count and time step
/// on (0-based) line 3 as the first two whitespace-separated tokens, data
/// starting at (0-based) line 4, accelerations in g.
pub fn parse_at2_motion(
    name: impl Into<String>,
    contents: &str,
    motion_type: MotionType,
    gravity: f64,
) -> Result<TimeSeriesMotion, StrataError> {
    let lines: Vec<&str> = contents.lines().collect();
    if lines.len() < 5 {
        return Err(StrataError::Input("AT2 record is missing its 4-line header".to_string()));
    }

    let header_tokens: Vec<&str> = lines[3].split_whitespace().collect();
    let point_count: usize = header_tokens
        .first()
        .ok_or_else(|| StrataError::Input("AT2 header line 4 has no point count".to_string()))?
        .trim_end_matches(',')
        .parse()
        .map_err(|_| StrataError::Input("unable to parse point count in AT2 header".to_string()))?;
    let dt: f64 = header_tokens
        .get(1)
        .ok_or_else(|| StrataError::Input("AT2 header line 4 has no time step".to_string()))?
        .trim_end_matches(',')
        .parse()
        .map_err(|_| StrataError::Input("unable to parse time step in AT2 header".to_string()))?;

    let layout = TextLayout {
        line_count_header: 4,
        line_count_footer: 0,
        column_index: 0,
        dt,
        point_count,
        unit: Unit::Gravity,
        column_major: false,
    };
    parse_text_motion(name, contents, layout, motion_type, gravity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_at2_header_and_data() {
        let contents = "Event\nStation\nACCELERATION TIME HISTORY\n4, 0.02\n0.1 0.2\n-0.1 0.05\n";
        let motion = parse_at2_motion("m", contents, MotionType::Outcrop, 9.81).unwrap();
        assert_eq!(motion.dt, 0.02);
        assert_eq!(motion.acceleration.len(), 4);
        assert!((motion.acceleration[0] - 0.1 * 9.81).abs() < 1e-9);
    }

    #[test]
    fn display_line_is_one_based() {
        assert_eq!(display_line(0), 1);
        assert_eq!(display_line(3), 4);
    }

    #[test]
    fn rejects_point_count_mismatch() {
        let contents = "h\n1.0 2.0 3.0\n";
        let layout = TextLayout {
            line_count_header: 1,
            line_count_footer: 0,
            column_index: 0,
            dt: 0.01,
            point_count: 5,
            unit: Unit::CmPerSecSq,
            column_major: false,
        };
        let result = parse_text_motion("m", contents, layout, MotionType::Outcrop, 9.81);
        assert!(result.is_err());
    }

    #[test]
    fn column_major_reads_single_column() {
        let contents = "h\n1.0 99.0\n2.0 98.0\n3.0 97.0\n";
        let layout = TextLayout {
            line_count_header: 1,
            line_count_footer: 0,
            column_index: 0,
            dt: 0.01,
            point_count: 3,
            unit: Unit::CmPerSecSq,
            column_major: true,
        };
        let motion = parse_text_motion("m", contents, layout, MotionType::Outcrop, 9.81).unwrap();
        assert_eq!(motion.acceleration.len(), 3);
        assert!((motion.acceleration[0] - 0.01).abs() < 1e-9);
    }
}
