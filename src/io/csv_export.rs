//! CSV export of a finalized `OutputSeries` (SPEC_FULL.md §4.11). Columns
//! are the reference abscissa followed by one column per realization/motion
//! row, then trailing summary columns -- `Median`/`ln Stdev.` for log-normal
//! series, `Mean`/`Stdev.` otherwise. Written with `std::io::Write` only, no
//! CSV crate, since every field here is already a plain float or a simple
//! label with no embedded commas or quotes to escape.

use crate::error::StrataError;
use crate::output::catalog::OutputSeries;
use std::io::Write;

fn io_err(e: std::io::Error) -> StrataError {
    StrataError::Input(format!("CSV export I/O error: {e}"))
}

/// Builds the column label for one row: `S-{i+1}` for a realization-only
/// row, `M-{name}` for a motion-only row (single deterministic
/// realization), or `S-{i+1}-M-{name}` when both vary; appends
/// ` (disabled)` when the row was excluded from statistics.
fn row_label(row_realization_index: usize, motion_index: Option<usize>, motion_names: &[String], multi_realization: bool, enabled: bool) -> String {
    let mut label = String::new();
    if multi_realization {
        label.push_str(&format!("S-{}", row_realization_index + 1));
    }
    if let Some(m) = motion_index {
        if !label.is_empty() {
            label.push('-');
        }
        let name = motion_names.get(m).map(String::as_str).unwrap_or("motion");
        label.push_str(&format!("M-{name}"));
    }
    if label.is_empty() {
        label.push_str("S-1");
    }
    if !enabled {
        label.push_str(" (disabled)");
    }
    label
}

/// Writes `series` as CSV to `writer`. `motion_names` maps a row's
/// `motion_index` to the motion's display name; `abscissa_label` names the
/// reference-axis column (e.g. `"Depth"`, `"Frequency"`, `"Period"`).
pub fn write_series_csv<W: Write>(
    writer: &mut W,
    series: &OutputSeries,
    abscissa_label: &str,
    motion_names: &[String],
) -> Result<(), StrataError> {
    let multi_realization = {
        let mut indices: Vec<usize> = series.rows.iter().map(|r| r.realization_index).collect();
        indices.sort_unstable();
        indices.dedup();
        indices.len() > 1
    };

    let mut header = vec![abscissa_label.to_string()];
    for row in &series.rows {
        header.push(row_label(row.realization_index, row.motion_index, motion_names, multi_realization, row.enabled));
    }
    let log_normal = series.kind.is_log_normal();
    if series.statistics.is_some() {
        header.push(if log_normal { "Median".to_string() } else { "Mean".to_string() });
        header.push(if log_normal { "ln Stdev.".to_string() } else { "Stdev.".to_string() });
    }
    writeln!(writer, "{}", header.join(",")).map_err(io_err)?;

    for (i, &abscissa) in series.reference_axis.iter().enumerate() {
        let mut fields = vec![format!("{abscissa}")];
        for row in &series.rows {
            let v = row.values.get(i).copied().unwrap_or(f64::NAN);
            fields.push(format!("{v}"));
        }
        if let Some(stats) = &series.statistics {
            fields.push(format!("{}", stats.mean[i]));
            fields.push(format!("{}", stats.stdev[i]));
        }
        writeln!(writer, "{}", fields.join(",")).map_err(io_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::catalog::OutputCatalog;
    use crate::output::kinds::OutputKind;

    #[test]
    fn writes_header_and_rows_with_summary_columns() {
        let mut catalog = OutputCatalog::new();
        let axis = vec![0.0, 1.0];
        catalog.record(OutputKind::VerticalStress, 0, None, &axis, vec![10.0, 20.0], true);
        catalog.record(OutputKind::VerticalStress, 1, None, &axis, vec![12.0, 18.0], true);
        catalog.finalize();
        let series = catalog.series(OutputKind::VerticalStress, None).unwrap();

        let mut buf = Vec::new();
        write_series_csv(&mut buf, series, "Depth", &[]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert_eq!(header, "Depth,S-1,S-2,Mean,Stdev.");
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn disabled_rows_are_labeled() {
        let mut catalog = OutputCatalog::new();
        let axis = vec![0.0];
        catalog.record(OutputKind::VerticalStress, 0, None, &axis, vec![10.0], true);
        catalog.record(OutputKind::VerticalStress, 1, None, &axis, vec![1000.0], false);
        catalog.finalize();
        let series = catalog.series(OutputKind::VerticalStress, None).unwrap();

        let mut buf = Vec::new();
        write_series_csv(&mut buf, series, "Depth", &[]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().next().unwrap().contains("S-2 (disabled)"));
    }

    #[test]
    fn log_normal_series_uses_median_and_ln_stdev_labels() {
        let mut catalog = OutputCatalog::new();
        let axis = vec![0.0];
        catalog.record(OutputKind::MaxAccelProfile, 0, Some(0), &axis, vec![1.0], true);
        catalog.finalize();
        let series = catalog.series(OutputKind::MaxAccelProfile, Some(0)).unwrap();

        let mut buf = Vec::new();
        write_series_csv(&mut buf, series, "Depth", &["EQ1".to_string()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.contains("Median"));
        assert!(header.contains("ln Stdev."));
        assert!(header.contains("M-EQ1"));
    }
}
