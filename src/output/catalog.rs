//! `OutputCatalog`: accumulates per-realization rows for every enabled
//! `OutputKind` and reduces them to mean/stdev statistics (spec.md §4.5).

use crate::output::kinds::OutputKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One realization's (optionally motion-indexed) row of values against the
/// series' shared reference axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputRow {
    pub realization_index: usize,
    pub motion_index: Option<usize>,
    pub enabled: bool,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputStatistics {
    pub mean: Vec<f64>,
    pub stdev: Vec<f64>,
    /// `mean * exp(+-stdev)` for log-normal series; `mean +- stdev` for
    /// linear series.
    pub lower_band: Vec<f64>,
    pub upper_band: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSeries {
    pub kind: OutputKind,
    pub reference_axis: Vec<f64>,
    pub rows: Vec<OutputRow>,
    pub statistics: Option<OutputStatistics>,
}

impl OutputSeries {
    fn new(kind: OutputKind, reference_axis: Vec<f64>) -> Self {
        Self { kind, reference_axis, rows: Vec::new(), statistics: None }
    }

    /// Reduces `rows` (excluding disabled ones) to per-abscissa statistics.
    /// Log-space reduction for log-normal kinds, per spec.md §4.5.
    fn finalize(&mut self) {
        let enabled_rows: Vec<&OutputRow> = self.rows.iter().filter(|r| r.enabled).collect();
        if enabled_rows.is_empty() {
            self.statistics = None;
            return;
        }
        let n = self.reference_axis.len();
        let mut mean = vec![0.0; n];
        let mut stdev = vec![0.0; n];
        let count = enabled_rows.len() as f64;
        let log_normal = self.kind.is_log_normal();

        for i in 0..n {
            let samples: Vec<f64> = enabled_rows
                .iter()
                .filter_map(|r| r.values.get(i).copied())
                .map(|v| if log_normal { v.max(1e-300).ln() } else { v })
                .collect();
            if samples.is_empty() {
                continue;
            }
            let m = samples.iter().sum::<f64>() / samples.len() as f64;
            let var = samples.iter().map(|v| (v - m).powi(2)).sum::<f64>() / samples.len().max(1) as f64;
            mean[i] = m;
            stdev[i] = var.sqrt();
        }
        let _ = count;

        let (lower, upper): (Vec<f64>, Vec<f64>) = if log_normal {
            let lo: Vec<f64> = mean.iter().zip(&stdev).map(|(m, s)| m.exp() * (-s).exp()).collect();
            let hi: Vec<f64> = mean.iter().zip(&stdev).map(|(m, s)| m.exp() * s.exp()).collect();
            mean = mean.iter().map(|m| m.exp()).collect();
            (lo, hi)
        } else {
            let lo: Vec<f64> = mean.iter().zip(&stdev).map(|(m, s)| m - s).collect();
            let hi: Vec<f64> = mean.iter().zip(&stdev).map(|(m, s)| m + s).collect();
            (lo, hi)
        };

        self.statistics = Some(OutputStatistics { mean, stdev, lower_band: lower, upper_band: upper });
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputCatalog {
    series: HashMap<String, OutputSeries>,
}

impl OutputCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(kind: OutputKind, motion_index: Option<usize>) -> String {
        match motion_index {
            Some(m) if kind.is_motion_dependent() => format!("{kind:?}/{m}"),
            _ => format!("{kind:?}"),
        }
    }

    /// Records a row of values for `kind` produced by realization
    /// `realization_index` (and, for motion-dependent kinds, `motion_index`).
    /// `reference_axis` is taken from the first call for a given key and
    /// assumed identical thereafter (every realization interpolates onto the
    /// catalog's canonical axis before calling this).
    pub fn record(
        &mut self,
        kind: OutputKind,
        realization_index: usize,
        motion_index: Option<usize>,
        reference_axis: &[f64],
        values: Vec<f64>,
        enabled: bool,
    ) {
        let key = Self::key(kind, motion_index);
        let series = self
            .series
            .entry(key)
            .or_insert_with(|| OutputSeries::new(kind, reference_axis.to_vec()));
        series.rows.push(OutputRow { realization_index, motion_index, enabled, values });
    }

    /// Computes statistics for every recorded series. Call once after all
    /// realizations have been processed.
    pub fn finalize(&mut self) {
        for series in self.series.values_mut() {
            series.finalize();
        }
    }

    pub fn series(&self, kind: OutputKind, motion_index: Option<usize>) -> Option<&OutputSeries> {
        self.series.get(&Self::key(kind, motion_index))
    }

    pub fn all_series(&self) -> impl Iterator<Item = &OutputSeries> {
        self.series.values()
    }
}

/// Piecewise-densified canonical depth axis (spec.md §4.5): increments of
/// 1/2/5/10/20 length units in bands `<20, <60, <160, <360, else`, always
/// starting at the surface and extending one point past `max_depth` so
/// values at the half-space are captured.
pub fn canonical_depth_axis(max_depth: f64) -> Vec<f64> {
    let mut depths = vec![0.0];
    while *depths.last().unwrap() < max_depth {
        let last = *depths.last().unwrap();
        let increment = if last < 20.0 {
            1.0
        } else if last < 60.0 {
            2.0
        } else if last < 160.0 {
            5.0
        } else if last < 360.0 {
            10.0
        } else {
            20.0
        };
        depths.push(last + increment);
    }
    depths
}

/// Interpolates a per-sublayer profile (`depths`/`values` at sublayer
/// midpoints or boundaries) onto `axis`, holding constant within each
/// source layer band when `constant_within_layer` is set, linearly
/// interpolating otherwise.
pub fn interp_profile_onto_axis(
    source_depths: &[f64],
    source_values: &[f64],
    axis: &[f64],
    constant_within_layer: bool,
) -> Vec<f64> {
    axis.iter()
        .map(|&d| {
            if source_depths.is_empty() {
                return 0.0;
            }
            if d <= source_depths[0] {
                return source_values[0];
            }
            if d >= *source_depths.last().unwrap() {
                return *source_values.last().unwrap();
            }
            let idx = source_depths.partition_point(|&sd| sd <= d);
            let idx = idx.min(source_depths.len() - 1).max(1);
            if constant_within_layer {
                source_values[idx - 1]
            } else {
                let (d0, d1) = (source_depths[idx - 1], source_depths[idx]);
                let (v0, v1) = (source_values[idx - 1], source_values[idx]);
                let t = if (d1 - d0).abs() > 1e-12 { (d - d0) / (d1 - d0) } else { 0.0 };
                v0 + t * (v1 - v0)
            }
        })
        .collect()
}
