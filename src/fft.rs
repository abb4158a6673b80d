//! FFT-based time-series utilities: padding, forward/inverse transform,
//! trapezoid-rule integration, and 4th-degree baseline correction.

use crate::error::{NumericsError, StrataError};
use num_complex::Complex64;
use rustfft::FftPlanner;

/// Smallest power of two ≥ `n`.
pub fn next_power_of_two(n: usize) -> usize {
    n.next_power_of_two().max(1)
}

/// Zero-pads `signal` to `next_power_of_two(signal.len())`.
pub fn zero_pad(signal: &[f64]) -> Vec<f64> {
    let padded_len = next_power_of_two(signal.len());
    let mut out = vec![0.0; padded_len];
    out[..signal.len()].copy_from_slice(signal);
    out
}

/// Forward real FFT returning only the non-negative-frequency bins
/// (`padded_len / 2 + 1` of them), matching `AbstractMotion`'s convention of
/// a Fourier spectrum defined for `f >= 0`.
pub fn forward_real_fft(padded: &[f64]) -> Vec<Complex64> {
    let n = padded.len();
    let mut buffer: Vec<Complex64> = padded.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);
    buffer.truncate(n / 2 + 1);
    buffer
}

/// Inverse FFT of a full-length (positive- and negative-frequency,
/// Hermitian-symmetric) complex spectrum, returning the real part
/// normalized by the output length, truncated to `out_len` samples.
pub fn inverse_fft_truncated(full_spectrum: &[Complex64], out_len: usize) -> Vec<f64> {
    let n = full_spectrum.len();
    let mut buffer = full_spectrum.to_vec();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_inverse(n);
    fft.process(&mut buffer);
    let scale = 1.0 / n as f64;
    buffer.iter().take(out_len).map(|c| c.re * scale).collect()
}

/// Reconstructs the full Hermitian-symmetric spectrum of length `n` from the
/// `n/2 + 1` non-negative-frequency bins produced by [`forward_real_fft`].
pub fn to_full_spectrum(half_spectrum: &[Complex64], n: usize) -> Vec<Complex64> {
    let mut full = vec![Complex64::new(0.0, 0.0); n];
    for (k, &v) in half_spectrum.iter().enumerate() {
        full[k] = v;
        if k != 0 && k != n / 2 {
            full[n - k] = v.conj();
        }
    }
    full
}

/// Filters a real time series by a (possibly complex) transfer function
/// sampled on the signal's positive-frequency FFT bins, returning the
/// filtered time series truncated back to the original length.
pub fn apply_transfer_function(signal: &[f64], tf: &[Complex64]) -> Vec<f64> {
    let padded = zero_pad(signal);
    let n = padded.len();
    let half = forward_real_fft(&padded);
    assert_eq!(half.len(), tf.len(), "transfer function length must match FFT bin count");
    let filtered_half: Vec<Complex64> = half.iter().zip(tf.iter()).map(|(&a, &b)| a * b).collect();
    let full = to_full_spectrum(&filtered_half, n);
    inverse_fft_truncated(&full, signal.len())
}

/// Trapezoid-rule numerical integration of a uniformly sampled series with
/// step `dt`; returns the running integral at every sample, starting at 0.
pub fn integrate(series: &[f64], dt: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(series.len());
    let mut acc = 0.0;
    out.push(acc);
    for i in 1..series.len() {
        acc += 0.5 * (series[i] + series[i - 1]) * dt;
        out.push(acc);
    }
    out
}

/// Trapezoid-rule integral of a function sampled on a (possibly non-uniform)
/// grid `x`, returning the scalar definite integral over the whole domain.
pub fn trapz(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len());
    let mut sum = 0.0;
    for i in 1..x.len() {
        sum += 0.5 * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
    }
    sum
}

/// Fits a degree-4 polynomial (basis `{d^2, d^3, d^4}`, no constant or
/// linear term per spec) to `displacement` by least squares and returns its
/// coefficients `[c2, c3, c4]`.
///
/// Spec mandates degree 4 explicitly (other trees in the source disagree
/// between 4 and 7).
pub fn fit_baseline(time: &[f64], displacement: &[f64]) -> Result<[f64; 3], StrataError> {
    // Normal equations for y = c2 t^2 + c3 t^3 + c4 t^4.
    let mut ata = [[0.0_f64; 3]; 3];
    let mut atb = [0.0_f64; 3];
    for (&t, &y) in time.iter().zip(displacement.iter()) {
        let basis = [t * t, t * t * t, t * t * t * t];
        for i in 0..3 {
            atb[i] += basis[i] * y;
            for j in 0..3 {
                ata[i][j] += basis[i] * basis[j];
            }
        }
    }
    solve_3x3(ata, atb).ok_or(StrataError::Numerics(NumericsError::NonInvertibleRegression))
}

fn solve_3x3(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    for col in 0..3 {
        let mut pivot_row = col;
        let mut pivot_val = a[col][col].abs();
        for row in (col + 1)..3 {
            if a[row][col].abs() > pivot_val {
                pivot_val = a[row][col].abs();
                pivot_row = row;
            }
        }
        if pivot_val < 1e-14 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        let pivot = a[col][col];
        for j in 0..3 {
            a[col][j] /= pivot;
        }
        b[col] /= pivot;

        for row in 0..3 {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            for j in 0..3 {
                a[row][j] -= factor * a[col][j];
            }
            b[row] -= factor * b[col];
        }
    }
    Some(b)
}

/// Evaluates the fitted baseline's second derivative
/// (`2 c2 + 6 c3 t + 12 c4 t^2`) at each `t`, used to correct the
/// acceleration series in-place.
pub fn baseline_second_derivative(coeffs: [f64; 3], time: &[f64]) -> Vec<f64> {
    time.iter().map(|&t| 2.0 * coeffs[0] + 6.0 * coeffs[1] * t + 12.0 * coeffs[2] * t * t).collect()
}

/// Full baseline correction pass: fits the displacement baseline, subtracts
/// its second derivative from the acceleration, and returns the corrected
/// acceleration series. The caller is responsible for re-integrating to get
/// corrected velocity/displacement.
pub fn baseline_correct(time: &[f64], acceleration: &[f64], dt: f64) -> Result<Vec<f64>, StrataError> {
    let velocity = integrate(acceleration, dt);
    let displacement = integrate(&velocity, dt);
    let coeffs = fit_baseline(time, &displacement)?;
    let correction = baseline_second_derivative(coeffs, time);
    Ok(acceleration.iter().zip(correction.iter()).map(|(&a, &c)| a - c).collect())
}
