/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use crate::error::{invalid, DspError, Result};
use crate::signal::Signal;
use nalgebra::{DMatrix, DVector};

/// Polynomial order used by [`smooth`].
pub const SMOOTH_POLY_ORDER: usize = 2;

/// Multiply every sample by a positive gain. No clipping is applied.
pub fn equalize(signal: &Signal, factor: f64) -> Result<Signal> {
    if !(factor > 0.0) {
        return invalid(format!("gain factor must be positive, got {}", factor));
    }
    Ok(signal.map_samples(|s| s * factor))
}

/// Pseudo-inverse of the Vandermonde matrix of `positions` up to `order`.
///
/// Row `j` of the result maps a window of samples to the `j`-th coefficient of the least-squares
/// polynomial through them.
fn polyfit_operator(positions: &[f64], order: usize) -> Result<DMatrix<f64>> {
    let vandermonde = DMatrix::from_fn(positions.len(), order + 1, |i, j| positions[i].powi(j as i32));
    vandermonde
        .pseudo_inverse(1e-12)
        .map_err(|e| DspError::InvalidParameter(format!("polynomial fit failed: {}", e)))
}

fn polyval(coeffs: &DVector<f64>, t: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
}

/// Savitzky-Golay smoothing with a second order polynomial.
///
/// Interior samples are the centre value of the least-squares parabola through the surrounding
/// `window_length` samples. The first and last `window_length / 2` samples are read off the
/// parabola fitted to the first and last full window.
///
/// Fails with `InvalidParameter` if `window_length` is even, not above the polynomial order, or
/// longer than the signal.
pub fn smooth(signal: &Signal, window_length: usize) -> Result<Signal> {
    if window_length % 2 == 0 {
        return invalid(format!("smoothing window must be odd, got {}", window_length));
    }
    if window_length <= SMOOTH_POLY_ORDER {
        return invalid(format!(
            "smoothing window {} must exceed the polynomial order {}",
            window_length, SMOOTH_POLY_ORDER
        ));
    }
    if window_length > signal.len() {
        return invalid(format!(
            "smoothing window {} is longer than the signal ({} samples)",
            window_length,
            signal.len()
        ));
    }

    let x = signal.samples();
    let n = x.len();
    let half = window_length / 2;

    let centred: Vec<f64> = (0..window_length).map(|i| i as f64 - half as f64).collect();
    let weights: Vec<f64> = polyfit_operator(&centred, SMOOTH_POLY_ORDER)?.row(0).iter().copied().collect();

    let mut out: Vec<f64> = vec![0.0; n];
    for (i, y) in out.iter_mut().enumerate().take(n - half).skip(half) {
        *y = x[i - half..=i + half].iter().zip(&weights).map(|(s, w)| s * w).sum();
    }

    // Edges: evaluate the parabola fitted to the outermost windows
    let positions: Vec<f64> = (0..window_length).map(|i| i as f64).collect();
    let edge_fit = polyfit_operator(&positions, SMOOTH_POLY_ORDER)?;
    let head = &edge_fit * DVector::from_column_slice(&x[..window_length]);
    let tail = &edge_fit * DVector::from_column_slice(&x[n - window_length..]);
    for i in 0..half {
        out[i] = polyval(&head, i as f64);
        out[n - half + i] = polyval(&tail, (window_length - half + i) as f64);
    }

    Ok(signal.with_samples(out))
}

/// Convolve with a boxcar of `decay_samples` taps of weight `1 / decay_samples`, keeping the
/// first `len` samples of the full convolution.
pub fn reverb(signal: &Signal, decay_samples: usize) -> Result<Signal> {
    if decay_samples == 0 {
        return invalid("reverb decay must be at least one sample");
    }
    let x = signal.samples();
    let weight = 1.0 / decay_samples as f64;
    let mut running = 0.0;
    let out = (0..x.len())
        .map(|n| {
            running += x[n];
            if n >= decay_samples {
                running -= x[n - decay_samples];
            }
            running * weight
        })
        .collect();
    Ok(signal.with_samples(out))
}

/// Hard-clip every sample to [-threshold, threshold].
pub fn compress(signal: &Signal, threshold: f64) -> Result<Signal> {
    if !(threshold > 0.0) {
        return invalid(format!("compression threshold must be positive, got {}", threshold));
    }
    Ok(signal.map_samples(|s| s.clamp(-threshold, threshold)))
}
