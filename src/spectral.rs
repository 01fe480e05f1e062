/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use crate::error::{invalid, Result};
use crate::signal::Signal;
use num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// Number of unit-circle points sampled by default for the Z-transform view.
pub const DEFAULT_Z_POINTS: usize = 100;

/// Display-ready output of a spectral transform.
#[derive(Clone, Debug, PartialEq)]
pub enum SpectralSeries {
    /// Half spectrum: frequency (Hz) of each bin and its magnitude.
    Magnitude {
        frequencies: Vec<f64>,
        magnitudes: Vec<f64>,
    },
    /// Sampled complex coordinates (z or s) and the transform value at each of them.
    ComplexPlane {
        points: Vec<Complex<f64>>,
        values: Vec<Complex<f64>>,
    },
}

impl SpectralSeries {
    pub fn len(&self) -> usize {
        match self {
            SpectralSeries::Magnitude { frequencies, .. } => frequencies.len(),
            SpectralSeries::ComplexPlane { points, .. } => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compute the magnitude spectrum of the whole signal.
///
/// Only the first `floor(N / 2)` bins are returned, bin `k` sitting at `k * sample_rate / N` Hz.
pub fn fourier_magnitude(signal: &Signal) -> SpectralSeries {
    let n = signal.len();
    let mut buffer: Vec<Complex<f64>> = signal.samples().iter().map(|&x| Complex::new(x, 0.0)).collect();
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(n).process(&mut buffer);

    let bin_width = signal.sample_rate() as f64 / n as f64;
    let half = n / 2;
    SpectralSeries::Magnitude {
        frequencies: (0..half).map(|k| k as f64 * bin_width).collect(),
        magnitudes: buffer[..half].iter().map(|c| c.norm()).collect(),
    }
}

/// Evaluate X(z) = sum_n x[n] z^(-n) at `n_points` equally spaced points of the unit circle,
/// z_k = e^(2 pi i k / N), by direct summation.
pub fn z_transform_sample(signal: &Signal, n_points: usize) -> Result<SpectralSeries> {
    if n_points == 0 {
        return invalid("Z-transform needs at least one sample point");
    }
    let points: Vec<Complex<f64>> = (0..n_points)
        .map(|k| Complex::from_polar(1.0, 2.0 * PI * k as f64 / n_points as f64))
        .collect();
    let values = points
        .iter()
        .map(|&z| {
            let z_inv = z.inv();
            let mut power = Complex::new(1.0, 0.0);
            let mut sum = Complex::new(0.0, 0.0);
            for &x in signal.samples() {
                sum += power * x;
                power *= z_inv;
            }
            sum
        })
        .collect();
    Ok(SpectralSeries::ComplexPlane { points, values })
}

/// Numerically evaluate the Laplace transform X(s) = sum_n x[n] e^(-s t_n) dt at every `s`.
///
/// Uses the rectangle rule over t_n = n / sample_rate with dt = 1 / sample_rate.
pub fn laplace_transform_sample(signal: &Signal, s_values: &[Complex<f64>]) -> SpectralSeries {
    let times = signal.times();
    let dt = 1.0 / signal.sample_rate() as f64;
    let values = s_values
        .iter()
        .map(|&s| {
            signal
                .samples()
                .iter()
                .zip(times.iter())
                .map(|(&x, &t)| (-s * t).exp() * x)
                .sum::<Complex<f64>>()
                * dt
        })
        .collect();
    SpectralSeries::ComplexPlane {
        points: s_values.to_vec(),
        values,
    }
}

/// `n` evenly spaced values from `start` to `end`, both inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// The s-plane samples used by the Laplace view: re and im both run over [-10, 10] in 100 steps
/// and are paired elementwise, giving a diagonal line rather than a full grid.
pub fn default_s_grid() -> Vec<Complex<f64>> {
    let axis = linspace(-10.0, 10.0, 100);
    axis.iter().map(|&v| Complex::new(v, v)).collect()
}
