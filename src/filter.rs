/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use crate::error::{invalid, Result};
use crate::signal::Signal;
use num_complex::Complex;
use std::f64::consts::PI;

/// Response type and cutoff frequencies (Hz) of a Butterworth filter
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterKind {
    LowPass { cutoff: f64 },
    HighPass { cutoff: f64 },
    BandPass { low: f64, high: f64 },
    BandStop { low: f64, high: f64 },
}

/// A Butterworth filter request: response type plus filter order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub order: usize,
}

impl FilterSpec {
    pub const DEFAULT_ORDER: usize = 5;

    pub fn lowpass(cutoff: f64) -> Self {
        Self::of(FilterKind::LowPass { cutoff })
    }

    pub fn highpass(cutoff: f64) -> Self {
        Self::of(FilterKind::HighPass { cutoff })
    }

    pub fn bandpass(low: f64, high: f64) -> Self {
        Self::of(FilterKind::BandPass { low, high })
    }

    pub fn bandstop(low: f64, high: f64) -> Self {
        Self::of(FilterKind::BandStop { low, high })
    }

    pub fn with_order(self, order: usize) -> Self {
        Self { order, ..self }
    }

    fn of(kind: FilterKind) -> Self {
        Self {
            kind,
            order: Self::DEFAULT_ORDER,
        }
    }

    /// Check order and cutoffs against the Nyquist frequency of `sample_rate`.
    pub fn validate(&self, sample_rate: u32) -> Result<()> {
        if self.order == 0 {
            return invalid("filter order must be positive");
        }
        let nyquist = sample_rate as f64 / 2.0;
        let check = |name: &str, freq: f64| {
            if freq > 0.0 && freq < nyquist {
                Ok(())
            } else {
                invalid(format!("{} cutoff {} Hz must lie in (0, {}) Hz", name, freq, nyquist))
            }
        };
        match self.kind {
            FilterKind::LowPass { cutoff } | FilterKind::HighPass { cutoff } => check("filter", cutoff),
            FilterKind::BandPass { low, high } | FilterKind::BandStop { low, high } => {
                check("low", low)?;
                check("high", high)?;
                if low >= high {
                    return invalid(format!("low cutoff {} Hz must be below high cutoff {} Hz", low, high));
                }
                Ok(())
            }
        }
    }

    pub fn label(&self) -> String {
        match self.kind {
            FilterKind::LowPass { cutoff } => format!("lowpass_{}hz", cutoff),
            FilterKind::HighPass { cutoff } => format!("highpass_{}hz", cutoff),
            FilterKind::BandPass { low, high } => format!("bandpass_{}-{}hz", low, high),
            FilterKind::BandStop { low, high } => format!("bandstop_{}-{}hz", low, high),
        }
    }
}

/// Rational transfer function H(z) = B(z^-1) / A(z^-1), highest order coefficient first.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferFunction {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

/// Zeros, poles and gain of a (analog or digital) filter.
struct Zpk {
    zeros: Vec<Complex<f64>>,
    poles: Vec<Complex<f64>>,
    gain: f64,
}

impl Zpk {
    /// Number of poles in excess of zeros.
    fn degree(&self) -> usize {
        self.poles.len() - self.zeros.len()
    }
}

fn product(values: impl Iterator<Item = Complex<f64>>) -> Complex<f64> {
    values.fold(Complex::new(1.0, 0.0), |acc, v| acc * v)
}

/// Analog Butterworth prototype with unit cutoff: poles evenly spread on the left half circle.
fn prototype(order: usize) -> Zpk {
    let n = order as f64;
    let poles = (0..order)
        .map(|k| {
            let m = -n + 1.0 + 2.0 * k as f64;
            -Complex::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect();
    Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    }
}

fn lp_to_lp(proto: Zpk, wo: f64) -> Zpk {
    let degree = proto.degree();
    Zpk {
        zeros: proto.zeros.iter().map(|&z| z * wo).collect(),
        poles: proto.poles.iter().map(|&p| p * wo).collect(),
        gain: proto.gain * wo.powi(degree as i32),
    }
}

fn lp_to_hp(proto: Zpk, wo: f64) -> Zpk {
    let degree = proto.degree();
    let gain = proto.gain * (product(proto.zeros.iter().map(|&z| -z)) / product(proto.poles.iter().map(|&p| -p))).re;
    let mut zeros: Vec<Complex<f64>> = proto.zeros.iter().map(|&z| wo / z).collect();
    zeros.extend(std::iter::repeat(Complex::new(0.0, 0.0)).take(degree));
    Zpk {
        zeros,
        poles: proto.poles.iter().map(|&p| wo / p).collect(),
        gain,
    }
}

/// Map each root r to the pair r ± sqrt(r² - wo²).
fn split_roots(roots: &[Complex<f64>], wo: f64) -> Vec<Complex<f64>> {
    let shift = |r: Complex<f64>| (r * r - wo * wo).sqrt();
    roots
        .iter()
        .map(|&r| r + shift(r))
        .chain(roots.iter().map(|&r| r - shift(r)))
        .collect()
}

fn lp_to_bp(proto: Zpk, wo: f64, bw: f64) -> Zpk {
    let degree = proto.degree();
    let zeros_lp: Vec<Complex<f64>> = proto.zeros.iter().map(|&z| z * bw / 2.0).collect();
    let poles_lp: Vec<Complex<f64>> = proto.poles.iter().map(|&p| p * bw / 2.0).collect();
    let mut zeros = split_roots(&zeros_lp, wo);
    zeros.extend(std::iter::repeat(Complex::new(0.0, 0.0)).take(degree));
    Zpk {
        zeros,
        poles: split_roots(&poles_lp, wo),
        gain: proto.gain * bw.powi(degree as i32),
    }
}

fn lp_to_bs(proto: Zpk, wo: f64, bw: f64) -> Zpk {
    let degree = proto.degree();
    let gain = proto.gain * (product(proto.zeros.iter().map(|&z| -z)) / product(proto.poles.iter().map(|&p| -p))).re;
    let zeros_hp: Vec<Complex<f64>> = proto.zeros.iter().map(|&z| (bw / 2.0) / z).collect();
    let poles_hp: Vec<Complex<f64>> = proto.poles.iter().map(|&p| (bw / 2.0) / p).collect();
    let mut zeros = split_roots(&zeros_hp, wo);
    zeros.extend(std::iter::repeat(Complex::new(0.0, wo)).take(degree));
    zeros.extend(std::iter::repeat(Complex::new(0.0, -wo)).take(degree));
    Zpk {
        zeros,
        poles: split_roots(&poles_hp, wo),
        gain,
    }
}

/// Bilinear transform with fs = 2 (frequencies are already normalized and pre-warped).
fn bilinear(analog: Zpk) -> Zpk {
    const FS2: f64 = 4.0;
    let degree = analog.degree();
    let gain = analog.gain
        * (product(analog.zeros.iter().map(|&z| FS2 - z)) / product(analog.poles.iter().map(|&p| FS2 - p))).re;
    let mut zeros: Vec<Complex<f64>> = analog.zeros.iter().map(|&z| (FS2 + z) / (FS2 - z)).collect();
    zeros.extend(std::iter::repeat(Complex::new(-1.0, 0.0)).take(degree));
    Zpk {
        zeros,
        poles: analog.poles.iter().map(|&p| (FS2 + p) / (FS2 - p)).collect(),
        gain,
    }
}

/// Coefficients of the monic polynomial with the given roots, highest power first.
fn poly(roots: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut coeffs = vec![Complex::new(1.0, 0.0)];
    for &r in roots {
        let mut next = coeffs.clone();
        next.push(Complex::new(0.0, 0.0));
        for i in 1..next.len() {
            next[i] -= r * coeffs[i - 1];
        }
        coeffs = next;
    }
    coeffs
}

/// Design a digital Butterworth filter for signals sampled at `sample_rate`.
///
/// Classic procedure: analog prototype, pre-warping of the cutoffs (normalized by Nyquist),
/// analog frequency transformation, bilinear transform, expansion into polynomials.
pub fn design_butterworth(spec: &FilterSpec, sample_rate: u32) -> Result<TransferFunction> {
    spec.validate(sample_rate)?;
    let nyquist = sample_rate as f64 / 2.0;
    let warp = |freq: f64| 4.0 * (PI * (freq / nyquist) / 2.0).tan();
    let band = |low: f64, high: f64| {
        let (w1, w2) = (warp(low), warp(high));
        ((w1 * w2).sqrt(), w2 - w1)
    };

    let proto = prototype(spec.order);
    let analog = match spec.kind {
        FilterKind::LowPass { cutoff } => lp_to_lp(proto, warp(cutoff)),
        FilterKind::HighPass { cutoff } => lp_to_hp(proto, warp(cutoff)),
        FilterKind::BandPass { low, high } => {
            let (wo, bw) = band(low, high);
            lp_to_bp(proto, wo, bw)
        }
        FilterKind::BandStop { low, high } => {
            let (wo, bw) = band(low, high);
            lp_to_bs(proto, wo, bw)
        }
    };
    let digital = bilinear(analog);

    Ok(TransferFunction {
        b: poly(&digital.zeros).iter().map(|c| c.re * digital.gain).collect(),
        a: poly(&digital.poles).iter().map(|c| c.re).collect(),
    })
}

/// Causal IIR filtering in direct form II transposed, zero initial state, single forward pass.
///
/// Fails with `InvalidParameter` if `b` is empty or `a` does not start with a non-zero coefficient.
pub fn lfilter(b: &[f64], a: &[f64], x: &[f64]) -> Result<Vec<f64>> {
    let a0 = match a.first() {
        Some(&a0) if a0 != 0.0 => a0,
        _ => return invalid("denominator must start with a non-zero coefficient"),
    };
    if b.is_empty() {
        return invalid("numerator must not be empty");
    }
    let n = b.len().max(a.len());
    let coeff = |c: &[f64], i: usize| c.get(i).copied().unwrap_or(0.0) / a0;
    let b: Vec<f64> = (0..n).map(|i| coeff(b, i)).collect();
    let a: Vec<f64> = (0..n).map(|i| coeff(a, i)).collect();

    let mut state = vec![0.0; n - 1];
    Ok(x.iter()
        .map(|&xi| {
            let y = b[0] * xi + state.first().copied().unwrap_or(0.0);
            for i in 0..n - 1 {
                let carried = state.get(i + 1).copied().unwrap_or(0.0);
                state[i] = b[i + 1] * xi + carried - a[i + 1] * y;
            }
            y
        })
        .collect())
}

/// Filter a signal through a Butterworth filter described by `spec`.
///
/// Fails with `InvalidParameter` if the order is zero, a cutoff is outside (0, Nyquist)
/// or a band's low cutoff is not below its high cutoff.
pub fn butterworth(signal: &Signal, spec: &FilterSpec) -> Result<Signal> {
    let tf = design_butterworth(spec, signal.sample_rate())?;
    Ok(signal.with_samples(lfilter(&tf.b, &tf.a, signal.samples())?))
}

/// Magnitude of the filter's frequency response at `freq` Hz.
pub fn frequency_response(tf: &TransferFunction, freq: f64, sample_rate: u32) -> f64 {
    let omega = 2.0 * PI * freq / sample_rate as f64;
    let eval = |coeffs: &[f64]| {
        coeffs
            .iter()
            .enumerate()
            .map(|(k, &c)| Complex::from_polar(c, -omega * k as f64))
            .sum::<Complex<f64>>()
    };
    let den = eval(&tf.a);
    if den.norm() == 0.0 {
        return f64::INFINITY;
    }
    (eval(&tf.b) / den).norm()
}
