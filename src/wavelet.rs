/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use crate::error::{invalid, DspError, Result};
use crate::signal::Signal;
use crate::utils::median;
use std::fmt;
use std::str::FromStr;

/// Orthogonal wavelet families available to the denoiser
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Wavelet {
    Haar,
    Db2,
    #[default]
    Db4,
    Sym4,
}

impl Wavelet {
    /// Decomposition low-pass (scaling) filter.
    pub fn lowpass(&self) -> &'static [f64] {
        match self {
            Wavelet::Haar => &[std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2],
            Wavelet::Db2 => &[
                -0.129_409_522_551_260_37,
                0.224_143_868_042_013_4,
                0.836_516_303_737_807_9,
                0.482_962_913_144_534_16,
            ],
            Wavelet::Db4 => &[
                -0.010_597_401_784_997_278,
                0.032_883_011_666_982_945,
                0.030_841_381_835_986_965,
                -0.187_034_811_718_881_06,
                -0.027_983_769_416_983_849,
                0.630_880_767_929_590_4,
                0.714_846_570_552_541_6,
                0.230_377_813_308_855_14,
            ],
            Wavelet::Sym4 => &[
                -0.075_765_714_789_273_33,
                -0.029_635_527_645_954_48,
                0.497_618_667_632_563_04,
                0.803_738_751_805_916_2,
                0.297_857_795_605_605_2,
                -0.099_219_543_576_847_22,
                -0.012_603_967_262_037_833,
                0.032_223_100_604_071_27,
            ],
        }
    }

    /// Decomposition high-pass filter, g[n] = (-1)^n h[L-1-n].
    pub fn highpass(&self) -> Vec<f64> {
        let h = self.lowpass();
        let l = h.len();
        (0..l)
            .map(|n| if n % 2 == 0 { h[l - 1 - n] } else { -h[l - 1 - n] })
            .collect()
    }

    pub fn filter_len(&self) -> usize {
        self.lowpass().len()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Wavelet::Haar => "haar",
            Wavelet::Db2 => "db2",
            Wavelet::Db4 => "db4",
            Wavelet::Sym4 => "sym4",
        }
    }
}

impl fmt::Display for Wavelet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Wavelet {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "haar" | "db1" => Ok(Wavelet::Haar),
            "db2" => Ok(Wavelet::Db2),
            "db4" => Ok(Wavelet::Db4),
            "sym4" => Ok(Wavelet::Sym4),
            other => invalid(format!("unknown wavelet '{}'", other)),
        }
    }
}

/// Parameters of [`denoise`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveletConfig {
    pub wavelet: Wavelet,
    /// Divides the noise reference; larger values threshold less aggressively.
    pub threshold_factor: f64,
    /// Upper bound on decomposition depth, further clamped by [`max_level`].
    pub max_levels: usize,
}

impl Default for WaveletConfig {
    fn default() -> Self {
        Self {
            wavelet: Wavelet::Db4,
            threshold_factor: 1.0,
            max_levels: 10,
        }
    }
}

/// Deepest useful decomposition for a signal of `len` samples: floor(log2(len / (filter_len - 1))).
///
/// Returns 0 when not even one level fits.
pub fn max_level(len: usize, filter_len: usize) -> usize {
    if filter_len < 2 {
        return 0;
    }
    let support = filter_len - 1;
    let mut level = 0;
    while support << (level + 1) <= len {
        level += 1;
    }
    level
}

/// Multi-level wavelet coefficients, ordered `[approx_L, detail_L, ..., detail_1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Decomposition {
    pub bands: Vec<Vec<f64>>,
}

/// Extend `signal` by mirroring its tail until the length is a multiple of `block`.
fn pad_symmetric(signal: &[f64], block: usize) -> Vec<f64> {
    let n = signal.len();
    let target = n.div_ceil(block) * block;
    let mut padded = signal.to_vec();
    padded.extend((0..target - n).map(|i| signal[n - 1 - i % n]));
    padded
}

/// One analysis level: periodic convolution with h and g, downsampled by 2.
fn analysis_step(signal: &[f64], h: &[f64], g: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = signal.len() as isize;
    let half = signal.len() / 2;
    let mut approx = vec![0.0; half];
    let mut detail = vec![0.0; half];
    for k in 0..half {
        for j in 0..h.len() {
            let idx = (2 * k as isize - j as isize).rem_euclid(n) as usize;
            approx[k] += h[j] * signal[idx];
            detail[k] += g[j] * signal[idx];
        }
    }
    (approx, detail)
}

/// One synthesis level, the transpose of [`analysis_step`].
fn synthesis_step(approx: &[f64], detail: &[f64], h: &[f64], g: &[f64]) -> Vec<f64> {
    let n = 2 * approx.len();
    let mut out = vec![0.0; n];
    for k in 0..approx.len() {
        for j in 0..h.len() {
            let idx = (2 * k as isize - j as isize).rem_euclid(n as isize) as usize;
            out[idx] += h[j] * approx[k] + g[j] * detail[k];
        }
    }
    out
}

/// Periodic discrete wavelet transform over `levels` levels.
///
/// The input is first padded by symmetric mirroring to a multiple of `2^levels`, so
/// [`reconstruct`] returns that padded length.
pub fn decompose(signal: &[f64], wavelet: Wavelet, levels: usize) -> Decomposition {
    let h = wavelet.lowpass();
    let g = wavelet.highpass();

    let mut approx = if signal.is_empty() {
        Vec::new()
    } else {
        pad_symmetric(signal, 1 << levels)
    };
    let mut details = Vec::with_capacity(levels);
    for _ in 0..levels {
        let (a, d) = analysis_step(&approx, h, &g);
        details.push(d);
        approx = a;
    }

    let mut bands = Vec::with_capacity(levels + 1);
    bands.push(approx);
    bands.extend(details.into_iter().rev());
    Decomposition { bands }
}

/// Inverse of [`decompose`].
///
/// Fails with `InvalidParameter` if there are no bands or a detail band does not match the length
/// of the approximation it is combined with.
pub fn reconstruct(decomposition: &Decomposition, wavelet: Wavelet) -> Result<Vec<f64>> {
    let h = wavelet.lowpass();
    let g = wavelet.highpass();

    let Some((approx, details)) = decomposition.bands.split_first() else {
        return invalid("cannot reconstruct from an empty decomposition");
    };
    let mut current = approx.clone();
    for detail in details {
        if detail.len() != current.len() {
            return invalid(format!(
                "detail band of {} coefficients does not match approximation of {}",
                detail.len(),
                current.len()
            ));
        }
        current = synthesis_step(&current, detail, h, &g);
    }
    Ok(current)
}

/// sign(x) * max(|x| - t, 0)
pub fn soft_threshold(x: f64, threshold: f64) -> f64 {
    x.signum() * (x.abs() - threshold).max(0.0)
}

/// Wavelet shrinkage denoising.
///
/// The threshold is the median absolute coefficient of band `num_bands - 5` (band 0 when there are
/// fewer than five bands) divided by `threshold_factor`. Every band, the approximation included, is
/// soft-thresholded before reconstruction. The result has the input length and is clamped to
/// [-1, 1].
///
/// Fails with `InvalidParameter` for a non-positive `threshold_factor`, a zero `max_levels`, or a
/// signal shorter than `2 * (filter_len - 1)` samples.
pub fn denoise(signal: &Signal, config: &WaveletConfig) -> Result<Signal> {
    if !(config.threshold_factor > 0.0) {
        return invalid(format!("threshold factor must be positive, got {}", config.threshold_factor));
    }
    if config.max_levels == 0 {
        return invalid("at least one decomposition level is required");
    }
    let filter_len = config.wavelet.filter_len();
    let levels = config.max_levels.min(max_level(signal.len(), filter_len));
    if levels == 0 {
        return invalid(format!(
            "{} needs at least {} samples, signal has {}",
            config.wavelet,
            2 * (filter_len - 1),
            signal.len()
        ));
    }

    let mut decomposition = decompose(signal.samples(), config.wavelet, levels);

    let reference = decomposition.bands.len().saturating_sub(5);
    let magnitudes: Vec<f64> = decomposition.bands[reference].iter().map(|c| c.abs()).collect();
    let threshold = median(&magnitudes) / config.threshold_factor;

    for band in decomposition.bands.iter_mut() {
        band.iter_mut().for_each(|c| *c = soft_threshold(*c, threshold));
    }

    let mut out = reconstruct(&decomposition, config.wavelet)?;
    out.truncate(signal.len());
    out.iter_mut().for_each(|s| *s = s.clamp(-1.0, 1.0));
    Ok(signal.with_samples(out))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::signal::{generate_signal, SignalType};
    use crate::utils::{add_noise, mean_square_error};
    use crate::_EPSILON;
    use float_cmp::approx_eq;

    const ALL: [Wavelet; 4] = [Wavelet::Haar, Wavelet::Db2, Wavelet::Db4, Wavelet::Sym4];

    #[test]
    fn test_filters_are_orthonormal() {
        for wavelet in ALL {
            let h = wavelet.lowpass();
            let sum: f64 = h.iter().sum();
            let energy: f64 = h.iter().map(|c| c * c).sum();
            assert!(approx_eq!(f64, sum, 2f64.sqrt(), epsilon = 1e-9), "{}", wavelet);
            assert!(approx_eq!(f64, energy, 1.0, epsilon = 1e-9), "{}", wavelet);
            assert!(approx_eq!(f64, wavelet.highpass().iter().sum::<f64>(), 0.0, epsilon = 1e-9));
        }
    }

    #[test]
    fn test_max_level() {
        assert_eq!(max_level(1000, 8), 7);
        assert_eq!(max_level(14, 8), 1);
        assert_eq!(max_level(13, 8), 0);
        assert_eq!(max_level(16, 2), 4);
        assert_eq!(max_level(0, 2), 0);
    }

    #[test]
    fn test_perfect_reconstruction() {
        let x = generate_signal(1001, SignalType::WhiteNoise, 8000.0);
        for wavelet in ALL {
            let decomposition = decompose(&x, wavelet, 3);
            assert_eq!(decomposition.bands.len(), 4);
            assert_eq!(decomposition.bands[0].len(), 126);
            let y = reconstruct(&decomposition, wavelet).unwrap();
            assert_eq!(y.len(), 1008);
            for (a, b) in x.iter().zip(&y) {
                assert!(approx_eq!(f64, *a, *b, epsilon = 1e-9), "{}: {} vs {}", wavelet, a, b);
            }
        }
    }

    #[test]
    fn test_band_order_is_coarse_to_fine() {
        let x = generate_signal(64, SignalType::Sinusoidal(300.0), 8000.0);
        let decomposition = decompose(&x, Wavelet::Haar, 3);
        let lengths: Vec<usize> = decomposition.bands.iter().map(|b| b.len()).collect();
        assert_eq!(lengths, vec![8, 8, 16, 32]);
    }

    #[test]
    fn test_reconstruct_rejects_mismatched_bands() {
        let bad = Decomposition {
            bands: vec![vec![0.0; 4], vec![0.0; 3]],
        };
        assert!(reconstruct(&bad, Wavelet::Haar).is_err());
        assert!(reconstruct(&Decomposition { bands: vec![] }, Wavelet::Haar).is_err());
    }

    #[test]
    fn test_soft_threshold() {
        assert!(approx_eq!(f64, soft_threshold(0.5, 0.2), 0.3, epsilon = _EPSILON));
        assert!(approx_eq!(f64, soft_threshold(-0.5, 0.2), -0.3, epsilon = _EPSILON));
        assert_eq!(soft_threshold(0.1, 0.2), 0.0);
        assert_eq!(soft_threshold(-0.2, 0.2), 0.0);
    }

    #[test]
    fn test_denoise_keeps_length_and_range() {
        for len in [14, 100, 1001, 4097] {
            let x = generate_signal(len, SignalType::WhiteNoise, 8000.0);
            let sig = Signal::new(x, 8000).unwrap();
            let out = denoise(&sig, &WaveletConfig::default()).unwrap();
            assert_eq!(out.len(), len);
            assert_eq!(out.sample_rate(), 8000);
            assert!(out.samples().iter().all(|s| s.abs() <= 1.0));
        }
    }

    #[test]
    fn test_denoise_reduces_noise() {
        let clean = generate_signal(8192, SignalType::Sinusoidal(50.0), 8000.0);
        let noise = generate_signal(8192, SignalType::WhiteNoise, 8000.0);
        let noisy = add_noise(&clean, &noise, 0.3);
        let sig = Signal::new(noisy.clone(), 8000).unwrap();
        let out = denoise(&sig, &WaveletConfig::default()).unwrap();
        assert!(mean_square_error(&clean, out.samples()) < mean_square_error(&clean, &noisy));
    }

    /// Shrink every band by median(|bands[reference]|) / factor, then invert, trim and clamp.
    fn shrink_by_hand(x: &[f64], wavelet: Wavelet, levels: usize, factor: f64, reference: usize) -> Vec<f64> {
        let mut decomposition = decompose(x, wavelet, levels);
        let magnitudes: Vec<f64> = decomposition.bands[reference].iter().map(|c| c.abs()).collect();
        let threshold = median(&magnitudes) / factor;
        for band in decomposition.bands.iter_mut() {
            band.iter_mut().for_each(|c| *c = soft_threshold(*c, threshold));
        }
        let mut y = reconstruct(&decomposition, wavelet).unwrap();
        y.truncate(x.len());
        y.iter().map(|s| s.clamp(-1.0, 1.0)).collect()
    }

    fn assert_same(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!(approx_eq!(f64, *a, *e, epsilon = 1e-12), "{} vs {}", a, e);
        }
    }

    #[test]
    fn test_denoise_threshold_uses_fifth_band_from_the_end() {
        // 4096 Db4 samples allow 9 levels: 10 bands, reference band 5
        let x = generate_signal(4096, SignalType::WhiteNoise, 8000.0);
        assert_eq!(max_level(x.len(), 8), 9);
        let sig = Signal::new(x.clone(), 8000).unwrap();
        let out = denoise(&sig, &WaveletConfig::default()).unwrap();
        assert_same(out.samples(), &shrink_by_hand(&x, Wavelet::Db4, 9, 1.0, 5));

        // a neighbouring reference band gives a different result
        let other = shrink_by_hand(&x, Wavelet::Db4, 9, 1.0, 4);
        assert!(out.samples().iter().zip(&other).any(|(a, b)| (a - b).abs() > 1e-9));
    }

    #[test]
    fn test_denoise_threshold_falls_back_to_approximation_band() {
        let x: Vec<f64> = generate_signal(200, SignalType::Chirp(100.0, 1500.0), 8000.0)
            .iter()
            .map(|s| 0.8 * s)
            .collect();
        let sig = Signal::new(x.clone(), 8000).unwrap();
        let config = WaveletConfig {
            wavelet: Wavelet::Db2,
            threshold_factor: 2.0,
            max_levels: 2,
        };
        // 3 bands: the approximation is the reference, and the factor divides the threshold
        let out = denoise(&sig, &config).unwrap();
        assert_same(out.samples(), &shrink_by_hand(&x, Wavelet::Db2, 2, 2.0, 0));
    }

    #[test]
    fn test_denoise_rejects_bad_input() {
        let short = Signal::new(vec![0.1; 13], 8000).unwrap();
        assert!(matches!(
            denoise(&short, &WaveletConfig::default()),
            Err(DspError::InvalidParameter(_))
        ));

        let sig = Signal::new(vec![0.1; 100], 8000).unwrap();
        let zero_factor = WaveletConfig {
            threshold_factor: 0.0,
            ..WaveletConfig::default()
        };
        assert!(denoise(&sig, &zero_factor).is_err());
        let no_levels = WaveletConfig {
            max_levels: 0,
            ..WaveletConfig::default()
        };
        assert!(denoise(&sig, &no_levels).is_err());
    }

    #[test]
    fn test_wavelet_from_str() {
        assert_eq!("DB4".parse::<Wavelet>().unwrap(), Wavelet::Db4);
        assert_eq!("haar".parse::<Wavelet>().unwrap(), Wavelet::Haar);
        assert!("coif3".parse::<Wavelet>().is_err());
    }
}
