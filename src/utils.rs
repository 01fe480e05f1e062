/* ==================================================================================================
 *                           This file is part of the bachelor thesis project
 *                  Implementation and Analysis of Selected Noise Reduction Methods
 *                                Weronika Tarnawska (Index No. 331171)
 *                                  Supervisor:  dr hab. Paweł Woźny
 *                                  University of Wrocław, June 2025
 * ================================================================================================== */
use rand::Rng;

/// Mix clean signal with noise, scaling noise by `noise_level`.
pub fn add_noise(signal: &[f64], noise: &[f64], noise_level: f64) -> Vec<f64> {
    signal
        .iter()
        .zip(noise.iter())
        .map(|(s, n)| s + n * noise_level)
        .collect()
}

/// Apply variable scaling to the input signal: every `chunk_size` samples,
/// draw a random scaling factor in [0.0, 1.0) and multiply the next chunk by it.
pub fn apply_variable_scaling(signal: &[f64], chunk_size: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    signal
        .chunks(chunk_size.max(1))
        .flat_map(|chunk| {
            let scale: f64 = rng.gen_range(0.0..1.0);
            chunk.iter().map(move |&s| s * scale).collect::<Vec<_>>()
        })
        .collect()
}

/// Computes the mean squared error (MSE) between two signals.
pub fn mean_square_error(signal1: &[f64], signal2: &[f64]) -> f64 {
    signal1
        .iter()
        .zip(signal2.iter())
        .map(|(s1, s2)| (s1 - s2) * (s1 - s2))
        .sum::<f64>()
        / signal1.len() as f64
}

/// Compute the linear signal-to-noise ratio between a clean reference and a processed signal.
/// SNR = P_clean / P_noise, where noise = clean - processed.
///
/// If input slices have different lengths, both are cut to the length of the shorter one.
pub fn sig_to_noise_ratio(clean: &[f64], processed: &[f64]) -> f64 {
    let len = clean.len().min(processed.len());
    let (clean, processed) = (&clean[..len], &processed[..len]);

    let pow_signal = clean.iter().map(|&x| x * x).sum::<f64>();
    let pow_error = clean
        .iter()
        .zip(processed.iter())
        .map(|(&d, &pd)| (d - pd).powi(2))
        .sum::<f64>();
    if pow_error == 0.0 {
        return f64::INFINITY;
    }
    pow_signal / pow_error
}

/// Compute the SNR in decibels: 10 * log10(linear SNR).
pub fn sig_to_noise_ratio_db(clean: &[f64], processed: &[f64]) -> f64 {
    10.0 * sig_to_noise_ratio(clean, processed).log10()
}

/// Largest absolute sample value, 0.0 for an empty slice.
pub fn peak(signal: &[f64]) -> f64 {
    signal.iter().fold(0.0, |acc: f64, &s| acc.max(s.abs()))
}

/// Root mean square of the samples, 0.0 for an empty slice.
pub fn rms(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|s| s * s).sum::<f64>() / signal.len() as f64).sqrt()
}

/// Median of the values (mean of the two middle ones for even lengths), 0.0 for an empty slice.
/// NaN values sort last.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::_EPSILON;
    use float_cmp::approx_eq;

    #[test]
    fn test_snr_of_identical_signals_is_infinite() {
        let x = vec![0.1, -0.2, 0.3];
        assert_eq!(sig_to_noise_ratio(&x, &x), f64::INFINITY);
    }

    #[test]
    fn test_snr_in_decibels() {
        let clean = vec![1.0, -1.0, 1.0, -1.0];
        let processed = vec![1.5, -0.5, 1.5, -0.5];
        // error power is a quarter of the signal power
        assert!(approx_eq!(f64, sig_to_noise_ratio(&clean, &processed), 4.0, epsilon = _EPSILON));
        assert!(approx_eq!(
            f64,
            sig_to_noise_ratio_db(&clean, &processed),
            10.0 * 4f64.log10(),
            epsilon = 1e-9
        ));
        // lengths are cut to the shorter input
        assert!(approx_eq!(f64, sig_to_noise_ratio(&clean, &processed[..2]), 4.0, epsilon = _EPSILON));
    }

    #[test]
    fn test_variable_scaling_bounds() {
        let x = vec![1.0; 1000];
        let scaled = apply_variable_scaling(&x, 100);
        assert_eq!(scaled.len(), 1000);
        assert!(scaled.iter().all(|&s| (0.0..1.0).contains(&s)));
        // one factor per chunk
        assert!(scaled[..100].iter().all(|&s| s == scaled[0]));
    }

    #[test]
    fn test_peak_rms_median() {
        let x = vec![0.5, -2.0, 1.0, 0.0];
        assert_eq!(peak(&x), 2.0);
        assert!(approx_eq!(f64, rms(&x), (5.25f64 / 4.0).sqrt(), epsilon = _EPSILON));
        assert_eq!(median(&x), 0.25);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(rms(&[]), 0.0);
        assert!(approx_eq!(f64, mean_square_error(&[1.0, 2.0], &[0.0, 0.0]), 2.5, epsilon = _EPSILON));
    }
}
