/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use crate::error::{invalid, Result};
use rand::{distributions::Uniform, thread_rng, Rng};
use std::f64::consts::PI;

/// A mono sequence of samples (nominally in [-1.0, 1.0]) together with its sample rate.
///
/// A `Signal` always holds at least one sample and has a positive sample rate.
/// Transforms never mutate a `Signal`; they return a new one.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl Signal {
    /// Wrap `samples` recorded at `sample_rate` Hz.
    /// Fails if there are no samples or the rate is zero.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return invalid("signal must contain at least one sample");
        }
        if sample_rate == 0 {
            return invalid("sample rate must be positive");
        }
        Ok(Self { samples, sample_rate })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Sample instants t_n = n / sample_rate.
    pub fn times(&self) -> Vec<f64> {
        let sr = self.sample_rate as f64;
        (0..self.samples.len()).map(|n| n as f64 / sr).collect()
    }

    /// Build a new signal with the same rate from an equally long sample buffer.
    pub(crate) fn with_samples(&self, samples: Vec<f64>) -> Signal {
        debug_assert_eq!(samples.len(), self.samples.len());
        Signal {
            samples,
            sample_rate: self.sample_rate,
        }
    }

    /// Apply `f` to every sample, returning a new signal.
    pub fn map_samples<F: Fn(f64) -> f64>(&self, f: F) -> Signal {
        self.with_samples(self.samples.iter().map(|&s| f(s)).collect())
    }
}

/// Synthetic signal types
#[derive(Clone, Copy, Debug)]
pub enum SignalType {
    WhiteNoise,      // Uniform noise in [-1, 1)
    Sinusoidal(f64), // Pure tone (Hz)
    Siren(f64, f64), // Tone alternating between f1 and f2 every half second
    RandomTone(f64), // Tone jumping to a random frequency every given number of seconds
    Chirp(f64, f64), // Linear sweep from f1 to f2
    Chord(f64),      // Major triad on the given root
    Melody,          // Random major triads, changing every half second
}

/// Major triad sample at time `t`, scaled to stay within [-1, 1].
fn triad(root: f64, t: f64) -> f64 {
    let semitone = 2f64.powf(1.0 / 12.0);
    [0.0, 4.0, 7.0]
        .iter()
        .map(|&steps| (2.0 * PI * root * semitone.powf(steps) * t).sin())
        .sum::<f64>()
        / 3.0
}

/// Generates a sample vector of the given length and type.
pub fn generate_signal(len: usize, sig_type: SignalType, sample_rate: f64) -> Vec<f64> {
    let mut rng = thread_rng();
    let half_second = ((sample_rate * 0.5) as usize).max(1);
    let duration = len as f64 / sample_rate;
    match sig_type {
        SignalType::WhiteNoise => {
            let uniform = Uniform::from(-1.0..1.0);
            (0..len).map(|_| rng.sample(uniform)).collect()
        }
        SignalType::Sinusoidal(freq) => (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect(),
        SignalType::Siren(f1, f2) => (0..len)
            .map(|i| {
                let freq = if (i / half_second) % 2 == 0 { f1 } else { f2 };
                (2.0 * PI * freq * i as f64 / sample_rate).sin()
            })
            .collect(),
        SignalType::RandomTone(change_secs) => {
            let period = ((sample_rate * change_secs) as usize).max(1);
            let mut freq = 0.0;
            (0..len)
                .map(|i| {
                    if i % period == 0 {
                        freq = rng.gen_range(200.0..600.0);
                    }
                    (2.0 * PI * freq * i as f64 / sample_rate).sin()
                })
                .collect()
        }
        SignalType::Chirp(f1, f2) => {
            let k = (f2 - f1) / duration;
            (0..len)
                .map(|i| {
                    let t = i as f64 / sample_rate;
                    (2.0 * PI * (f1 * t + 0.5 * k * t * t)).sin()
                })
                .collect()
        }
        SignalType::Chord(root) => (0..len).map(|i| triad(root, i as f64 / sample_rate)).collect(),
        SignalType::Melody => {
            let mut root = 0.0;
            (0..len)
                .map(|i| {
                    if i % half_second == 0 {
                        root = rng.gen_range(200.0..600.0);
                    }
                    triad(root, i as f64 / sample_rate)
                })
                .collect()
        }
    }
}

/// Generates a `Signal` lasting `duration` seconds.
pub fn generate(sig_type: SignalType, duration: f64, sample_rate: u32) -> Result<Signal> {
    if !(duration > 0.0) {
        return invalid(format!("duration must be positive, got {}", duration));
    }
    let len = (duration * sample_rate as f64) as usize;
    Signal::new(generate_signal(len, sig_type, sample_rate as f64), sample_rate)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::DspError;

    #[test]
    fn test_signal_rejects_empty_and_zero_rate() {
        assert!(matches!(Signal::new(vec![], 8000), Err(DspError::InvalidParameter(_))));
        assert!(matches!(Signal::new(vec![0.0], 0), Err(DspError::InvalidParameter(_))));
    }

    #[test]
    fn test_signal_times_and_duration() {
        let sig = Signal::new(vec![0.0; 4], 4).unwrap();
        assert_eq!(sig.times(), vec![0.0, 0.25, 0.5, 0.75]);
        assert_eq!(sig.duration(), 1.0);
    }

    #[test]
    fn test_map_samples_leaves_input_untouched() {
        let sig = Signal::new(vec![0.5, -0.5], 8000).unwrap();
        let doubled = sig.map_samples(|s| s * 2.0);
        assert_eq!(doubled.samples(), &[1.0, -1.0]);
        assert_eq!(sig.samples(), &[0.5, -0.5]);
        assert_eq!(doubled.sample_rate(), 8000);
    }

    #[test]
    fn test_generators_stay_in_range() {
        for sig_type in [
            SignalType::WhiteNoise,
            SignalType::Sinusoidal(440.0),
            SignalType::Siren(300.0, 600.0),
            SignalType::RandomTone(0.1),
            SignalType::Chirp(200.0, 800.0),
            SignalType::Chord(440.0),
            SignalType::Melody,
        ] {
            let sig = generate_signal(8000, sig_type, 8000.0);
            assert_eq!(sig.len(), 8000);
            assert!(sig.iter().all(|s| s.abs() <= 1.0), "{:?} out of range", sig_type);
        }
    }

    #[test]
    fn test_generate_rejects_non_positive_duration() {
        assert!(generate(SignalType::Melody, 0.0, 8000).is_err());
        let sig = generate(SignalType::Sinusoidal(100.0), 0.5, 8000).unwrap();
        assert_eq!(sig.len(), 4000);
    }
}
