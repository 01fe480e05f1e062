/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use crate::effects::{compress, equalize, reverb, smooth};
use crate::error::{invalid, Result};
use crate::filter::{butterworth, FilterSpec};
use crate::signal::Signal;
use crate::wav;
use crate::wavelet::{denoise, WaveletConfig};
use log::{debug, info};
use std::path::Path;

/// One request to the filter bank or the wavelet denoiser.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operation {
    Butterworth(FilterSpec),
    Equalize(f64),      // gain factor
    Smooth(usize),      // Savitzky-Golay window length
    Reverb(usize),      // decay in samples
    Compress(f64),      // clipping threshold
    Denoise(WaveletConfig),
}

impl Operation {
    /// Run the operation on `signal`, returning a new signal.
    pub fn apply(&self, signal: &Signal) -> Result<Signal> {
        match self {
            Operation::Butterworth(spec) => butterworth(signal, spec),
            Operation::Equalize(factor) => equalize(signal, *factor),
            Operation::Smooth(window) => smooth(signal, *window),
            Operation::Reverb(decay) => reverb(signal, *decay),
            Operation::Compress(threshold) => compress(signal, *threshold),
            Operation::Denoise(config) => denoise(signal, config),
        }
    }

    /// Short identifier, usable in file names.
    pub fn label(&self) -> String {
        match self {
            Operation::Butterworth(spec) => spec.label(),
            Operation::Equalize(factor) => format!("equalize_x{}", factor),
            Operation::Smooth(window) => format!("smooth_w{}", window),
            Operation::Reverb(decay) => format!("reverb_d{}", decay),
            Operation::Compress(threshold) => format!("compress_t{}", threshold),
            Operation::Denoise(config) => format!("denoise_{}_f{}", config.wavelet, config.threshold_factor),
        }
    }
}

/// Which stored signal an operation reads from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Original,
    /// The last filtered signal, or the original if nothing has been applied yet.
    Latest,
}

/// The loaded signal and the result of the last operation.
///
/// Failed operations leave the session exactly as it was.
#[derive(Clone, Debug, Default)]
pub struct Session {
    original: Option<Signal>,
    filtered: Option<Signal>,
    last_operation: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session from an in-memory signal.
    pub fn with_signal(signal: Signal) -> Self {
        Self {
            original: Some(signal),
            ..Self::default()
        }
    }

    /// Decode a WAV file as the new original signal and drop any filtered result.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<&Signal> {
        let path = path.as_ref();
        let signal = wav::decode(path)?;
        info!(
            "Loaded {} ({} samples at {} Hz, {:.2} s)",
            path.display(),
            signal.len(),
            signal.sample_rate(),
            signal.duration()
        );
        self.filtered = None;
        self.last_operation = None;
        Ok(self.original.insert(signal))
    }

    pub fn original(&self) -> Option<&Signal> {
        self.original.as_ref()
    }

    pub fn filtered(&self) -> Option<&Signal> {
        self.filtered.as_ref()
    }

    /// Filtered signal if there is one, the original otherwise.
    pub fn latest(&self) -> Option<&Signal> {
        self.filtered.as_ref().or(self.original.as_ref())
    }

    pub fn last_operation(&self) -> Option<&str> {
        self.last_operation.as_deref()
    }

    /// Apply `op` to the chosen source signal and store the result as the filtered signal.
    pub fn apply(&mut self, op: &Operation, source: Source) -> Result<&Signal> {
        let input = match source {
            Source::Original => self.original.as_ref(),
            Source::Latest => self.latest(),
        };
        let Some(input) = input else {
            return invalid("no signal loaded");
        };

        let label = op.label();
        debug!("Applying {} to {:?} signal", label, source);
        let output = op.apply(input)?;
        info!("Applied {}", label);

        self.last_operation = Some(label);
        Ok(self.filtered.insert(output))
    }

    /// Encode the latest signal to `path`.
    pub fn save_filtered<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let Some(signal) = self.latest() else {
            return invalid("no signal loaded");
        };
        wav::encode(signal, path.as_ref())?;
        info!("Saved {} samples -> {}", signal.len(), path.as_ref().display());
        Ok(())
    }

    /// Forget the filtered signal, keeping the original.
    pub fn reset(&mut self) {
        self.filtered = None;
        self.last_operation = None;
    }
}
