/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use crate::error::{DspError, Result};
use crate::signal::Signal;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

const SAMPLE_MAX: f64 = 32767.0;

fn decode_error(path: &Path, reason: impl ToString) -> DspError {
    DspError::Decode {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn encode_error(path: &Path, reason: impl ToString) -> DspError {
    DspError::Encode {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Reads a PCM (8 to 32-bit integer) or 32-bit float WAV file into a mono `Signal`.
///
/// Only channel 0 of a multi-channel file is kept. Integer samples are divided by the largest
/// positive code of their bit depth (32767 for 16-bit) and clamped to [-1.0, 1.0], which is the
/// exact inverse of [`encode`]. Float samples are taken as they are.
///
/// Fails with [`DspError::Decode`] if the file cannot be opened, is not a RIFF/WAV file,
/// holds unreadable samples or has no frames.
pub fn decode<P: AsRef<Path>>(path: P) -> Result<Signal> {
    let path = path.as_ref();
    let reader = WavReader::open(path).map_err(|e| decode_error(path, e))?;
    let spec = reader.spec();

    if reader.duration() == 0 {
        return Err(decode_error(path, "file contains no frames"));
    }
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .step_by(channels)
            .map(|s| s.map(|v| v as f64))
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|e| decode_error(path, e))?,
        SampleFormat::Int => {
            let full_scale = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f64;
            reader
                .into_samples::<i32>()
                .step_by(channels)
                .map(|s| s.map(|v| (v as f64 / full_scale).clamp(-1.0, 1.0)))
                .collect::<std::result::Result<Vec<f64>, _>>()
                .map_err(|e| decode_error(path, e))?
        }
    };

    Signal::new(samples, spec.sample_rate).map_err(|e| decode_error(path, e))
}

/// Writes a signal to a mono 16-bit PCM WAV file at the signal's sample rate.
///
/// Samples are scaled by 32767 and rounded; anything beyond [-1.0, 1.0] saturates.
/// Fails with [`DspError::Encode`] if the destination cannot be created or written.
pub fn encode<P: AsRef<Path>>(signal: &Signal, path: P) -> Result<()> {
    let path = path.as_ref();
    let spec = WavSpec {
        channels: 1,
        sample_rate: signal.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).map_err(|e| encode_error(path, e))?;

    for &s in signal.samples() {
        // `as` saturates out-of-range floats
        writer
            .write_sample((s * SAMPLE_MAX).round() as i16)
            .map_err(|e| encode_error(path, e))?;
    }

    writer.finalize().map_err(|e| encode_error(path, e))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::signal::{generate_signal, SignalType};
    use tempfile::tempdir;

    #[test]
    fn test_encode_decode_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples = generate_signal(8000, SignalType::Chirp(100.0, 3000.0), 8000.0);
        let original = Signal::new(samples, 8000).unwrap();

        encode(&original, &path).unwrap();
        let decoded = decode(&path).unwrap();

        assert_eq!(decoded.sample_rate(), 8000);
        assert_eq!(decoded.len(), original.len());
        for (a, b) in original.samples().iter().zip(decoded.samples()) {
            assert!((a - b).abs() <= 1.0 / SAMPLE_MAX, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_encode_saturates_out_of_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("loud.wav");
        let loud = Signal::new(vec![2.5, -3.0, 0.0], 44100).unwrap();
        encode(&loud, &path).unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        let raw: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(raw, vec![i16::MAX, i16::MIN, 0]);

        let decoded = decode(&path).unwrap();
        assert_eq!(decoded.samples(), &[1.0, -1.0, 0.0]);
    }

    #[test]
    fn test_decode_keeps_first_channel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for (l, r) in [(32767i16, -32767i16), (0, 100), (-32767, 32767)] {
            writer.write_sample(l).unwrap();
            writer.write_sample(r).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = decode(&path).unwrap();
        assert_eq!(decoded.sample_rate(), 22050);
        assert_eq!(decoded.samples(), &[1.0, 0.0, -1.0]);
    }

    fn int_spec(bits_per_sample: u16) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample,
            sample_format: SampleFormat::Int,
        }
    }

    #[test]
    fn test_decode_scales_by_bit_depth() {
        let dir = tempdir().unwrap();

        // 8-bit full scale is 127; -128 clamps to -1.0
        let path8 = dir.path().join("eight.wav");
        let mut writer = WavWriter::create(&path8, int_spec(8)).unwrap();
        for s in [127i8, -127, 0, -128, 64] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        let decoded = decode(&path8).unwrap();
        assert_eq!(&decoded.samples()[..4], &[1.0, -1.0, 0.0, -1.0]);
        assert!((decoded.samples()[4] - 64.0 / 127.0).abs() < 1e-12);

        // 24-bit full scale is 2^23 - 1
        let path24 = dir.path().join("twentyfour.wav");
        let mut writer = WavWriter::create(&path24, int_spec(24)).unwrap();
        for s in [8_388_607i32, -8_388_607, -8_388_608, 4_194_304] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        let decoded = decode(&path24).unwrap();
        assert_eq!(&decoded.samples()[..3], &[1.0, -1.0, -1.0]);
        assert!((decoded.samples()[3] - 4_194_304.0 / 8_388_607.0).abs() < 1e-12);
    }

    #[test]
    fn test_decode_float_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for s in [0.25f32, -0.5, 0.75] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = decode(&path).unwrap();
        assert_eq!(decoded.samples(), &[0.25, -0.5, 0.75]);
    }

    #[test]
    fn test_decode_errors() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("missing.wav");
        assert!(matches!(decode(&missing), Err(DspError::Decode { .. })));

        let garbage = dir.path().join("garbage.wav");
        std::fs::write(&garbage, b"definitely not a riff header").unwrap();
        assert!(matches!(decode(&garbage), Err(DspError::Decode { .. })));

        let empty = dir.path().join("empty.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        WavWriter::create(&empty, spec).unwrap().finalize().unwrap();
        assert!(matches!(decode(&empty), Err(DspError::Decode { .. })));
    }

    #[test]
    fn test_encode_unwritable_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("out.wav");
        let sig = Signal::new(vec![0.0; 10], 8000).unwrap();
        assert!(matches!(encode(&sig, &path), Err(DspError::Encode { .. })));
    }
}
