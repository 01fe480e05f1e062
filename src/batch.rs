/* ==================================================================================================
 *                           This file is part of the bachelor thesis project
 *                  Implementation and Analysis of Selected Noise Reduction Methods
 *                                Weronika Tarnawska (Index No. 331171)
 *                                  Supervisor:  dr hab. Paweł Woźny
 *                                  University of Wrocław, June 2025
 * ================================================================================================== */
use sigkit::filter::FilterSpec;
use sigkit::session::Operation;
use sigkit::utils::{peak, rms, sig_to_noise_ratio_db};
use sigkit::wav::{decode, encode};
use sigkit::wavelet::WaveletConfig;
use sigkit::Signal;

use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::Instant;

use csv::Writer;
use log::{info, warn};

/// Every filter-bank operation and the denoiser, with the front end's default parameters
fn default_operations() -> Vec<Operation> {
    vec![
        Operation::Butterworth(FilterSpec::lowpass(1000.0)),
        Operation::Butterworth(FilterSpec::highpass(1000.0)),
        Operation::Butterworth(FilterSpec::bandpass(500.0, 2000.0)),
        Operation::Butterworth(FilterSpec::bandstop(500.0, 2000.0)),
        Operation::Equalize(1.5),
        Operation::Smooth(101),
        Operation::Reverb(2000),
        Operation::Compress(0.1),
        Operation::Denoise(WaveletConfig::default()),
    ]
}

/// Apply one operation, save its output and append a summary row
fn process_operation(
    stem: &str,
    input: &Signal,
    op: &Operation,
    workdir: &Path,
    csv_writer: &mut Writer<fs::File>,
) -> Result<(), Box<dyn Error>> {
    let label = op.label();
    let start = Instant::now();
    let output = match op.apply(input) {
        Ok(output) => output,
        Err(e) => {
            // e.g. a 500-2000 Hz band on a file sampled at 2 kHz
            warn!("Skipping {}: {}", label, e);
            csv_writer.write_record([label.as_str(), "", "", "", "", &format!("skipped: {}", e)])?;
            return Ok(());
        }
    };
    let duration_sec = start.elapsed().as_secs_f64();

    let out_path = workdir.join(format!("{}_{}.wav", stem, label));
    encode(&output, &out_path)?;

    let snr_db = sig_to_noise_ratio_db(input.samples(), output.samples());
    csv_writer.write_record(&[
        label.as_str(),
        &peak(output.samples()).to_string(),
        &rms(output.samples()).to_string(),
        &snr_db.to_string(),
        &duration_sec.to_string(),
        "ok",
    ])?;
    info!("{} done in {:.3}s -> {}", label, duration_sec, out_path.display());

    Ok(())
}

/// Run every default operation on `input`, writing result WAVs into `workdir` and a summary
/// (peak, RMS, SNR relative to the input, time, status) to `results`. An operation whose
/// parameters do not fit the input gets a `skipped` row carrying the error.
pub fn run(input: &Path, workdir: &Path, results: &Path) -> Result<(), Box<dyn Error>> {
    let signal = decode(input)?;
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("signal");
    fs::create_dir_all(workdir)?;

    let mut csv_writer = Writer::from_path(results)?;
    csv_writer.write_record(["operation", "peak", "rms", "snr_db", "time_sec", "status"])?;

    for op in default_operations() {
        process_operation(stem, &signal, &op, workdir, &mut csv_writer)?;
    }

    csv_writer.flush()?;
    println!(
        "All operations completed. Outputs in '{}', summary in '{}'.",
        workdir.display(),
        results.display()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use sigkit::signal::{generate, SignalType};
    use tempfile::tempdir;

    #[test]
    fn test_batch_writes_every_result() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("chord.wav");
        encode(&generate(SignalType::Chord(440.0), 0.5, 8000).unwrap(), &input).unwrap();
        let workdir = dir.path().join("work");
        let results = dir.path().join("results.csv");

        run(&input, &workdir, &results).unwrap();

        let mut reader = csv::Reader::from_path(&results).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), default_operations().len());
        assert!(rows.iter().all(|r| &r[5] == "ok"));
        for op in default_operations() {
            assert!(workdir.join(format!("chord_{}.wav", op.label())).exists());
        }
    }

    #[test]
    fn test_batch_skips_invalid_operations() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("low_rate.wav");
        // Nyquist of 1500 Hz rules out the 2000 Hz band edge
        encode(&generate(SignalType::Sinusoidal(200.0), 1.0, 3000).unwrap(), &input).unwrap();
        let results = dir.path().join("results.csv");

        run(&input, &dir.path().join("work"), &results).unwrap();

        let mut reader = csv::Reader::from_path(&results).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), default_operations().len());
        let skipped: Vec<&str> = rows
            .iter()
            .filter(|r| r[5].starts_with("skipped: invalid parameter"))
            .map(|r| &r[0])
            .collect();
        assert_eq!(skipped, vec!["bandpass_500-2000hz", "bandstop_500-2000hz"]);
        assert!(!dir.path().join("work").join("low_rate_bandpass_500-2000hz.wav").exists());
    }
}
