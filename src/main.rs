/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use clap::{arg, ArgMatches, Command};
use log::{info, warn};
use std::error::Error;
use std::path::Path;
use std::str::FromStr;

use sigkit::filter::FilterSpec;
use sigkit::plot::{write_spectral_series, write_time_series};
use sigkit::session::{Operation, Session, Source};
use sigkit::signal::{generate, SignalType};
use sigkit::spectral::{default_s_grid, fourier_magnitude, laplace_transform_sample, z_transform_sample};
use sigkit::utils::{add_noise, apply_variable_scaling};
use sigkit::wav::{decode, encode};
use sigkit::wavelet::{Wavelet, WaveletConfig};
use sigkit::Signal;

mod batch;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Subcommand that reads one WAV, applies an operation and writes the result.
fn filter_command(name: &'static str, about: &'static str, out_file: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(arg!(-i --"input" <FILE> "Input WAV").required(true))
        .arg(arg!(-o --"out-file" <FILE> "Output WAV path").default_value(out_file))
        .arg(arg!(-p --"plot" <CSV> "Also write the result as a time,amplitude CSV"))
}

/// Subcommand that reads one WAV and writes a spectral series CSV.
fn spectral_command(name: &'static str, about: &'static str, out_file: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(arg!(-i --"input" <FILE> "Input WAV").required(true))
        .arg(arg!(-o --"out-file" <CSV> "Output CSV path").default_value(out_file))
}

fn cli() -> Command {
    Command::new("sigkit")
        .version("0.1.0")
        .author("Weronika")
        .about("Audio signal analysis, filtering and wavelet denoising")
        .subcommand_required(true)
        .subcommand(
            Command::new("sig-gen")
                .about("Generate signal and save to WAV")
                .arg(arg!(-t --"type" <TYPE> "Signal type, e.g., white|sine,440.0|siren,300,600|randtone,0.5|chirp,200,800|chord,440.0|melody").required(true))
                .arg(arg!(-d --"duration" <DUR> "Duration in seconds").required(true))
                .arg(arg!(-r --"rate" <HZ> "Sample rate").default_value("44100"))
                .arg(arg!(-o --"out-file" <FILE> "Output WAV path").default_value("output.wav")),
        )
        .subcommand(
            Command::new("mix")
                .about("Mix clean and noise signals")
                .arg(arg!(-c --"clean" <FILE> "Path to clean WAV").required(true))
                .arg(arg!(-n --"noise" <FILE> "Path to noise WAV").required(true))
                .arg(arg!(-l --"noise-level" <VAL> "Noise level multiplier").default_value("1.0"))
                .arg(arg!(-v --"varying-noise" "Enable varying noise level"))
                .arg(arg!(-o --"out-file" <FILE> "Output WAV path").default_value("mixed.wav")),
        )
        .subcommand(spectral_command("fourier", "Magnitude spectrum (half spectrum)", "fourier.csv"))
        .subcommand(
            spectral_command("ztransform", "Z-transform sampled on the unit circle", "ztransform.csv")
                .arg(arg!(-n --"points" <N> "Number of unit-circle points").default_value("100")),
        )
        .subcommand(spectral_command("laplace", "Laplace transform sampled on the diagonal s-grid", "laplace.csv"))
        .subcommand(
            filter_command("lowpass", "Butterworth low-pass filter", "lowpass.wav")
                .arg(arg!(-c --"cutoff" <HZ> "Cutoff frequency").default_value("1000"))
                .arg(arg!(--"order" <N> "Filter order").default_value("5")),
        )
        .subcommand(
            filter_command("highpass", "Butterworth high-pass filter", "highpass.wav")
                .arg(arg!(-c --"cutoff" <HZ> "Cutoff frequency").default_value("1000"))
                .arg(arg!(--"order" <N> "Filter order").default_value("5")),
        )
        .subcommand(
            filter_command("bandpass", "Butterworth band-pass filter", "bandpass.wav")
                .arg(arg!(--"low" <HZ> "Lower edge").default_value("500"))
                .arg(arg!(--"high" <HZ> "Upper edge").default_value("2000"))
                .arg(arg!(--"order" <N> "Filter order").default_value("5")),
        )
        .subcommand(
            filter_command("bandstop", "Butterworth band-stop filter", "bandstop.wav")
                .arg(arg!(--"low" <HZ> "Lower edge").default_value("500"))
                .arg(arg!(--"high" <HZ> "Upper edge").default_value("2000"))
                .arg(arg!(--"order" <N> "Filter order").default_value("5")),
        )
        .subcommand(
            filter_command("equalize", "Scale amplitude by a constant gain", "equalize.wav")
                .arg(arg!(-g --"gain" <FACTOR> "Gain factor").default_value("1.5")),
        )
        .subcommand(
            filter_command("smooth", "Savitzky-Golay smoothing (polynomial order 2)", "smooth.wav")
                .arg(arg!(-w --"window" <N> "Odd window length").default_value("101")),
        )
        .subcommand(
            filter_command("reverb", "Boxcar convolution reverb", "reverb.wav")
                .arg(arg!(-d --"decay" <N> "Decay length in samples").default_value("2000")),
        )
        .subcommand(
            filter_command("compress", "Hard-clip to a threshold", "compress.wav")
                .arg(arg!(-t --"threshold" <T> "Clipping threshold").default_value("0.1")),
        )
        .subcommand(
            filter_command("denoise", "Wavelet soft-threshold denoising", "denoise.wav")
                .arg(arg!(-w --"wavelet" <NAME> "haar|db2|db4|sym4").default_value("db4"))
                .arg(arg!(-f --"factor" <F> "Threshold factor").default_value("1.0"))
                .arg(arg!(-l --"levels" <N> "Maximum decomposition levels").default_value("10")),
        )
        .subcommand(
            Command::new("batch")
                .about("Apply every filter with default parameters and summarize the results")
                .arg(arg!(-i --"input" <FILE> "Input WAV").required(true))
                .arg(arg!(-w --"workdir" <DIR> "Directory for the output WAV files").default_value("./workdir"))
                .arg(arg!(-r --"results" <CSV> "Summary CSV path").default_value("results.csv")),
        )
}

fn main() -> CliResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("sig-gen", m)) => handle_sig_gen(m),
        Some(("mix", m)) => handle_mix(m),
        Some(("fourier", m)) => handle_spectral(m, |sig| Ok(fourier_magnitude(sig))),
        Some(("ztransform", m)) => {
            let points: usize = value(m, "points")?;
            handle_spectral(m, |sig| Ok(z_transform_sample(sig, points)?))
        }
        Some(("laplace", m)) => handle_spectral(m, |sig| Ok(laplace_transform_sample(sig, &default_s_grid()))),
        Some((name @ ("lowpass" | "highpass" | "bandpass" | "bandstop"), m)) => {
            let spec = match name {
                "lowpass" => FilterSpec::lowpass(value(m, "cutoff")?),
                "highpass" => FilterSpec::highpass(value(m, "cutoff")?),
                "bandpass" => FilterSpec::bandpass(value(m, "low")?, value(m, "high")?),
                _ => FilterSpec::bandstop(value(m, "low")?, value(m, "high")?),
            };
            handle_operation(m, Operation::Butterworth(spec.with_order(value(m, "order")?)))
        }
        Some(("equalize", m)) => handle_operation(m, Operation::Equalize(value(m, "gain")?)),
        Some(("smooth", m)) => handle_operation(m, Operation::Smooth(value(m, "window")?)),
        Some(("reverb", m)) => handle_operation(m, Operation::Reverb(value(m, "decay")?)),
        Some(("compress", m)) => handle_operation(m, Operation::Compress(value(m, "threshold")?)),
        Some(("denoise", m)) => {
            let config = WaveletConfig {
                wavelet: value::<Wavelet>(m, "wavelet")?,
                threshold_factor: value(m, "factor")?,
                max_levels: value(m, "levels")?,
            };
            handle_operation(m, Operation::Denoise(config))
        }
        Some(("batch", m)) => batch::run(
            Path::new(text(m, "input")?),
            Path::new(text(m, "workdir")?),
            Path::new(text(m, "results")?),
        ),
        _ => Err("Unknown command. Use --help.".into()),
    }
}

/// Raw string value of argument `name`.
fn text<'a>(m: &'a ArgMatches, name: &str) -> CliResult<&'a str> {
    m.get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| format!("missing argument --{}", name).into())
}

/// Argument `name` parsed into `T`.
fn value<T>(m: &ArgMatches, name: &str) -> CliResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = text(m, name)?;
    raw.parse::<T>()
        .map_err(|e| format!("invalid value '{}' for --{}: {}", raw, name, e).into())
}

fn handle_operation(m: &ArgMatches, op: Operation) -> CliResult<()> {
    let out_path = text(m, "out-file")?;
    let mut session = Session::new();
    session.load(text(m, "input")?)?;
    let result = session.apply(&op, Source::Original)?;
    if let Some(plot_path) = m.get_one::<String>("plot") {
        write_time_series(result, plot_path)?;
        info!("Time series -> {}", plot_path);
    }
    session.save_filtered(out_path)?;
    println!("{} done -> {}", op.label(), out_path);
    Ok(())
}

fn handle_spectral<F>(m: &ArgMatches, transform: F) -> CliResult<()>
where
    F: Fn(&Signal) -> CliResult<sigkit::SpectralSeries>,
{
    let signal = decode(text(m, "input")?)?;
    let out_path = text(m, "out-file")?;
    let series = transform(&signal)?;
    write_spectral_series(&series, out_path)?;
    println!("{} points -> {}", series.len(), out_path);
    Ok(())
}

fn handle_sig_gen(m: &ArgMatches) -> CliResult<()> {
    let sig_type = text(m, "type")?;
    let duration: f64 = value(m, "duration")?;
    let rate: u32 = value(m, "rate")?;
    let out_file = text(m, "out-file")?;
    let sig = generate(parse_signal_type(sig_type)?, duration, rate)?;
    encode(&sig, out_file)?;
    println!("Generated {}-second {} -> {}", duration, sig_type, out_file);
    Ok(())
}

fn handle_mix(m: &ArgMatches) -> CliResult<()> {
    let clean_file = text(m, "clean")?;
    let noise_file = text(m, "noise")?;
    let noise_level: f64 = value(m, "noise-level")?;
    let out_file = text(m, "out-file")?;

    let clean = decode(clean_file)?;
    let noise = decode(noise_file)?;
    if clean.sample_rate() != noise.sample_rate() {
        warn!(
            "Sample rates differ ({} Hz vs {} Hz), keeping {} Hz",
            clean.sample_rate(),
            noise.sample_rate(),
            clean.sample_rate()
        );
    }
    let sig_len = clean.len().min(noise.len());
    let mut noise = noise.samples()[..sig_len].to_vec();
    if m.get_flag("varying-noise") {
        noise = apply_variable_scaling(&noise, clean.sample_rate() as usize);
    }

    let mixed = add_noise(&clean.samples()[..sig_len], &noise, noise_level);
    encode(&Signal::new(mixed, clean.sample_rate())?, out_file)?;
    println!("Mixed {} + {} * {} -> {}", clean_file, noise_file, noise_level, out_file);
    Ok(())
}

fn parse_signal_type(s: &str) -> CliResult<SignalType> {
    let s = s.to_lowercase();
    let params = |prefix: &str| -> CliResult<Vec<f64>> {
        s[prefix.len()..]
            .split(',')
            .map(|x| {
                x.trim()
                    .parse::<f64>()
                    .map_err(|e| -> Box<dyn Error> { format!("bad number '{}': {}", x, e).into() })
            })
            .collect()
    };
    let exactly = |values: Vec<f64>, n: usize| -> CliResult<Vec<f64>> {
        if values.len() == n {
            Ok(values)
        } else {
            Err(format!("expected {} parameter(s) in '{}'", n, s).into())
        }
    };
    let sig_type = if s == "white" {
        SignalType::WhiteNoise
    } else if s == "melody" {
        SignalType::Melody
    } else if s.starts_with("sine,") {
        SignalType::Sinusoidal(exactly(params("sine,")?, 1)?[0])
    } else if s.starts_with("siren,") {
        let p = exactly(params("siren,")?, 2)?;
        SignalType::Siren(p[0], p[1])
    } else if s.starts_with("randtone,") {
        SignalType::RandomTone(exactly(params("randtone,")?, 1)?[0])
    } else if s.starts_with("chirp,") {
        let p = exactly(params("chirp,")?, 2)?;
        SignalType::Chirp(p[0], p[1])
    } else if s.starts_with("chord,") {
        SignalType::Chord(exactly(params("chord,")?, 1)?[0])
    } else {
        return Err(format!("Unknown type: {}", s).into());
    };
    Ok(sig_type)
}
