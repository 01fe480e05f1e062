/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
//! CSV export of display series, for plotting with an external tool.
use crate::error::Result;
use crate::signal::Signal;
use crate::spectral::SpectralSeries;
use csv::Writer;
use std::path::Path;

/// Write `time,amplitude` rows, one per sample.
pub fn write_time_series<P: AsRef<Path>>(signal: &Signal, path: P) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["time", "amplitude"])?;
    for (t, s) in signal.times().iter().zip(signal.samples()) {
        writer.write_record(&[t.to_string(), s.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a spectral series.
///
/// Magnitude spectra become `frequency,magnitude` rows; complex-plane samples become
/// `point_re,point_im,value_re,value_im` rows.
pub fn write_spectral_series<P: AsRef<Path>>(series: &SpectralSeries, path: P) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    match series {
        SpectralSeries::Magnitude { frequencies, magnitudes } => {
            writer.write_record(["frequency", "magnitude"])?;
            for (f, m) in frequencies.iter().zip(magnitudes) {
                writer.write_record(&[f.to_string(), m.to_string()])?;
            }
        }
        SpectralSeries::ComplexPlane { points, values } => {
            writer.write_record(["point_re", "point_im", "value_re", "value_im"])?;
            for (p, v) in points.iter().zip(values) {
                writer.write_record(&[p.re.to_string(), p.im.to_string(), v.re.to_string(), v.im.to_string()])?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}
