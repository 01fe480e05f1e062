/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
pub mod error;
pub mod signal;
pub mod wav;
pub mod spectral;
pub mod filter;
pub mod effects;
pub mod wavelet;
pub mod utils;
pub mod session;
pub mod plot;

pub use error::{DspError, Result};
pub use signal::Signal;
pub use spectral::SpectralSeries;

#[cfg(test)]
const _EPSILON: f64 = 1e-12;
