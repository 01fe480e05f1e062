/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use thiserror::Error;

/// Errors returned by the signal processing core
#[derive(Error, Debug)]
pub enum DspError {
    /// The WAV file is missing, corrupt or has no frames.
    #[error("failed to decode '{path}': {reason}")]
    Decode { path: String, reason: String },

    /// The destination could not be created or written.
    #[error("failed to encode '{path}': {reason}")]
    Encode { path: String, reason: String },

    /// A filter or transform parameter lies outside its valid domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DspError>;

/// Shorthand for building an `InvalidParameter` error.
pub(crate) fn invalid<T>(msg: impl Into<String>) -> Result<T> {
    Err(DspError::InvalidParameter(msg.into()))
}
