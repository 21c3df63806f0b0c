//! Error types for the engraving pipeline.
//!
//! Every stage reports failures synchronously through [`EngraveError`].
//! Nothing is retried internally: the computation is deterministic, and a
//! failed write leaves the output invalid, so callers re-run from scratch.

use std::io;
use thiserror::Error;

/// Errors that can occur while building or emitting a toolpath.
#[derive(Error, Debug)]
pub enum EngraveError {
    /// The physical scale was zero, negative or not finite.
    #[error("Invalid scale: {0} (must be a positive, finite number)")]
    InvalidScale(f64),

    /// The source image has a zero dimension, or nothing left to engrave after cropping.
    #[error("Empty image: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// The vector input has no polylines or a polyline without vertices.
    #[error("Empty path: {0}")]
    EmptyPath(String),

    /// Writing or closing the output sink failed.
    #[error("I/O failure: {0}")]
    IoFailure(#[from] io::Error),

    /// The image loader could not decode the input file.
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    /// A parameter validation error occurred.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),
}

/// Errors related to engraving parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

impl ParameterError {
    /// Checks that `value` is finite and strictly positive.
    pub fn require_positive(name: &str, value: f64) -> ParameterResult<f64> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(ParameterError::OutOfRange {
                name: name.to_string(),
                value,
                min: 0.0,
                max: f64::INFINITY,
            })
        }
    }
}

/// Result type alias for engraving operations.
pub type EngraveResult<T> = Result<T, EngraveError>;

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;
