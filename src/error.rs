//! Error types for synthesis and artifact I/O

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for library operations
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors raised while synthesizing, encoding or loading benchmark data
#[derive(Error, Debug)]
pub enum SynthError {
    /// A raw blob does not hold the element count its sidecar declares
    #[error("shape mismatch in {path}: found {actual} values, expected {expected}")]
    ShapeMismatch {
        path: PathBuf,
        actual: usize,
        expected: usize,
    },

    /// A raw float32 blob whose byte length is not a multiple of 4
    #[error("{path} is {len} bytes, not a whole number of float32 samples")]
    TruncatedBlob { path: PathBuf, len: u64 },

    /// An optional conversion backend was compiled out
    #[error("{component} support is not available: {hint}")]
    MissingDependency {
        component: &'static str,
        hint: &'static str,
    },

    /// A 16-bit trace header field cannot hold the value
    #[error("trace header field '{field}' cannot hold {value} (max {})", i16::MAX)]
    HeaderOverflow { field: &'static str, value: i64 },

    /// A synthesis parameter outside its valid domain
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("metadata error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "convert")]
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
