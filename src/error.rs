//! Custom error types for cyclestyle.

use std::path::PathBuf;
use thiserror::Error;

/// Opaque engine failure cause, so any inference backend can report through
/// the same variant.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for the cyclestyle library.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to save an image file.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Resize requested with a zero target dimension.
    #[error("invalid resize target {width}x{height}: dimensions must be positive")]
    InvalidDimension { width: u32, height: u32 },

    /// Tensor shape disagrees with a generator's declared shape.
    #[error("tensor shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// A generator's inference engine rejected or failed on a well-formed tensor.
    #[error("inference failed on generator {name}: {source}")]
    Inference {
        name: String,
        #[source]
        source: EngineError,
    },

    /// One or more generator handles failed to release during teardown.
    #[error("generator teardown failed: {}", failures.join("; "))]
    Release { failures: Vec<String> },

    /// Failed to download a model.
    #[error("failed to download model {name}: {source}")]
    ModelDownload {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    /// Failed to load an ONNX model.
    #[error("failed to load ONNX model {name}: {source}")]
    ModelLoad {
        name: String,
        #[source]
        source: ort::Error,
    },

    /// Failed to create cache directory.
    #[error("failed to create cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for cyclestyle operations.
pub type Result<T> = std::result::Result<T, Error>;
