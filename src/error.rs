//! Error handling for Clipforge
//!
//! Clipping/saturation is deliberately NOT an error anywhere in the engine:
//! out-of-range arithmetic saturates to the buffer's sample range. Errors are
//! reserved for bad parameters and I/O.

use thiserror::Error;

/// Result type alias for Clipforge operations
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Main error type for Clipforge operations
#[derive(Error, Debug)]
pub enum ForgeError {
    /// A transform was given a parameter outside its legal range.
    /// The source buffer is left unmodified.
    #[error("Invalid parameter {param}: {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    /// A decoded file reported a near-zero duration. Callers are expected
    /// to substitute a default buffer rather than propagate this upward.
    #[error("Load failed for {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ForgeError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ForgeError::InvalidParameter { .. } => "INVALID_PARAMETER",
            ForgeError::LoadFailed { .. } => "LOAD_FAILED",
            ForgeError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ForgeError::InvalidAudio { .. } => "INVALID_AUDIO",
            ForgeError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            ForgeError::Io(_) => "IO_ERROR",
            ForgeError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable without caller intervention
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ForgeError::LoadFailed { .. }
                | ForgeError::FileNotFound { .. }
                | ForgeError::InvalidAudio { .. }
        )
    }
}
