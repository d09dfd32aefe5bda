//! Error types for the array encoder.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for encoder operations.
pub type EncodeResult<T> = Result<T, EncoderError>;

/// Errors that can occur while encoding or parsing a source array.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// The raw input could not be read.
    #[error("Failed to read raw input {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact could not be staged or persisted.
    #[error("Failed to write array artifact {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Array name is not a usable C identifier.
    #[error("Invalid array name '{name}': expected a C identifier ([A-Za-z_][A-Za-z0-9_]*)")]
    InvalidArrayName { name: String },

    /// Placement qualifier is not a usable C identifier.
    #[error("Invalid placement qualifier '{placement}': expected a C identifier")]
    InvalidPlacement { placement: String },

    /// Artifact text does not follow the array layout.
    #[error("Malformed array artifact at line {line}: {message}")]
    Malformed { line: usize, message: String },
}

impl EncoderError {
    /// Creates a new malformed-artifact error.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }

    /// Stable error code for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            EncoderError::ReadInput { .. } => "ENCODER_001",
            EncoderError::WriteOutput { .. } => "ENCODER_002",
            EncoderError::InvalidArrayName { .. } => "ENCODER_003",
            EncoderError::InvalidPlacement { .. } => "ENCODER_004",
            EncoderError::Malformed { .. } => "ENCODER_005",
        }
    }

    /// Error category for grouping related errors.
    pub fn category(&self) -> &'static str {
        "encoder"
    }
}
