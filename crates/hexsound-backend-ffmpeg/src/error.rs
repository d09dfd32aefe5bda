//! Error types for the decoder backend.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for decoder operations.
pub type DecodeResult<T> = Result<T, DecoderError>;

/// Errors that can occur while producing a raw PCM buffer.
#[derive(Debug, Error)]
pub enum DecoderError {
    /// No decoder executable at any of the searched locations.
    #[error("Decoder executable not found (searched: {})", display_paths(.searched))]
    DecoderNotFound { searched: Vec<PathBuf> },

    /// Failed to spawn the decoder process.
    #[error("Failed to spawn decoder {path}: {source}")]
    SpawnFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decoder exited with non-zero status.
    #[error("Decoder exited with status {exit_code}: {stderr}")]
    ProcessFailed { exit_code: i32, stderr: String },

    /// Decoder did not finish in time and was killed.
    #[error("Decoder timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Decode was cancelled by the caller and the process was killed.
    #[error("Decode cancelled")]
    Cancelled,

    /// Decoder reported success but the raw file is missing.
    #[error("Decoder succeeded but raw output not found: {path}")]
    OutputMissing { path: PathBuf },

    /// IO error while supervising the decoder.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "<none>".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl DecoderError {
    /// Creates a new process failed error.
    pub fn process_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::ProcessFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Returns true if the decoder could not be located at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DecoderError::DecoderNotFound { .. })
    }

    /// Stable error code for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            DecoderError::DecoderNotFound { .. } => "DECODER_001",
            DecoderError::SpawnFailed { .. } => "DECODER_002",
            DecoderError::ProcessFailed { .. } => "DECODER_003",
            DecoderError::Timeout { .. } => "DECODER_004",
            DecoderError::Cancelled => "DECODER_005",
            DecoderError::OutputMissing { .. } => "DECODER_006",
            DecoderError::Io(_) => "DECODER_007",
        }
    }

    /// Error category for grouping related errors.
    pub fn category(&self) -> &'static str {
        "decoder"
    }
}
