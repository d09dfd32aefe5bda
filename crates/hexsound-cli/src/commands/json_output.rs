//! JSON output types for the `--json` flag.

use serde::Serialize;

use crate::pipeline::{ConversionReport, FailureKind, PipelineError};

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g. "DECODER_003").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Failure classification, for pipeline errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
}

impl JsonError {
    /// Creates an error with a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            kind: None,
        }
    }
}

impl From<&PipelineError> for JsonError {
    fn from(err: &PipelineError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            kind: Some(err.kind()),
        }
    }
}

/// JSON output of the convert command.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ConversionReport>,
}

impl ConvertOutput {
    pub fn success(report: ConversionReport) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            result: Some(report),
        }
    }

    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            result: None,
        }
    }
}

/// Outcome of checking an artifact.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VerifyResult {
    pub array_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    pub declared_len: usize,
    pub literal_count: usize,
    /// `_len` equals the number of literals.
    pub length_consistent: bool,
    /// Literals equal the raw file, when one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_matches: Option<bool>,
}

impl VerifyResult {
    /// True if every performed check passed.
    pub fn passed(&self) -> bool {
        self.length_consistent && self.raw_matches != Some(false)
    }
}

/// JSON output of the verify command.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<VerifyResult>,
}

impl VerifyOutput {
    pub fn from_result(result: VerifyResult) -> Self {
        Self {
            success: result.passed(),
            errors: Vec::new(),
            result: Some(result),
        }
    }

    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            result: None,
        }
    }
}
