//! The decode-then-encode conversion pipeline.
//!
//! ```text
//! ConversionRequest -> Decoder (audio -> .raw) -> encode_file (.raw -> sound.h)
//! ```
//!
//! A decoder failure ends the request before the encoder runs, so no
//! artifact is created or touched.

use std::path::PathBuf;

use hexsound_backend_ffmpeg::{duration_secs, Decoder, DecoderError};
use hexsound_encoder::{encode_file, EncoderError};
use serde::Serialize;
use thiserror::Error;

use crate::request::ConversionRequest;

/// Pipeline stages reported to a [`ProgressSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStage {
    /// The decoder is running.
    Decoding,
    /// The raw buffer is being rendered.
    Encoding,
    /// The artifact is written.
    Done,
    /// The request failed; progress returns to the start.
    Reset,
}

impl ProgressStage {
    /// Completion percentage shown for this stage.
    pub fn percent(&self) -> u8 {
        match self {
            ProgressStage::Decoding => 10,
            ProgressStage::Encoding => 70,
            ProgressStage::Done => 100,
            ProgressStage::Reset => 0,
        }
    }
}

/// Receives progress updates from [`convert`].
pub trait ProgressSink {
    fn stage(&mut self, stage: ProgressStage);
}

impl<F: FnMut(ProgressStage)> ProgressSink for F {
    fn stage(&mut self, stage: ProgressStage) {
        self(stage)
    }
}

/// Sink that ignores progress.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn stage(&mut self, _stage: ProgressStage) {}
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    /// Audio source.
    pub input: PathBuf,
    /// Raw intermediate; absent if it was discarded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_path: Option<PathBuf>,
    /// Written artifact.
    pub output_path: PathBuf,
    /// Array identifier used.
    pub array_name: String,
    /// Number of samples (bytes) in the array.
    pub sample_count: usize,
    /// Playback length at the fixed sample rate.
    pub duration_secs: f64,
    /// Backend that produced the raw buffer.
    pub decoder: String,
}

/// Broad classification of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InputMissing,
    DecoderUnavailable,
    ConversionFailed,
    EncodingFailed,
}

/// Errors that end a conversion request.
///
/// None of these affect later requests.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The audio source does not exist.
    #[error("Input file not found: {path}")]
    InputMissing { path: PathBuf },

    /// The decoder executable could not be located.
    #[error("Decoder unavailable: {0}")]
    DecoderUnavailable(#[source] DecoderError),

    /// The decoder ran (or tried to) and did not produce a raw buffer.
    #[error("Conversion failed: {0}")]
    ConversionFailed(#[source] DecoderError),

    /// Reading the raw buffer or writing the artifact failed.
    #[error("Encoding failed: {0}")]
    EncodingFailed(#[source] EncoderError),
}

impl From<DecoderError> for PipelineError {
    fn from(err: DecoderError) -> Self {
        if err.is_unavailable() {
            PipelineError::DecoderUnavailable(err)
        } else {
            PipelineError::ConversionFailed(err)
        }
    }
}

impl From<EncoderError> for PipelineError {
    fn from(err: EncoderError) -> Self {
        PipelineError::EncodingFailed(err)
    }
}

impl PipelineError {
    /// Failure classification.
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::InputMissing { .. } => FailureKind::InputMissing,
            PipelineError::DecoderUnavailable(_) => FailureKind::DecoderUnavailable,
            PipelineError::ConversionFailed(_) => FailureKind::ConversionFailed,
            PipelineError::EncodingFailed(_) => FailureKind::EncodingFailed,
        }
    }

    /// Stable error code, taken from the underlying backend error.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::InputMissing { .. } => "PIPELINE_001",
            PipelineError::DecoderUnavailable(e) | PipelineError::ConversionFailed(e) => e.code(),
            PipelineError::EncodingFailed(e) => e.code(),
        }
    }
}

/// Runs one conversion request.
///
/// Reports [`ProgressStage::Reset`] on any failure after decoding started.
pub fn convert(
    request: &ConversionRequest,
    decoder: &dyn Decoder,
    progress: &mut dyn ProgressSink,
) -> Result<ConversionReport, PipelineError> {
    if !request.input.is_file() {
        return Err(PipelineError::InputMissing {
            path: request.input.clone(),
        });
    }

    let result = run_stages(request, decoder, progress);
    match result {
        Ok(report) => {
            progress.stage(ProgressStage::Done);
            Ok(report)
        }
        Err(err) => {
            tracing::debug!(code = err.code(), "conversion failed: {}", err);
            progress.stage(ProgressStage::Reset);
            Err(err)
        }
    }
}

fn run_stages(
    request: &ConversionRequest,
    decoder: &dyn Decoder,
    progress: &mut dyn ProgressSink,
) -> Result<ConversionReport, PipelineError> {
    progress.stage(ProgressStage::Decoding);
    let pcm = decoder.decode(&request.input)?;

    progress.stage(ProgressStage::Encoding);
    let output_path = request.output_path();
    let artifact = encode_file(&pcm.raw_path, &output_path, &request.format)?;

    let raw_path = if request.keep_raw {
        Some(pcm.raw_path)
    } else {
        if let Err(e) = std::fs::remove_file(&pcm.raw_path) {
            tracing::warn!(
                raw = %pcm.raw_path.display(),
                "failed to remove raw intermediate: {}",
                e
            );
        }
        None
    };

    Ok(ConversionReport {
        input: request.input.clone(),
        raw_path,
        output_path: artifact.output_path,
        array_name: request.format.array_name.clone(),
        sample_count: artifact.sample_count,
        duration_secs: duration_secs(artifact.sample_count),
        decoder: decoder.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexsound_backend_ffmpeg::{raw_path_for, DecodeResult, DecodedPcm};
    use std::path::Path;

    /// Writes fixed bytes as the raw buffer.
    struct FixedDecoder(Vec<u8>);

    impl Decoder for FixedDecoder {
        fn name(&self) -> &str {
            "fixed"
        }

        fn decode(&self, input: &Path) -> DecodeResult<DecodedPcm> {
            let raw_path = raw_path_for(input);
            std::fs::write(&raw_path, &self.0)?;
            Ok(DecodedPcm {
                raw_path,
                stderr: String::new(),
            })
        }
    }

    #[test]
    fn test_progress_percentages() {
        assert_eq!(ProgressStage::Decoding.percent(), 10);
        assert_eq!(ProgressStage::Encoding.percent(), 70);
        assert_eq!(ProgressStage::Done.percent(), 100);
        assert_eq!(ProgressStage::Reset.percent(), 0);
    }

    #[test]
    fn test_convert_reports_stages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("chime.mp3");
        std::fs::write(&input, b"audio").unwrap();

        let mut stages = Vec::new();
        let report = convert(
            &ConversionRequest::new(&input),
            &FixedDecoder(vec![0x80; 8000]),
            &mut |stage: ProgressStage| stages.push(stage),
        )
        .unwrap();

        assert_eq!(
            stages,
            vec![
                ProgressStage::Decoding,
                ProgressStage::Encoding,
                ProgressStage::Done
            ]
        );
        assert_eq!(report.sample_count, 8000);
        assert_eq!(report.duration_secs, 1.0);
        assert_eq!(report.decoder, "fixed");
        assert_eq!(report.output_path, dir.path().join("sound.h"));
        assert_eq!(report.raw_path, Some(dir.path().join("chime.raw")));
    }

    #[test]
    fn test_convert_discards_raw_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("chime.wav");
        std::fs::write(&input, b"audio").unwrap();

        let report = convert(
            &ConversionRequest::new(&input).keep_raw(false),
            &FixedDecoder(vec![1, 2, 3]),
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(report.raw_path, None);
        assert!(!dir.path().join("chime.raw").exists());
        assert!(dir.path().join("sound.h").exists());
    }

    #[test]
    fn test_missing_input_is_rejected_before_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let mut stages = Vec::new();

        let err = convert(
            &ConversionRequest::new(dir.path().join("nothing.mp3")),
            &FixedDecoder(vec![]),
            &mut |stage: ProgressStage| stages.push(stage),
        )
        .unwrap_err();

        assert_eq!(err.kind(), FailureKind::InputMissing);
        assert!(stages.is_empty());
    }

    #[test]
    fn test_error_classification() {
        let err: PipelineError = DecoderError::DecoderNotFound { searched: vec![] }.into();
        assert_eq!(err.kind(), FailureKind::DecoderUnavailable);
        assert_eq!(err.code(), "DECODER_001");

        let err: PipelineError = DecoderError::process_failed(1, "boom").into();
        assert_eq!(err.kind(), FailureKind::ConversionFailed);

        let err: PipelineError = EncoderError::malformed(1, "x").into();
        assert_eq!(err.kind(), FailureKind::EncodingFailed);
        assert!(err.to_string().starts_with("Encoding failed"));
    }
}
