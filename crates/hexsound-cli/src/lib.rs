//! hexsound CLI library.
//!
//! Owns the conversion pipeline that ties the decoder backend to the array
//! encoder, plus the command implementations behind the `hexsound` binary.
//! Front ends (this CLI or a GUI) build a [`ConversionRequest`], pick a
//! [`Decoder`](hexsound_backend_ffmpeg::Decoder) and call [`convert`].

pub mod commands;
pub mod pipeline;
pub mod request;

pub use pipeline::{
    convert, ConversionReport, FailureKind, NoProgress, PipelineError, ProgressSink,
    ProgressStage,
};
pub use request::{ConversionRequest, OUTPUT_FILE_NAME};
