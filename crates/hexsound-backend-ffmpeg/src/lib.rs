//! hexsound ffmpeg backend
//!
//! Produces the raw PCM buffer consumed by `hexsound-encoder`: headerless
//! unsigned 8-bit mono samples at 8000 Hz, written to a `.raw` file next to
//! the audio source.
//!
//! Decoding goes through the [`Decoder`] trait so the pipeline does not care
//! whether samples come from an ffmpeg subprocess, an in-process library or a
//! test double. [`FfmpegDecoder`] is the shipped implementation: it spawns
//! the ffmpeg bundled at `<install dir>/ffmpeg/bin/ffmpeg` and blocks until it
//! exits, optionally bounded by a timeout and interruptible through a
//! [`CancelToken`].
//!
//! # Example
//!
//! ```no_run
//! use hexsound_backend_ffmpeg::{Decoder, DecoderConfig, FfmpegDecoder};
//! use std::path::Path;
//!
//! let decoder = FfmpegDecoder::with_config(DecoderConfig::default().timeout_secs(120));
//! let pcm = decoder.decode(Path::new("chime.mp3"))?;
//! println!("raw samples in {}", pcm.raw_path.display());
//! # Ok::<(), hexsound_backend_ffmpeg::DecoderError>(())
//! ```

pub mod decoder;
pub mod error;
pub mod ffmpeg;
pub mod pcm;

pub use decoder::{CancelToken, DecodedPcm, Decoder};
pub use error::{DecodeResult, DecoderError};
pub use ffmpeg::{probe_version, DecoderConfig, FfmpegDecoder};
pub use pcm::{duration_secs, raw_path_for, SAMPLE_RATE};
