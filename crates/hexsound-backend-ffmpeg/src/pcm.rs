//! The fixed raw PCM format produced for the encoder.
//!
//! Every raw buffer is headerless unsigned 8-bit mono at 8000 Hz. None of
//! this is configurable.

use std::path::{Path, PathBuf};

/// Output sample rate in Hz.
pub const SAMPLE_RATE: u32 = 8000;

/// Output channel count.
pub const CHANNELS: u32 = 1;

/// Container format passed to the decoder (`-f`).
pub const SAMPLE_FORMAT: &str = "u8";

/// Codec passed to the decoder (`-acodec`).
pub const CODEC: &str = "pcm_u8";

/// Extension of the raw intermediate file.
pub const RAW_EXTENSION: &str = "raw";

/// Returns the raw intermediate path for an audio source: a sibling file
/// with the `.raw` extension.
pub fn raw_path_for(input: &Path) -> PathBuf {
    input.with_extension(RAW_EXTENSION)
}

/// Playback length of a raw buffer with `sample_count` samples.
pub fn duration_secs(sample_count: usize) -> f64 {
    sample_count as f64 / (SAMPLE_RATE * CHANNELS) as f64
}
